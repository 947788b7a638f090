//! Channel state machine
//!
//! Turns the value of one DMX channel into scene activations:
//! - value `0` switches the active scene off
//! - value `n` in `1..=scenes.len()` activates `scenes[n - 1]`
//! - any other value is handled by [`OutOfRangePolicy`]
//!
//! Only changes of the channel value are acted upon, so a value held for
//! thousands of packets produces a single trigger.
//!
//! ```rust
//! use scenebridge_core::{SceneAction, SceneMachine, SceneMap};
//!
//! let map = SceneMap::new(vec!["baseocean".to_string(), "orangehigh".to_string()]);
//! let mut machine = SceneMachine::new(map, 0);
//!
//! let trigger = machine.apply_value(1).unwrap();
//! assert_eq!(trigger.scene, "baseocean");
//! assert_eq!(trigger.action, SceneAction::Activate);
//!
//! // Unchanged value: nothing to do
//! assert!(machine.apply_value(1).is_none());
//! ```

use crate::config::{BridgeConfig, OutOfRangePolicy};
use crate::error::Result;
use crate::packet::ChannelPacket;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel shown when no scene is active
pub const OFF_SCENE: &str = "off";

/// Action requested from the effects controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneAction {
    Activate,
    Deactivate,
}

impl fmt::Display for SceneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activate => write!(f, "activate"),
            Self::Deactivate => write!(f, "deactivate"),
        }
    }
}

/// A single scene request derived from a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTrigger {
    /// Scene id as known to the controller
    pub scene: String,
    /// Whether to switch the scene on or off
    pub action: SceneAction,
}

impl SceneTrigger {
    /// Request activation of `scene`
    pub fn activate(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            action: SceneAction::Activate,
        }
    }

    /// Request deactivation of `scene`
    pub fn deactivate(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            action: SceneAction::Deactivate,
        }
    }
}

impl fmt::Display for SceneTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.action, self.scene)
    }
}

/// Scene currently believed to be active on the controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveScene {
    #[default]
    Off,
    Scene(String),
}

impl ActiveScene {
    /// Scene id, or `"off"`
    pub fn name(&self) -> &str {
        match self {
            Self::Off => OFF_SCENE,
            Self::Scene(name) => name,
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Self::Off)
    }
}

impl fmt::Display for ActiveScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value-to-scene mapping plus the rules for the ambiguous cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneMap {
    scenes: Vec<String>,
    out_of_range: OutOfRangePolicy,
    suppress_redundant_deactivate: bool,
}

impl SceneMap {
    /// Mapping with the default rules (ignore unknown values, never deactivate "off")
    pub fn new(scenes: Vec<String>) -> Self {
        Self {
            scenes,
            out_of_range: OutOfRangePolicy::Ignore,
            suppress_redundant_deactivate: true,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            scenes: config.scenes.clone(),
            out_of_range: config.out_of_range,
            suppress_redundant_deactivate: config.suppress_redundant_deactivate,
        }
    }

    pub fn with_out_of_range(mut self, policy: OutOfRangePolicy) -> Self {
        self.out_of_range = policy;
        self
    }

    pub fn with_suppress_redundant_deactivate(mut self, suppress: bool) -> Self {
        self.suppress_redundant_deactivate = suppress;
        self
    }

    /// Scene selected by a non-zero channel value
    pub fn scene_for(&self, value: u8) -> Option<&str> {
        let index = usize::from(value).checked_sub(1)?;
        self.scenes.get(index).map(String::as_str)
    }

    pub fn scenes(&self) -> &[String] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// Remembered state between packets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Most recently received channel value
    pub last_value: u8,
    /// Scene implied by the last value that was acted upon
    pub active_scene: ActiveScene,
}

/// Result of feeding one value into a [`SessionState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the value was applied
    pub state: SessionState,
    /// Request for the controller, if any
    pub trigger: Option<SceneTrigger>,
}

impl SessionState {
    /// Compute the successor state for channel value `value`.
    ///
    /// Pure: `self` is left untouched.
    pub fn transition(&self, value: u8, map: &SceneMap) -> Transition {
        if value == self.last_value {
            return Transition {
                state: self.clone(),
                trigger: None,
            };
        }

        if value == 0 {
            return self.switch_off(value, map);
        }

        match map.scene_for(value) {
            Some(scene) => Transition {
                state: SessionState {
                    last_value: value,
                    active_scene: ActiveScene::Scene(scene.to_string()),
                },
                trigger: Some(SceneTrigger::activate(scene)),
            },
            None => match map.out_of_range {
                OutOfRangePolicy::Ignore => Transition {
                    state: SessionState {
                        last_value: value,
                        active_scene: self.active_scene.clone(),
                    },
                    trigger: None,
                },
                OutOfRangePolicy::Deactivate => self.switch_off(value, map),
            },
        }
    }

    fn switch_off(&self, value: u8, map: &SceneMap) -> Transition {
        let trigger = if self.active_scene.is_off() && map.suppress_redundant_deactivate {
            None
        } else {
            Some(SceneTrigger::deactivate(self.active_scene.name()))
        };

        Transition {
            state: SessionState {
                last_value: value,
                active_scene: ActiveScene::Off,
            },
            trigger,
        }
    }
}

/// Owns the session state and applies packets to it one at a time
#[derive(Debug, Clone)]
pub struct SceneMachine {
    state: SessionState,
    map: SceneMap,
    channel_index: usize,
}

impl SceneMachine {
    /// Create a machine in the initial `(0, off)` state
    ///
    /// # Arguments
    /// * `map` - Scene mapping and rules
    /// * `channel_index` - 0-based slot index to read from each packet
    pub fn new(map: SceneMap, channel_index: usize) -> Self {
        Self {
            state: SessionState::default(),
            map,
            channel_index,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(SceneMap::from_config(config), config.channel_index())
    }

    /// Read the configured channel from `packet` and apply it.
    ///
    /// Fails without touching the state if the packet is too short.
    pub fn process_packet(&mut self, packet: &ChannelPacket<'_>) -> Result<Option<SceneTrigger>> {
        let value = packet.channel_value(self.channel_index)?;
        Ok(self.apply_value(value))
    }

    /// Apply a raw channel value
    pub fn apply_value(&mut self, value: u8) -> Option<SceneTrigger> {
        let Transition { state, trigger } = self.state.transition(value, &self.map);
        if state.last_value != self.state.last_value {
            tracing::debug!(
                "Channel value {} -> {}, scene '{}' -> '{}'",
                self.state.last_value,
                state.last_value,
                self.state.active_scene,
                state.active_scene
            );
        }
        self.state = state;
        trigger
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn last_value(&self) -> u8 {
        self.state.last_value
    }

    pub fn active_scene(&self) -> &ActiveScene {
        &self.state.active_scene
    }

    pub fn channel_index(&self) -> usize {
        self.channel_index
    }

    pub fn map(&self) -> &SceneMap {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_scenes() -> SceneMap {
        SceneMap::new(vec!["baseocean".to_string(), "orangehigh".to_string()])
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert_eq!(state.last_value, 0);
        assert_eq!(state.active_scene, ActiveScene::Off);
        assert_eq!(state.active_scene.name(), "off");
    }

    #[test]
    fn test_scene_for() {
        let map = two_scenes();
        assert_eq!(map.scene_for(0), None);
        assert_eq!(map.scene_for(1), Some("baseocean"));
        assert_eq!(map.scene_for(2), Some("orangehigh"));
        assert_eq!(map.scene_for(3), None);
        assert_eq!(map.scene_for(255), None);
    }

    #[test]
    fn test_transition_is_pure() {
        let map = two_scenes();
        let state = SessionState::default();
        let t = state.transition(1, &map);
        assert_eq!(state, SessionState::default());
        assert_eq!(t.state.last_value, 1);
        assert_eq!(t.trigger, Some(SceneTrigger::activate("baseocean")));
    }

    #[test]
    fn test_unchanged_value_no_trigger() {
        let map = two_scenes();
        let state = SessionState {
            last_value: 2,
            active_scene: ActiveScene::Scene("orangehigh".to_string()),
        };
        let t = state.transition(2, &map);
        assert_eq!(t.state, state);
        assert!(t.trigger.is_none());
    }

    #[test]
    fn test_zero_deactivates_previous_scene() {
        let map = two_scenes();
        let state = SessionState {
            last_value: 2,
            active_scene: ActiveScene::Scene("orangehigh".to_string()),
        };
        let t = state.transition(0, &map);
        assert_eq!(t.trigger, Some(SceneTrigger::deactivate("orangehigh")));
        assert_eq!(t.state.active_scene, ActiveScene::Off);
        assert_eq!(t.state.last_value, 0);
    }

    #[test]
    fn test_zero_while_off_suppressed() {
        let map = two_scenes();
        let state = SessionState {
            last_value: 9,
            active_scene: ActiveScene::Off,
        };
        let t = state.transition(0, &map);
        assert!(t.trigger.is_none());
        assert_eq!(t.state.last_value, 0);
    }

    #[test]
    fn test_zero_while_off_not_suppressed() {
        let map = two_scenes().with_suppress_redundant_deactivate(false);
        let state = SessionState {
            last_value: 9,
            active_scene: ActiveScene::Off,
        };
        let t = state.transition(0, &map);
        assert_eq!(t.trigger, Some(SceneTrigger::deactivate("off")));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let map = two_scenes();
        let state = SessionState {
            last_value: 2,
            active_scene: ActiveScene::Scene("orangehigh".to_string()),
        };
        let t = state.transition(3, &map);
        assert!(t.trigger.is_none());
        assert_eq!(t.state.last_value, 3);
        assert_eq!(t.state.active_scene.name(), "orangehigh");
    }

    #[test]
    fn test_out_of_range_deactivates() {
        let map = two_scenes().with_out_of_range(OutOfRangePolicy::Deactivate);
        let state = SessionState {
            last_value: 2,
            active_scene: ActiveScene::Scene("orangehigh".to_string()),
        };
        let t = state.transition(200, &map);
        assert_eq!(t.trigger, Some(SceneTrigger::deactivate("orangehigh")));
        assert_eq!(t.state.last_value, 200);
        assert!(t.state.active_scene.is_off());
    }

    #[test]
    fn test_scene_switch_activates_new_scene_only() {
        let mut machine = SceneMachine::new(two_scenes(), 0);
        assert_eq!(
            machine.apply_value(1),
            Some(SceneTrigger::activate("baseocean"))
        );
        assert_eq!(
            machine.apply_value(2),
            Some(SceneTrigger::activate("orangehigh"))
        );
        assert_eq!(machine.active_scene().name(), "orangehigh");
    }

    #[test]
    fn test_process_packet_reads_configured_channel() {
        let mut machine = SceneMachine::new(two_scenes(), 3);
        let data = [0u8, 0, 0, 2, 0];
        let trigger = machine.process_packet(&ChannelPacket::new(&data)).unwrap();
        assert_eq!(trigger, Some(SceneTrigger::activate("orangehigh")));
    }

    #[test]
    fn test_process_short_packet_keeps_state() {
        let mut machine = SceneMachine::new(two_scenes(), 10);
        machine.apply_value(1);
        let before = machine.state().clone();

        let data = [2u8; 4];
        assert!(machine.process_packet(&ChannelPacket::new(&data)).is_err());
        assert_eq!(machine.state(), &before);
    }

    #[test]
    fn test_trigger_display() {
        assert_eq!(
            SceneTrigger::activate("baseocean").to_string(),
            "activate(baseocean)"
        );
        assert_eq!(
            SceneTrigger::deactivate("baseocean").to_string(),
            "deactivate(baseocean)"
        );
    }
}
