//! Status projection for the terminal panel

use crate::scene::SessionState;

/// What the panel shows after each packet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    /// Raw channel value of the latest packet
    pub value: u8,
    /// Active scene name, `"off"` when none
    pub scene: String,
    /// Whether data is currently arriving for the universe
    pub receiving: bool,
    /// Latest warning or error, shown under the status row
    pub notice: Option<String>,
}

impl StatusSnapshot {
    /// Project the session state.
    ///
    /// `last_value` always holds the most recent channel value, acted upon or not.
    pub fn from_state(state: &SessionState, receiving: bool) -> Self {
        Self {
            value: state.last_value,
            scene: state.active_scene.name().to_string(),
            receiving,
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    /// Value zero-padded to three digits
    pub fn value_text(&self) -> String {
        format!("{:03}", self.value)
    }

    /// Status row in the `Value | Scene` layout
    pub fn line(&self) -> String {
        format!(" {} | {}", self.value_text(), self.scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ActiveScene;

    #[test]
    fn test_zero_padding() {
        let mut state = SessionState::default();
        assert_eq!(StatusSnapshot::from_state(&state, false).value_text(), "000");
        state.last_value = 7;
        assert_eq!(StatusSnapshot::from_state(&state, false).value_text(), "007");
        state.last_value = 255;
        assert_eq!(StatusSnapshot::from_state(&state, false).value_text(), "255");
    }

    #[test]
    fn test_line() {
        let state = SessionState {
            last_value: 1,
            active_scene: ActiveScene::Scene("baseocean".to_string()),
        };
        let snapshot = StatusSnapshot::from_state(&state, true);
        assert_eq!(snapshot.line(), " 001 | baseocean");
        assert!(snapshot.notice.is_none());
    }

    #[test]
    fn test_notice() {
        let snapshot = StatusSnapshot::from_state(&SessionState::default(), false)
            .with_notice(Some("bind failed".to_string()));
        assert_eq!(snapshot.notice.as_deref(), Some("bind failed"));
        assert_eq!(snapshot.line(), " 000 | off");
    }
}
