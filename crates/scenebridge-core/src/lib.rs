//! Scene Bridge Core - Channel-to-Scene Domain Model
//!
//! This crate contains the domain model of the sACN to LedFx bridge:
//! - Bridge configuration loaded once at startup
//! - The channel state machine mapping DMX values to scenes
//! - Bounds-checked access to a packet's slot data
//! - The status projection shown on the terminal panel
//! - Log configuration shared with the binary

pub mod config;
pub mod error;
pub mod logging;
pub mod packet;
pub mod scene;
pub mod status;

pub use config::{BridgeConfig, OutOfRangePolicy};
pub use error::{CoreError, Result};
pub use logging::LogConfig;
pub use packet::ChannelPacket;
pub use scene::{
    ActiveScene, SceneAction, SceneMachine, SceneMap, SceneTrigger, SessionState, Transition,
};
pub use status::StatusSnapshot;
