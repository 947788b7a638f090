//! Scene Bridge Control - Network Collaborators
//!
//! This crate connects the bridge core to the outside world:
//! - **sACN**: E1.31 receiver with multicast membership, packet decoding and
//!   sequence validation
//! - **LedFx**: HTTP client that (de)activates scenes
//!
//! ## Modules
//!
//! - [`sacn`] - sACN input
//! - [`ledfx`] - LedFx scene client
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Error types
pub mod error;
/// LedFx scene API client
pub mod ledfx;
/// sACN (E1.31) input
pub mod sacn;

// Re-exports
pub use error::{ControlError, Result};
pub use ledfx::{LedFxClient, LedFxError};
pub use sacn::{DataPacket, PacketError, ReceiverConfig, ReceiverEvent, SacnReceiver};
