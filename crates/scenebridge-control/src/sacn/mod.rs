//! sACN (E1.31) input
//!
//! sACN (Streaming ACN) carries DMX512 over IP multicast.
//! - Uses IP multicast (239.255.x.x:5568)
//! - Supports universes 1-63999
//! - Includes per-source sequence numbering and priority
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scenebridge_control::sacn::{ReceiverConfig, ReceiverEvent, SacnReceiver};
//!
//! # async fn run() -> scenebridge_control::Result<()> {
//! let receiver = SacnReceiver::bind(ReceiverConfig::new(vec![1])).await?;
//! let (handle, mut events) = receiver.spawn(256);
//!
//! while let Some(event) = events.recv().await {
//!     if let ReceiverEvent::Packet(packet) = event {
//!         println!("channel 1 = {}", packet.slots()[0]);
//!     }
//! }
//! handle.close().await;
//! # Ok(())
//! # }
//! ```

pub mod packet;
pub mod receiver;
pub mod sequence;

pub use packet::{DataPacket, PacketError};
pub use receiver::{
    multicast_group, ReceiverConfig, ReceiverEvent, ReceiverHandle, SacnReceiver, StreamState,
    SACN_PORT,
};
pub use sequence::SequenceTracker;
