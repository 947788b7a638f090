//! Bounds-checked view over a packet's DMX slot data

use crate::error::{CoreError, Result};

/// Borrowed slot data of one received packet.
///
/// Lives only for the duration of one event; the machine never retains it.
#[derive(Debug, Clone, Copy)]
pub struct ChannelPacket<'a> {
    slots: &'a [u8],
}

impl<'a> ChannelPacket<'a> {
    /// Wrap the slot data (start code already stripped)
    pub fn new(slots: &'a [u8]) -> Self {
        Self { slots }
    }

    /// Read one channel by 0-based index
    pub fn channel_value(&self, index: usize) -> Result<u8> {
        self.slots
            .get(index)
            .copied()
            .ok_or(CoreError::ChannelOutOfRange {
                index,
                len: self.slots.len(),
            })
    }
}

impl<'a> From<&'a [u8]> for ChannelPacket<'a> {
    fn from(slots: &'a [u8]) -> Self {
        Self::new(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_channel() {
        let data = [0u8, 7, 255];
        let packet = ChannelPacket::new(&data);
        assert_eq!(packet.channel_value(0).unwrap(), 0);
        assert_eq!(packet.channel_value(1).unwrap(), 7);
        assert_eq!(packet.channel_value(2).unwrap(), 255);
    }

    #[test]
    fn test_read_past_end() {
        let data = [1u8, 2];
        let packet = ChannelPacket::new(&data);
        match packet.channel_value(2) {
            Err(CoreError::ChannelOutOfRange { index, len }) => {
                assert_eq!(index, 2);
                assert_eq!(len, 2);
            }
            other => panic!("Expected ChannelOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_packet() {
        let packet = ChannelPacket::new(&[]);
        assert!(matches!(
            packet.channel_value(0),
            Err(CoreError::ChannelOutOfRange { index: 0, len: 0 })
        ));
    }
}
