//! Sequence number tracking (E1.31 section 6.7.2)

use std::collections::HashMap;
use uuid::Uuid;

/// Packets up to this far behind the last one are considered stale
const OUT_OF_ORDER_WINDOW: i8 = -20;

/// Remembers the last accepted sequence number per source and universe
#[derive(Debug, Default)]
pub struct SequenceTracker {
    last: HashMap<(Uuid, u16), u8>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the packet is in order and records it.
    ///
    /// Out-of-order packets leave the recorded number untouched.
    pub fn accept(&mut self, cid: Uuid, universe: u16, sequence: u8) -> bool {
        if let Some(&last) = self.last.get(&(cid, universe)) {
            let diff = sequence.wrapping_sub(last) as i8;
            if diff <= 0 && diff > OUT_OF_ORDER_WINDOW {
                return false;
            }
        }
        self.last.insert((cid, universe), sequence);
        true
    }

    /// Drop the record of a source, e.g. after it terminated its stream
    pub fn forget(&mut self, cid: Uuid, universe: u16) {
        self.last.remove(&(cid, universe));
    }
}
