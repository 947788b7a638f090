//! E1.31 data packet codec
//!
//! Layout of a data packet (all multi-byte fields big endian):
//!
//! | Offset | Field |
//! |---|---|
//! | 0 | Root layer: preamble, postamble, ACN identifier, flags/length, vector, CID |
//! | 38 | Framing layer: flags/length, vector, source name, priority, sync address, sequence, options, universe |
//! | 115 | DMP layer: flags/length, vector, address/data type, first address, increment, count |
//! | 125 | Start code followed by up to 512 slots |

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// ACN packet identifier ("ASC-E1.17\0\0\0")
pub const ACN_PACKET_IDENTIFIER: [u8; 12] = [
    0x41, 0x53, 0x43, 0x2d, 0x45, 0x31, 0x2e, 0x31, 0x37, 0x00, 0x00, 0x00,
];

/// VECTOR_ROOT_E131_DATA
pub const VECTOR_ROOT_E131_DATA: u32 = 0x0000_0004;
/// VECTOR_ROOT_E131_EXTENDED (synchronization and discovery)
pub const VECTOR_ROOT_E131_EXTENDED: u32 = 0x0000_0008;
/// VECTOR_E131_DATA_PACKET
pub const VECTOR_E131_DATA_PACKET: u32 = 0x0000_0002;
/// VECTOR_DMP_SET_PROPERTY
pub const VECTOR_DMP_SET_PROPERTY: u8 = 0x02;
/// DMP address and data type
pub const DMP_ADDRESS_TYPE: u8 = 0xa1;

/// Start code of plain DMX data
pub const DMX_START_CODE: u8 = 0x00;
/// Default priority of a source
pub const DEFAULT_PRIORITY: u8 = 100;
/// Highest valid priority
pub const MAX_PRIORITY: u8 = 200;
/// Maximum number of DMX slots per packet
pub const MAX_SLOTS: usize = 512;

/// Option bit: data is for visualisation only
pub const OPTION_PREVIEW: u8 = 0x80;
/// Option bit: source is ending the stream
pub const OPTION_STREAM_TERMINATED: u8 = 0x40;
/// Option bit: forced synchronization
pub const OPTION_FORCE_SYNC: u8 = 0x20;

const ROOT_LAYER_START: usize = 16;
const FRAMING_LAYER_START: usize = 38;
const DMP_LAYER_START: usize = 115;
const START_CODE_OFFSET: usize = 125;
/// Smallest data packet: a start code without slots
pub const MIN_PACKET_LEN: usize = START_CODE_OFFSET + 1;
/// Largest data packet: start code plus 512 slots
pub const MAX_PACKET_LEN: usize = MIN_PACKET_LEN + MAX_SLOTS;

const SOURCE_NAME_LEN: usize = 64;

/// PDU layer a length field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Root,
    Framing,
    Dmp,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Framing => write!(f, "framing"),
            Self::Dmp => write!(f, "DMP"),
        }
    }
}

/// Reasons a datagram is not a usable E1.31 data packet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Packet too short: {0} bytes")]
    TooShort(usize),

    #[error("Invalid preamble or ACN packet identifier")]
    InvalidIdentifier,

    /// Synchronization or discovery packet; carries no slot data
    #[error("Extended packet (sync/discovery)")]
    Extended,

    #[error("Unsupported root vector: {0:#010x}")]
    UnsupportedRootVector(u32),

    #[error("Unsupported framing vector: {0:#010x}")]
    UnsupportedFramingVector(u32),

    #[error("Unsupported DMP vector {vector:#04x} or address type {address_type:#04x}")]
    UnsupportedDmp { vector: u8, address_type: u8 },

    #[error("Invalid DMP addressing: first address {first}, increment {increment}")]
    InvalidAddressing { first: u16, increment: u16 },

    #[error("Invalid property value count: {0}")]
    InvalidValueCount(u16),

    #[error("{layer} layer length {declared} does not match {actual}")]
    LengthMismatch {
        layer: Layer,
        declared: usize,
        actual: usize,
    },

    #[error("Invalid universe: {0}")]
    InvalidUniverse(u16),

    #[error("Invalid priority: {0}")]
    InvalidPriority(u8),
}

/// A decoded E1.31 data packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    /// Component identifier of the source
    pub cid: Uuid,
    /// Human readable source name
    pub source_name: String,
    pub priority: u8,
    pub sync_address: u16,
    pub sequence: u8,
    /// Raw framing options byte
    pub options: u8,
    pub universe: u16,
    pub start_code: u8,
    /// Slot values, start code excluded
    pub data: Vec<u8>,
}

impl DataPacket {
    /// Create a DMX packet with default priority and a random CID
    pub fn new(universe: u16, data: &[u8]) -> Self {
        let len = data.len().min(MAX_SLOTS);
        Self {
            cid: Uuid::new_v4(),
            source_name: String::new(),
            priority: DEFAULT_PRIORITY,
            sync_address: 0,
            sequence: 0,
            options: 0,
            universe,
            start_code: DMX_START_CODE,
            data: data[..len].to_vec(),
        }
    }

    /// Slot data of the packet
    pub fn slots(&self) -> &[u8] {
        &self.data
    }

    pub fn is_preview(&self) -> bool {
        self.options & OPTION_PREVIEW != 0
    }

    pub fn is_terminated(&self) -> bool {
        self.options & OPTION_STREAM_TERMINATED != 0
    }

    pub fn is_dmx(&self) -> bool {
        self.start_code == DMX_START_CODE
    }

    /// Decode a datagram
    pub fn decode(buf: &[u8]) -> Result<Self, PacketError> {
        if buf.len() < FRAMING_LAYER_START {
            return Err(PacketError::TooShort(buf.len()));
        }

        // Root Layer
        if read_u16(buf, 0) != 0x0010
            || read_u16(buf, 2) != 0x0000
            || buf[4..16] != ACN_PACKET_IDENTIFIER
        {
            return Err(PacketError::InvalidIdentifier);
        }

        match read_u32(buf, 18) {
            VECTOR_ROOT_E131_DATA => {}
            VECTOR_ROOT_E131_EXTENDED => return Err(PacketError::Extended),
            other => return Err(PacketError::UnsupportedRootVector(other)),
        }

        if buf.len() < MIN_PACKET_LEN {
            return Err(PacketError::TooShort(buf.len()));
        }

        let mut cid = [0u8; 16];
        cid.copy_from_slice(&buf[22..38]);

        // Framing Layer
        let framing_vector = read_u32(buf, 40);
        if framing_vector != VECTOR_E131_DATA_PACKET {
            return Err(PacketError::UnsupportedFramingVector(framing_vector));
        }

        let name_bytes = &buf[44..44 + SOURCE_NAME_LEN];
        let name_end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(SOURCE_NAME_LEN);
        let source_name = String::from_utf8_lossy(&name_bytes[..name_end]).into_owned();

        let priority = buf[108];
        if priority > MAX_PRIORITY {
            return Err(PacketError::InvalidPriority(priority));
        }
        let sync_address = read_u16(buf, 109);
        let sequence = buf[111];
        let options = buf[112];
        let universe = read_u16(buf, 113);
        if universe == 0 || universe > 63999 {
            return Err(PacketError::InvalidUniverse(universe));
        }

        // DMP Layer
        let vector = buf[117];
        let address_type = buf[118];
        if vector != VECTOR_DMP_SET_PROPERTY || address_type != DMP_ADDRESS_TYPE {
            return Err(PacketError::UnsupportedDmp {
                vector,
                address_type,
            });
        }

        let first = read_u16(buf, 119);
        let increment = read_u16(buf, 121);
        if first != 0 || increment != 1 {
            return Err(PacketError::InvalidAddressing { first, increment });
        }

        let count = read_u16(buf, 123);
        if count == 0 || usize::from(count) > MAX_SLOTS + 1 {
            return Err(PacketError::InvalidValueCount(count));
        }

        let end = START_CODE_OFFSET + usize::from(count);
        if buf.len() < end {
            return Err(PacketError::TooShort(buf.len()));
        }

        check_pdu_length(buf, ROOT_LAYER_START, end, Layer::Root)?;
        check_pdu_length(buf, FRAMING_LAYER_START, end, Layer::Framing)?;
        check_pdu_length(buf, DMP_LAYER_START, end, Layer::Dmp)?;

        Ok(Self {
            cid: Uuid::from_bytes(cid),
            source_name,
            priority,
            sync_address,
            sequence,
            options,
            universe,
            start_code: buf[START_CODE_OFFSET],
            data: buf[START_CODE_OFFSET + 1..end].to_vec(),
        })
    }

    /// Encode into a datagram
    pub fn encode(&self) -> Vec<u8> {
        let slots = &self.data[..self.data.len().min(MAX_SLOTS)];
        let total = MIN_PACKET_LEN + slots.len();
        let mut packet = vec![0u8; total];

        // Root Layer
        let mut offset = 0;

        // Preamble Size (16-bit)
        packet[offset..offset + 2].copy_from_slice(&0x0010u16.to_be_bytes());
        offset += 2;

        // Post-amble Size (16-bit)
        packet[offset..offset + 2].copy_from_slice(&0x0000u16.to_be_bytes());
        offset += 2;

        packet[offset..offset + 12].copy_from_slice(&ACN_PACKET_IDENTIFIER);
        offset += 12;

        packet[offset..offset + 2].copy_from_slice(&flags_and_length(total - ROOT_LAYER_START));
        offset += 2;

        packet[offset..offset + 4].copy_from_slice(&VECTOR_ROOT_E131_DATA.to_be_bytes());
        offset += 4;

        packet[offset..offset + 16].copy_from_slice(self.cid.as_bytes());
        offset += 16;

        // Framing Layer
        packet[offset..offset + 2].copy_from_slice(&flags_and_length(total - FRAMING_LAYER_START));
        offset += 2;

        packet[offset..offset + 4].copy_from_slice(&VECTOR_E131_DATA_PACKET.to_be_bytes());
        offset += 4;

        // Source Name (64 bytes, null-terminated)
        let source_bytes = self.source_name.as_bytes();
        let copy_len = source_bytes.len().min(SOURCE_NAME_LEN - 1);
        packet[offset..offset + copy_len].copy_from_slice(&source_bytes[..copy_len]);
        offset += SOURCE_NAME_LEN;

        packet[offset] = self.priority;
        offset += 1;

        packet[offset..offset + 2].copy_from_slice(&self.sync_address.to_be_bytes());
        offset += 2;

        packet[offset] = self.sequence;
        offset += 1;

        packet[offset] = self.options;
        offset += 1;

        packet[offset..offset + 2].copy_from_slice(&self.universe.to_be_bytes());
        offset += 2;

        // DMP Layer
        packet[offset..offset + 2].copy_from_slice(&flags_and_length(total - DMP_LAYER_START));
        offset += 2;

        packet[offset] = VECTOR_DMP_SET_PROPERTY;
        offset += 1;

        packet[offset] = DMP_ADDRESS_TYPE;
        offset += 1;

        // First Property Address
        packet[offset..offset + 2].copy_from_slice(&0x0000u16.to_be_bytes());
        offset += 2;

        // Address Increment
        packet[offset..offset + 2].copy_from_slice(&0x0001u16.to_be_bytes());
        offset += 2;

        // Property value count: start code + slots
        packet[offset..offset + 2].copy_from_slice(&((slots.len() + 1) as u16).to_be_bytes());
        offset += 2;

        packet[offset] = self.start_code;
        offset += 1;

        packet[offset..offset + slots.len()].copy_from_slice(slots);

        packet
    }
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn flags_and_length(length: usize) -> [u8; 2] {
    (0x7000u16 | (length as u16 & 0x0FFF)).to_be_bytes()
}

fn check_pdu_length(buf: &[u8], start: usize, end: usize, layer: Layer) -> Result<(), PacketError> {
    let declared = usize::from(read_u16(buf, start) & 0x0FFF);
    let actual = end - start;
    if declared != actual {
        return Err(PacketError::LengthMismatch {
            layer,
            declared,
            actual,
        });
    }
    Ok(())
}
