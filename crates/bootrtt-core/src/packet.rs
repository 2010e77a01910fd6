//! The probe datagram wire format.
//!
//! Every probe and every response is a single fixed size datagram:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Magic ("BRTT")                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Version    |     Kind      |                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
//! |                     Identifier (u64)                          |
//! +                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
use self::buffer::Buffer;
use self::error::{Error, Result};
use std::fmt::{Debug, Formatter};

pub mod buffer;
pub mod error;

/// The magic bytes at the start of every probe datagram.
pub const MAGIC: [u8; 4] = *b"BRTT";

/// The only wire version currently spoken.
pub const VERSION: u8 = 1;

const MAGIC_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 4;
const KIND_OFFSET: usize = 5;
const IDENTIFIER_OFFSET: usize = 6;

/// The kind of probe datagram.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum PacketKind {
    Request,
    Response,
    Other(u8),
}

impl PacketKind {
    #[must_use]
    pub const fn id(&self) -> u8 {
        match self {
            Self::Request => 1,
            Self::Response => 2,
            Self::Other(id) => *id,
        }
    }
}

impl From<u8> for PacketKind {
    fn from(val: u8) -> Self {
        match val {
            1 => Self::Request,
            2 => Self::Response,
            id => Self::Other(id),
        }
    }
}

/// Represents a probe datagram.
///
/// The internal representation is held in network byte order (big-endian) and all accessor methods
/// take and return data in host byte order.
pub struct ProbePacket<'a> {
    buf: Buffer<'a>,
}

impl<'a> ProbePacket<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Mutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("ProbePacket"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    pub fn new_view(packet: &'a [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Immutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("ProbePacket"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        14
    }

    #[must_use]
    pub fn get_magic(&self) -> [u8; 4] {
        self.buf.get_bytes(MAGIC_OFFSET)
    }

    #[must_use]
    pub fn get_version(&self) -> u8 {
        self.buf.read(VERSION_OFFSET)
    }

    #[must_use]
    pub fn get_kind(&self) -> PacketKind {
        PacketKind::from(self.buf.read(KIND_OFFSET))
    }

    #[must_use]
    pub fn get_identifier(&self) -> u64 {
        u64::from_be_bytes(self.buf.get_bytes(IDENTIFIER_OFFSET))
    }

    pub fn set_magic(&mut self, val: [u8; 4]) {
        self.buf.set_bytes(MAGIC_OFFSET, val);
    }

    pub fn set_version(&mut self, val: u8) {
        *self.buf.write(VERSION_OFFSET) = val;
    }

    pub fn set_kind(&mut self, val: PacketKind) {
        *self.buf.write(KIND_OFFSET) = val.id();
    }

    pub fn set_identifier(&mut self, val: u64) {
        self.buf.set_bytes(IDENTIFIER_OFFSET, val.to_be_bytes());
    }

    /// The bytes of the datagram, excluding any trailing buffer capacity.
    #[must_use]
    pub fn packet(&self) -> &[u8] {
        &self.buf.as_slice()[..Self::minimum_packet_size()]
    }
}

impl Debug for ProbePacket<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbePacket")
            .field("magic", &self.get_magic())
            .field("version", &self.get_version())
            .field("kind", &self.get_kind())
            .field("identifier", &self.get_identifier())
            .finish()
    }
}
