use crate::packet::error::{Error, Result};
use crate::packet::{PacketKind, ProbePacket, MAGIC, VERSION};
use crate::types::ProbeId;
use std::net::SocketAddr;

/// The kind of a probe message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProbeKind {
    /// A probe sent by the prober.
    Request,
    /// A reply to a probe, echoing its identifier.
    Response,
}

/// A probe message as sent on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProbeMessage {
    pub id: ProbeId,
    pub kind: ProbeKind,
}

impl ProbeMessage {
    #[must_use]
    pub const fn request(id: ProbeId) -> Self {
        Self {
            id,
            kind: ProbeKind::Request,
        }
    }

    #[must_use]
    pub const fn response(id: ProbeId) -> Self {
        Self {
            id,
            kind: ProbeKind::Response,
        }
    }

    /// Encode the message into `buf` and return the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let mut packet = ProbePacket::new(buf)?;
        packet.set_magic(MAGIC);
        packet.set_version(VERSION);
        packet.set_kind(match self.kind {
            ProbeKind::Request => PacketKind::Request,
            ProbeKind::Response => PacketKind::Response,
        });
        packet.set_identifier(self.id.0);
        Ok(packet.packet().len())
    }

    /// Decode and validate a message from a received datagram.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let packet = ProbePacket::new_view(buf)?;
        if packet.get_magic() != MAGIC {
            return Err(Error::BadMagic(packet.get_magic()));
        }
        if packet.get_version() != VERSION {
            return Err(Error::UnsupportedVersion(packet.get_version()));
        }
        let kind = match packet.get_kind() {
            PacketKind::Request => ProbeKind::Request,
            PacketKind::Response => ProbeKind::Response,
            PacketKind::Other(id) => return Err(Error::UnknownKind(id)),
        };
        Ok(Self {
            id: ProbeId(packet.get_identifier()),
            kind,
        })
    }
}

/// An inbound response delivered to the prober.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Response {
    /// The identifier echoed by the responder.
    pub id: ProbeId,
    /// The address the response was received from.
    pub from: SocketAddr,
}

impl Response {
    #[must_use]
    pub const fn new(id: ProbeId, from: SocketAddr) -> Self {
        Self { id, from }
    }
}
