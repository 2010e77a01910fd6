use crate::error::Result;
use crate::probe::ProbeMessage;
use std::net::SocketAddr;

/// A UDP transport for sending probes and receiving responses.
pub mod udp;

/// A UDP responder which answers probes.
pub mod responder;

/// The maximum size of a datagram we read.
pub const MAX_PACKET_SIZE: usize = 1024;

/// An abstraction over the outbound half of the network.
///
/// Responses travel back to the prober over a channel rather than through this trait, see
/// [`udp::UdpTransport::bind`].
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Send a `ProbeMessage` to `addr`.
    ///
    /// A failure to send which only affects this probe is reported as
    /// [`Error::ProbeFailed`](crate::Error::ProbeFailed).
    fn send_probe(&mut self, addr: SocketAddr, probe: ProbeMessage) -> Result<()>;
}
