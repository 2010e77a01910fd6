use crate::error::{Error, IoError, IoOperation, Result};
use crate::net::udp::is_transient;
use crate::net::MAX_PACKET_SIZE;
use crate::packet::ProbePacket;
use crate::probe::{ProbeKind, ProbeMessage};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, trace, warn};

/// Answers probe requests received on a UDP socket.
///
/// Every valid request is answered with a response carrying the same identifier, sent back to the
/// address the request came from. Anything else is ignored.
#[derive(Debug)]
pub struct Responder {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl Responder {
    #[instrument(level = "trace")]
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|err| IoError::Bind(err, addr))?;
        let local_addr = socket
            .local_addr()
            .map_err(|err| IoError::Other(err, IoOperation::LocalAddr))?;
        debug!(%local_addr, "bound responder socket");
        Ok(Self { socket, local_addr })
    }

    /// The local address the socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Answer probes until a fatal socket error occurs.
    #[instrument(skip_all, fields(local_addr = %self.local_addr), level = "trace")]
    pub async fn run(self) -> Result<()> {
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let mut reply = [0_u8; ProbePacket::minimum_packet_size()];
        loop {
            let (len, from) = match self.socket.recv_from(&mut buf).await {
                Ok(recv) => recv,
                Err(err) if is_transient(err.kind()) => continue,
                Err(err) => return Err(Error::IoError(IoError::Other(err, IoOperation::RecvFrom))),
            };
            match ProbeMessage::decode(&buf[..len]) {
                Ok(ProbeMessage {
                    id,
                    kind: ProbeKind::Request,
                }) => {
                    let len = ProbeMessage::response(id).encode(&mut reply)?;
                    match self.socket.send_to(&reply[..len], from).await {
                        Ok(_) => debug!(%id, %from, "answered probe"),
                        Err(err) => {
                            let err = IoError::SendTo(err, from);
                            warn!(%id, %err, "failed to answer probe");
                        }
                    }
                }
                Ok(message) => trace!(?message, %from, "ignoring probe response"),
                Err(err) => trace!(%err, %from, "ignoring invalid datagram"),
            }
        }
    }
}
