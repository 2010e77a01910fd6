use crate::error::{Error, IoError, IoOperation, Result};
use crate::net::{Transport, MAX_PACKET_SIZE};
use crate::packet::ProbePacket;
use crate::probe::{ProbeKind, ProbeMessage, Response};
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

/// A `Transport` over a single UDP socket.
///
/// Probes are sent directly from the socket. A background task reads every datagram received on
/// the socket and forwards each valid probe response to the channel returned by
/// [`UdpTransport::bind`]. The task is aborted when the transport is dropped.
#[derive(Debug)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    recv_task: JoinHandle<()>,
}

impl UdpTransport {
    /// Bind a UDP socket and start receiving responses.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(level = "trace")]
    pub async fn bind(
        addr: SocketAddr,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Response>)> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|err| IoError::Bind(err, addr))?;
        let local_addr = socket
            .local_addr()
            .map_err(|err| IoError::Other(err, IoOperation::LocalAddr))?;
        debug!(%local_addr, "bound probe socket");
        let socket = Arc::new(socket);
        let (tx, rx) = mpsc::unbounded_channel();
        let recv_task = tokio::spawn(recv_responses(Arc::clone(&socket), tx));
        Ok((
            Self {
                socket,
                local_addr,
                recv_task,
            },
            rx,
        ))
    }

    /// The local address the socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Transport for UdpTransport {
    fn send_probe(&mut self, addr: SocketAddr, probe: ProbeMessage) -> Result<()> {
        let mut buf = [0_u8; ProbePacket::minimum_packet_size()];
        let len = probe.encode(&mut buf)?;
        let dest = dest_for(self.local_addr, addr);
        match self.socket.try_send_to(&buf[..len], dest) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                trace!(%dest, "send buffer full, deferring probe");
                tokio::spawn(send_deferred(
                    Arc::clone(&self.socket),
                    buf[..len].to_vec(),
                    dest,
                ));
                Ok(())
            }
            Err(err) => Err(Error::ProbeFailed(IoError::SendTo(err, addr))),
        }
    }
}

/// Send a datagram once the socket is writable again.
///
/// The probe is already pending, so a failure here leaves it to be resolved by its timeout.
async fn send_deferred(socket: Arc<UdpSocket>, datagram: Vec<u8>, dest: SocketAddr) {
    if let Err(err) = socket.send_to(&datagram, dest).await {
        let err = IoError::SendTo(err, dest);
        warn!(%err, "failed to send deferred probe");
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

async fn recv_responses(socket: Arc<UdpSocket>, tx: mpsc::UnboundedSender<Response>) {
    let mut buf = [0_u8; MAX_PACKET_SIZE];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(recv) => recv,
            Err(err) if is_transient(err.kind()) => {
                trace!(%err, "ignoring transient receive error");
                continue;
            }
            Err(err) => {
                let err = IoError::Other(err, IoOperation::RecvFrom);
                warn!(%err, "stopped receiving responses");
                break;
            }
        };
        if let Some(response) = decode_response(&buf[..len], from) {
            trace!(id = %response.id, from = %response.from, "received response");
            if tx.send(response).is_err() {
                break;
            }
        }
    }
}

/// Decode a datagram, keeping only valid probe responses.
fn decode_response(datagram: &[u8], from: SocketAddr) -> Option<Response> {
    let from = SocketAddr::new(from.ip().to_canonical(), from.port());
    match ProbeMessage::decode(datagram) {
        Ok(ProbeMessage {
            id,
            kind: ProbeKind::Response,
        }) => Some(Response::new(id, from)),
        Ok(message) => {
            trace!(?message, %from, "ignoring probe request");
            None
        }
        Err(err) => {
            debug!(%err, %from, "dropping invalid datagram");
            None
        }
    }
}

/// Errors which some platforms report on an unconnected UDP socket after an ICMP unreachable.
pub(super) const fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused | ErrorKind::Interrupted
    )
}

/// An IPv6 socket reaches IPv4 targets through their IPv4-mapped form.
fn dest_for(local_addr: SocketAddr, addr: SocketAddr) -> SocketAddr {
    match (local_addr.ip(), addr.ip()) {
        (IpAddr::V6(_), IpAddr::V4(ip)) => {
            SocketAddr::new(IpAddr::V6(ip.to_ipv6_mapped()), addr.port())
        }
        _ => addr,
    }
}
