use crate::types::ProbeId;
use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A prober error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A prober error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("identifier {0} is already pending")]
    DuplicateIdentifier(ProbeId),
    #[error("invalid packet: {0}")]
    PacketError(#[from] crate::packet::error::Error),
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Probe failed to send: {0}")]
    ProbeFailed(IoError),
    #[error("prober error: {0}")]
    Other(String),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {0}: {1}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// The underlying [`io::ErrorKind`].
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Bind(e, _) | Self::SendTo(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoOperation {
    RecvFrom,
    LocalAddr,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecvFrom => write!(f, "recv from"),
            Self::LocalAddr => write!(f, "local addr"),
        }
    }
}
