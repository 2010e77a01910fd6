use thiserror::Error;

/// A packet error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A packet error.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum Error {
    /// Attempting to create a packet with an insufficient buffer size.
    #[error("insufficient buffer for {0} packet, minimum={1}, provided={2}")]
    InsufficientPacketBuffer(String, usize, usize),
    /// The datagram does not start with the probe magic.
    #[error("unexpected magic {0:02x?}")]
    BadMagic([u8; 4]),
    /// The datagram carries a protocol version we do not speak.
    #[error("unsupported version {0}")]
    UnsupportedVersion(u8),
    /// The datagram carries an unknown message kind.
    #[error("unknown message kind {0}")]
    UnknownKind(u8),
}
