//! Error types for the xbee library.

use thiserror::Error;

use crate::protocol::{AtStatus, DeliveryStatus, ModemStatus};

/// The main error type for xbee operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Packet encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Malformed or unexpected protocol data.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// No matching response arrived within the deadline.
    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,

    /// The request variant is not supported by the configured hardware series.
    #[error("unsupported request: {reason}")]
    Unsupported { reason: String },

    /// The device reported a non-success delivery status for a transmission.
    #[error("delivery failed: {0}")]
    Delivery(DeliveryStatus),

    /// An AT command completed with a non-OK status.
    #[error("AT command {command} failed: {status}")]
    At { command: String, status: AtStatus },

    /// A reset produced a modem status other than the expected one.
    #[error("unexpected modem status after reset: {0}")]
    UnexpectedModemStatus(ModemStatus),

    /// Channel receive error.
    #[error("channel closed")]
    ChannelClosed,
}

/// Packet framing errors.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Packet does not begin with the start byte.
    #[error("missing start byte: got 0x{0:02x}")]
    BadStartByte(u8),

    /// Packet too short to contain header, length and checksum.
    #[error("packet too short: need at least 4 bytes, got {0}")]
    TooShort(usize),

    /// Frame data exceeds the maximum encodable length.
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },

    /// Declared length disagrees with the bytes present.
    #[error("length mismatch: declared {declared}, got {got}")]
    LengthMismatch { declared: usize, got: usize },

    /// Checksum verification failed.
    #[error("checksum mismatch: computed 0x{computed:02x}, got 0x{got:02x}")]
    ChecksumMismatch { computed: u8, got: u8 },
}

/// Result type alias for xbee operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a timeout error from a [`std::time::Duration`].
    #[must_use]
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
