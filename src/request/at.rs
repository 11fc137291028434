//! AT command requests, local and remote.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::address::XBeeAddress;
use crate::protocol::ApiId;

/// Two-letter AT command name, e.g. `NI` or `ND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommandName(pub [u8; 2]);

impl AtCommandName {
    /// Creates a command name from its two ASCII letters.
    #[must_use]
    pub const fn new(name: [u8; 2]) -> Self {
        Self(name)
    }
}

impl fmt::Display for AtCommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

impl From<[u8; 2]> for AtCommandName {
    fn from(name: [u8; 2]) -> Self {
        Self(name)
    }
}

impl From<&[u8; 2]> for AtCommandName {
    fn from(name: &[u8; 2]) -> Self {
        Self(*name)
    }
}

/// Local AT command request (API-ID `0x08`, or `0x09` when queued).
///
/// An empty parameter reads the register; a non-empty one writes it. Queued
/// commands are buffered by the radio until an apply-changes (`AC`) or a
/// non-queued command arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommandRequest {
    /// Correlation id, assigned at send time.
    pub frame_id: u8,
    /// Register name.
    pub command: AtCommandName,
    /// Parameter bytes; empty for a read.
    pub parameter: Bytes,
    /// Defer application until apply-changes.
    pub queued: bool,
}

impl AtCommandRequest {
    /// Creates a parameter read.
    pub fn read(command: impl Into<AtCommandName>) -> Self {
        Self {
            frame_id: 0,
            command: command.into(),
            parameter: Bytes::new(),
            queued: false,
        }
    }

    /// Creates a parameter write.
    pub fn write(command: impl Into<AtCommandName>, parameter: impl Into<Bytes>) -> Self {
        Self {
            frame_id: 0,
            command: command.into(),
            parameter: parameter.into(),
            queued: false,
        }
    }

    /// The API-ID this request serializes under.
    #[must_use]
    pub const fn api_id(&self) -> ApiId {
        if self.queued {
            ApiId::AtCommandQueue
        } else {
            ApiId::AtCommand
        }
    }

    pub(crate) fn frame_data(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4 + self.parameter.len());
        buf.put_u8(self.api_id() as u8);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.command.0);
        buf.put_slice(&self.parameter);
        buf.freeze()
    }
}

/// AT command addressed to a remote radio (API-ID `0x17`).
///
/// Layout after the tag:
/// ```text
/// [frame_id:1] [dest64:8BE] [dest16:2BE] [options:1] [command:2] [parameter...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommandRequest {
    /// Correlation id, assigned at send time.
    pub frame_id: u8,
    /// Target radio.
    pub destination: XBeeAddress,
    /// Apply the change immediately instead of queueing it remotely.
    pub apply_changes: bool,
    /// Register name.
    pub command: AtCommandName,
    /// Parameter bytes; empty for a read.
    pub parameter: Bytes,
}

impl RemoteAtCommandRequest {
    const APPLY_CHANGES: u8 = 0x02;

    /// Creates a remote parameter read.
    pub fn read(destination: XBeeAddress, command: impl Into<AtCommandName>) -> Self {
        Self {
            frame_id: 0,
            destination,
            apply_changes: true,
            command: command.into(),
            parameter: Bytes::new(),
        }
    }

    /// Creates a remote parameter write, applied immediately.
    pub fn write(
        destination: XBeeAddress,
        command: impl Into<AtCommandName>,
        parameter: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_id: 0,
            destination,
            apply_changes: true,
            command: command.into(),
            parameter: parameter.into(),
        }
    }

    pub(crate) fn frame_data(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(15 + self.parameter.len());
        buf.put_u8(ApiId::RemoteAtCommand as u8);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.serial.to_be_bytes());
        buf.put_slice(&self.destination.network.to_be_bytes());
        buf.put_u8(if self.apply_changes {
            Self::APPLY_CHANGES
        } else {
            0x00
        });
        buf.put_slice(&self.command.0);
        buf.put_slice(&self.parameter);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use crate::address::{NetworkAddress, SerialNumber};

    use super::*;

    #[test]
    fn test_at_read_frame_data() {
        let mut request = AtCommandRequest::read(b"NI");
        request.frame_id = 0x52;
        assert_eq!(&request.frame_data()[..], &[0x08, 0x52, b'N', b'I']);
    }

    #[test]
    fn test_at_write_frame_data() {
        let mut request = AtCommandRequest::write(b"NJ", vec![0xFF]);
        request.frame_id = 0x01;
        assert_eq!(&request.frame_data()[..], &[0x08, 0x01, b'N', b'J', 0xFF]);
    }

    #[test]
    fn test_queued_at_uses_queue_api_id() {
        let mut request = AtCommandRequest::write(b"BD", vec![0x07]);
        request.queued = true;
        assert_eq!(request.api_id(), ApiId::AtCommandQueue);
        assert_eq!(request.frame_data()[0], 0x09);
    }

    #[test]
    fn test_remote_at_frame_data() {
        let destination = XBeeAddress::new(
            SerialNumber(0x0013_A200_4040_1122),
            NetworkAddress::UNKNOWN,
        );
        let mut request = RemoteAtCommandRequest::write(destination, b"D1", vec![0x03]);
        request.frame_id = 0x55;

        let data = request.frame_data();
        assert_eq!(data[0], 0x17);
        assert_eq!(data[1], 0x55);
        assert_eq!(&data[2..10], &0x0013_A200_4040_1122u64.to_be_bytes());
        assert_eq!(&data[10..12], &[0xFF, 0xFE]);
        assert_eq!(data[12], 0x02); // apply changes
        assert_eq!(&data[13..15], b"D1");
        assert_eq!(data[15], 0x03);
    }
}
