//! AT command responses, local and remote.

use bytes::Bytes;

use crate::address::{NetworkAddress, SerialNumber, XBeeAddress};
use crate::error::Result;
use crate::protocol::AtStatus;
use crate::request::AtCommandName;
use crate::response::FrameReader;

/// Local AT command response (API-ID `0x88`).
///
/// Layout after the tag:
/// ```text
/// [frame_id:1] [command:2] [status:1] [value...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtResponse {
    /// Echoed correlation id.
    pub frame_id: u8,
    /// Register name the command addressed.
    pub command: AtCommandName,
    /// Completion status.
    pub status: AtStatus,
    /// Register value for reads; empty for writes.
    pub value: Bytes,
}

impl AtResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        let frame_id = reader.u8()?;
        let name: [u8; 2] = [reader.u8()?, reader.u8()?];
        Ok(Self {
            frame_id,
            command: AtCommandName(name),
            status: AtStatus::from_byte(reader.u8()?),
            value: Bytes::copy_from_slice(reader.rest()),
        })
    }
}

/// Remote AT command response (API-ID `0x97`).
///
/// Layout after the tag:
/// ```text
/// [frame_id:1] [source64:8BE] [source16:2BE] [command:2] [status:1] [value...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtResponse {
    /// Echoed correlation id.
    pub frame_id: u8,
    /// Responding radio's full address.
    pub source: XBeeAddress,
    /// Register name the command addressed.
    pub command: AtCommandName,
    /// Completion status.
    pub status: AtStatus,
    /// Register value for reads; empty for writes.
    pub value: Bytes,
}

impl RemoteAtResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        let frame_id = reader.u8()?;
        let serial = SerialNumber(reader.u64_be()?);
        let network = NetworkAddress(reader.u16_be()?);
        let name: [u8; 2] = [reader.u8()?, reader.u8()?];
        Ok(Self {
            frame_id,
            source: XBeeAddress::new(serial, network),
            command: AtCommandName(name),
            status: AtStatus::from_byte(reader.u8()?),
            value: Bytes::copy_from_slice(reader.rest()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::response::XBeeResponse;

    use super::*;

    #[test]
    fn test_parse_at_response() {
        let frame = [0x88, 0x01, b'B', b'D', 0x00, 0x07];
        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::At(at) = response else {
            panic!("wrong variant");
        };
        assert_eq!(at.frame_id, 0x01);
        assert_eq!(at.command.to_string(), "BD");
        assert!(at.status.is_ok());
        assert_eq!(&at.value[..], &[0x07]);
    }

    #[test]
    fn test_parse_at_response_error_status() {
        let frame = [0x88, 0x02, b'Z', b'Z', 0x02];
        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::At(at) = response else {
            panic!("wrong variant");
        };
        assert_eq!(at.status, AtStatus::InvalidCommand);
        assert!(at.value.is_empty());
    }

    #[test]
    fn test_parse_remote_at_response() {
        let mut frame = vec![0x97, 0x55];
        frame.extend_from_slice(&0x0013_A200_4052_2BAAu64.to_be_bytes());
        frame.extend_from_slice(&[0x7D, 0x84]);
        frame.extend_from_slice(b"SL");
        frame.push(0x00);
        frame.extend_from_slice(&[0x40, 0x52, 0x2B, 0xAA]);

        let response = XBeeResponse::decode(&frame).unwrap();
        assert_eq!(response.frame_id(), Some(0x55));
        let XBeeResponse::RemoteAt(at) = response else {
            panic!("wrong variant");
        };
        assert_eq!(at.source.serial, SerialNumber(0x0013_A200_4052_2BAA));
        assert_eq!(at.source.network, NetworkAddress(0x7D84));
        assert_eq!(at.command.to_string(), "SL");
        assert_eq!(&at.value[..], &[0x40, 0x52, 0x2B, 0xAA]);
    }
}
