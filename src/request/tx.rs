//! Transmit-direction data frames.

use bytes::{BufMut, Bytes, BytesMut};

use crate::address::{NetworkAddress, SerialNumber, XBeeAddress};
use crate::protocol::ApiId;

/// Transmit options bitfield shared by the data-transmit variants.
pub mod tx_options {
    /// Disable acknowledgement.
    pub const DISABLE_ACK: u8 = 0x01;
    /// Send with the broadcast PAN id (802.15.4 only).
    pub const BROADCAST_PAN: u8 = 0x04;
    /// Enable APS encryption (ZigBee only).
    pub const APS_ENCRYPTION: u8 = 0x20;
}

/// 802.15.4 transmit to a 64-bit address (API-ID `0x00`).
///
/// Layout after the tag:
/// ```text
/// [frame_id:1] [dest64:8BE] [options:1] [payload...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx64Request {
    /// Correlation id, assigned at send time.
    pub frame_id: u8,
    /// Destination serial number.
    pub destination: SerialNumber,
    /// Transmit options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl Tx64Request {
    /// Creates a transmit request with default options.
    pub fn new(destination: SerialNumber, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_id: 0,
            destination,
            options: 0,
            payload: payload.into(),
        }
    }

    pub(crate) fn frame_data(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(11 + self.payload.len());
        buf.put_u8(ApiId::Tx64Request as u8);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_u8(self.options);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

/// 802.15.4 transmit to a 16-bit address (API-ID `0x01`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx16Request {
    /// Correlation id, assigned at send time.
    pub frame_id: u8,
    /// Destination network address.
    pub destination: NetworkAddress,
    /// Transmit options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl Tx16Request {
    /// Creates a transmit request with default options.
    pub fn new(destination: NetworkAddress, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_id: 0,
            destination,
            options: 0,
            payload: payload.into(),
        }
    }

    pub(crate) fn frame_data(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5 + self.payload.len());
        buf.put_u8(ApiId::Tx16Request as u8);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_u8(self.options);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

/// ZigBee transmit request (API-ID `0x10`).
///
/// Layout after the tag:
/// ```text
/// [frame_id:1] [dest64:8BE] [dest16:2BE] [radius:1] [options:1] [payload...]
/// ```
/// The 16-bit half of the destination is a routing hint; the unknown sentinel
/// tells the mesh firmware to resolve the route itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    /// Correlation id, assigned at send time.
    pub frame_id: u8,
    /// Destination address (serial + routing hint).
    pub destination: XBeeAddress,
    /// Maximum broadcast hops; 0 = network maximum.
    pub broadcast_radius: u8,
    /// Transmit options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl TransmitRequest {
    /// Creates a unicast transmit request with default options.
    pub fn new(destination: XBeeAddress, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_id: 0,
            destination,
            broadcast_radius: 0,
            options: 0,
            payload: payload.into(),
        }
    }

    pub(crate) fn frame_data(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(14 + self.payload.len());
        buf.put_u8(ApiId::ZigbeeTransmitRequest as u8);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.serial.to_be_bytes());
        buf.put_slice(&self.destination.network.to_be_bytes());
        buf.put_u8(self.broadcast_radius);
        buf.put_u8(self.options);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

/// ZigBee transmit with explicit endpoint/cluster/profile addressing
/// (API-ID `0x11`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitTxRequest {
    /// Correlation id, assigned at send time.
    pub frame_id: u8,
    /// Destination address (serial + routing hint).
    pub destination: XBeeAddress,
    /// Source endpoint.
    pub source_endpoint: u8,
    /// Destination endpoint.
    pub destination_endpoint: u8,
    /// Cluster id.
    pub cluster_id: u16,
    /// Profile id.
    pub profile_id: u16,
    /// Maximum broadcast hops; 0 = network maximum.
    pub broadcast_radius: u8,
    /// Transmit options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl ExplicitTxRequest {
    pub(crate) fn frame_data(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(20 + self.payload.len());
        buf.put_u8(ApiId::ExplicitTxRequest as u8);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.serial.to_be_bytes());
        buf.put_slice(&self.destination.network.to_be_bytes());
        buf.put_u8(self.source_endpoint);
        buf.put_u8(self.destination_endpoint);
        buf.put_u16(self.cluster_id);
        buf.put_u16(self.profile_id);
        buf.put_u8(self.broadcast_radius);
        buf.put_u8(self.options);
        buf.put_slice(&self.payload);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::{checksum, encode_packet};

    use super::*;

    #[test]
    fn test_tx64_frame_data_layout() {
        let mut request = Tx64Request::new(SerialNumber(0x0013_A200_4000_1234), &b"Hi"[..]);
        request.frame_id = 1;

        let data = request.frame_data();
        assert_eq!(data[0], 0x00);
        assert_eq!(data[1], 0x01);
        assert_eq!(&data[2..10], &0x0013_A200_4000_1234u64.to_be_bytes());
        assert_eq!(data[10], 0x00);
        assert_eq!(&data[11..], b"Hi");

        // Length field = api_id + frame_id + dest + options + payload,
        // trailing byte = checksum over the unescaped frame-data.
        let packet = encode_packet(&data).unwrap();
        let length = u16::from_be_bytes([packet[1], packet[2]]);
        assert_eq!(length, 1 + 1 + 8 + 1 + 2);
        assert_eq!(packet[packet.len() - 1], checksum::compute(&data));
    }

    #[test]
    fn test_tx16_frame_data_layout() {
        let mut request = Tx16Request::new(NetworkAddress(0x5678), &b"ping"[..]);
        request.frame_id = 0x44;
        request.options = tx_options::DISABLE_ACK;

        let data = request.frame_data();
        assert_eq!(&data[..5], &[0x01, 0x44, 0x56, 0x78, 0x01]);
        assert_eq!(&data[5..], b"ping");
    }

    #[test]
    fn test_transmit_request_frame_data_layout() {
        let destination = XBeeAddress::new(
            SerialNumber(0x0013_A200_4052_2BAA),
            NetworkAddress::UNKNOWN,
        );
        let mut request = TransmitRequest::new(destination, &b"TxData"[..]);
        request.frame_id = 0x01;

        let data = request.frame_data();
        assert_eq!(data[0], 0x10);
        assert_eq!(data[1], 0x01);
        assert_eq!(&data[2..10], &0x0013_A200_4052_2BAAu64.to_be_bytes());
        assert_eq!(&data[10..12], &[0xFF, 0xFE]);
        assert_eq!(&data[12..14], &[0x00, 0x00]);
        assert_eq!(&data[14..], b"TxData");
    }

    #[test]
    fn test_explicit_tx_frame_data_layout() {
        let request = ExplicitTxRequest {
            frame_id: 0x07,
            destination: XBeeAddress::broadcast(),
            source_endpoint: 0xE8,
            destination_endpoint: 0xE8,
            cluster_id: 0x0011,
            profile_id: 0xC105,
            broadcast_radius: 0,
            options: 0,
            payload: Bytes::from_static(b"x"),
        };

        let data = request.frame_data();
        assert_eq!(data[0], 0x11);
        assert_eq!(&data[12..14], &[0xE8, 0xE8]);
        assert_eq!(&data[14..16], &[0x00, 0x11]);
        assert_eq!(&data[16..18], &[0xC1, 0x05]);
        assert_eq!(data.len(), 21);
    }
}
