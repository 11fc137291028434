//! Status frames: transmit confirmations and unsolicited modem status.

use crate::address::NetworkAddress;
use crate::error::Result;
use crate::protocol::{DeliveryStatus, ModemStatus};
use crate::response::FrameReader;

/// 802.15.4 transmit status (API-ID `0x89`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxStatusResponse {
    /// Echoed correlation id.
    pub frame_id: u8,
    /// Delivery result.
    pub status: DeliveryStatus,
}

impl TxStatusResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        Ok(Self {
            frame_id: reader.u8()?,
            status: DeliveryStatus::from_byte(reader.u8()?),
        })
    }
}

/// ZigBee transmit status (API-ID `0x8B`).
///
/// Layout after the tag:
/// ```text
/// [frame_id:1] [dest16:2BE] [retries:1] [delivery:1] [discovery:1]
/// ```
/// The 16-bit address is where the packet was actually delivered, which
/// makes this frame a routing-hint source for the address cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitStatusResponse {
    /// Echoed correlation id.
    pub frame_id: u8,
    /// Network address the packet was delivered to.
    pub destination: NetworkAddress,
    /// Number of application retransmissions the radio performed.
    pub retry_count: u8,
    /// Delivery result.
    pub status: DeliveryStatus,
    /// Route discovery overhead indicator.
    pub discovery_status: u8,
}

impl TransmitStatusResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        Ok(Self {
            frame_id: reader.u8()?,
            destination: NetworkAddress(reader.u16_be()?),
            retry_count: reader.u8()?,
            status: DeliveryStatus::from_byte(reader.u8()?),
            discovery_status: reader.u8()?,
        })
    }
}

/// Unsolicited modem status (API-ID `0x8A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemStatusResponse {
    /// Reported status.
    pub status: ModemStatus,
}

impl ModemStatusResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        Ok(Self {
            status: ModemStatus::from_byte(reader.u8()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::response::XBeeResponse;

    use super::*;

    #[test]
    fn test_parse_tx_status() {
        let response = XBeeResponse::decode(&[0x89, 0x2A, 0x00]).unwrap();
        let XBeeResponse::TxStatus(status) = response else {
            panic!("wrong variant");
        };
        assert_eq!(status.frame_id, 0x2A);
        assert!(status.status.is_success());
    }

    #[test]
    fn test_parse_transmit_status_failure() {
        let frame = [0x8B, 0x01, 0x7D, 0x84, 0x02, 0x21, 0x00];
        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::TransmitStatus(status) = response else {
            panic!("wrong variant");
        };
        assert_eq!(status.frame_id, 0x01);
        assert_eq!(status.destination, NetworkAddress(0x7D84));
        assert_eq!(status.retry_count, 2);
        assert_eq!(status.status, DeliveryStatus::NetworkAckFailure);
    }

    #[test]
    fn test_parse_modem_status() {
        let response = XBeeResponse::decode(&[0x8A, 0x01]).unwrap();
        let XBeeResponse::ModemStatus(status) = response else {
            panic!("wrong variant");
        };
        assert_eq!(status.status, ModemStatus::WatchdogReset);
    }
}
