//! Receive-direction data frames: 802.15.4 and ZigBee receive packets,
//! IO samples and node identification indicators.

use bytes::Bytes;

use crate::address::{NetworkAddress, SerialNumber, XBeeAddress};
use crate::error::Result;
use crate::response::FrameReader;

/// 802.15.4 receive packet with 64-bit source addressing (API-ID `0x80`).
///
/// Layout after the tag:
/// ```text
/// [source:8BE] [rssi:1] [options:1] [payload...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx64Response {
    /// Sender's serial number.
    pub source: SerialNumber,
    /// Received signal strength, -dBm.
    pub rssi: u8,
    /// Receive options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl Rx64Response {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        Ok(Self {
            source: SerialNumber(reader.u64_be()?),
            rssi: reader.u8()?,
            options: reader.u8()?,
            payload: Bytes::copy_from_slice(reader.rest()),
        })
    }
}

/// 802.15.4 receive packet with 16-bit source addressing (API-ID `0x81`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx16Response {
    /// Sender's network address.
    pub source: NetworkAddress,
    /// Received signal strength, -dBm.
    pub rssi: u8,
    /// Receive options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl Rx16Response {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        Ok(Self {
            source: NetworkAddress(reader.u16_be()?),
            rssi: reader.u8()?,
            options: reader.u8()?,
            payload: Bytes::copy_from_slice(reader.rest()),
        })
    }
}

/// ZigBee receive packet (API-ID `0x90`).
///
/// Layout after the tag:
/// ```text
/// [source64:8BE] [source16:2BE] [options:1] [payload...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZigbeeRxResponse {
    /// Sender's full address.
    pub source: XBeeAddress,
    /// Receive options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl ZigbeeRxResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        let serial = SerialNumber(reader.u64_be()?);
        let network = NetworkAddress(reader.u16_be()?);
        Ok(Self {
            source: XBeeAddress::new(serial, network),
            options: reader.u8()?,
            payload: Bytes::copy_from_slice(reader.rest()),
        })
    }
}

/// ZigBee receive packet with explicit addressing fields (API-ID `0x91`).
///
/// Layout after the tag:
/// ```text
/// [source64:8BE] [source16:2BE] [src_ep:1] [dst_ep:1]
/// [cluster:2BE] [profile:2BE] [options:1] [payload...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitRxResponse {
    /// Sender's full address.
    pub source: XBeeAddress,
    /// Source endpoint.
    pub source_endpoint: u8,
    /// Destination endpoint.
    pub destination_endpoint: u8,
    /// Cluster id.
    pub cluster_id: u16,
    /// Profile id.
    pub profile_id: u16,
    /// Receive options bitfield.
    pub options: u8,
    /// Application payload.
    pub payload: Bytes,
}

impl ExplicitRxResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        let serial = SerialNumber(reader.u64_be()?);
        let network = NetworkAddress(reader.u16_be()?);
        Ok(Self {
            source: XBeeAddress::new(serial, network),
            source_endpoint: reader.u8()?,
            destination_endpoint: reader.u8()?,
            cluster_id: reader.u16_be()?,
            profile_id: reader.u16_be()?,
            options: reader.u8()?,
            payload: Bytes::copy_from_slice(reader.rest()),
        })
    }
}

/// One analog channel reading inside an IO sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogSample {
    /// Analog channel number (0-3, 7 = supply voltage).
    pub channel: u8,
    /// Raw 10-bit ADC reading.
    pub value: u16,
}

/// ZigBee IO data sample (API-ID `0x92`).
///
/// Layout after the tag:
/// ```text
/// [source64:8BE] [source16:2BE] [options:1] [sample_count:1]
/// [digital_mask:2BE] [analog_mask:1]
/// [digital_state:2BE, present iff digital_mask != 0]
/// [analog_value:2BE per set analog_mask bit]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoSampleResponse {
    /// Sampling radio's full address.
    pub source: XBeeAddress,
    /// Receive options bitfield.
    pub options: u8,
    /// Bitmask of digital channels included in the sample.
    pub digital_mask: u16,
    /// Pin states of the masked digital channels, if any were sampled.
    pub digital: Option<u16>,
    /// Analog channel readings in channel order.
    pub analog: Vec<AnalogSample>,
}

impl IoSampleResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        let serial = SerialNumber(reader.u64_be()?);
        let network = NetworkAddress(reader.u16_be()?);
        let options = reader.u8()?;
        // Sample count is always 1 on current firmware; the field exists on
        // the wire regardless.
        let _sample_count = reader.u8()?;
        let digital_mask = reader.u16_be()?;
        let analog_mask = reader.u8()?;

        let digital = if digital_mask == 0 {
            None
        } else {
            Some(reader.u16_be()? & digital_mask)
        };

        let mut analog = Vec::new();
        for channel in 0..8u8 {
            if analog_mask & (1 << channel) != 0 {
                analog.push(AnalogSample {
                    channel,
                    value: reader.u16_be()?,
                });
            }
        }

        Ok(Self {
            source: XBeeAddress::new(serial, network),
            options,
            digital_mask,
            digital,
            analog,
        })
    }

    /// The state of a digital channel, if it was part of the sample.
    #[must_use]
    pub const fn digital_pin(&self, channel: u8) -> Option<bool> {
        let bit = 1u16 << channel;
        if self.digital_mask & bit == 0 {
            return None;
        }
        match self.digital {
            Some(state) => Some(state & bit != 0),
            None => None,
        }
    }
}

/// Node identification indicator (API-ID `0x95`).
///
/// Pushed when a remote node joins, is identified or has its commissioning
/// button pressed.
///
/// Layout after the tag:
/// ```text
/// [sender64:8BE] [sender16:2BE] [options:1]
/// [remote16:2BE] [remote64:8BE] [identifier:cstring] [parent16:2BE]
/// [device_type:1] [source_event:1] [profile:2BE] [manufacturer:2BE]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentificationResponse {
    /// Address of the radio that forwarded the indication.
    pub sender: XBeeAddress,
    /// Receive options bitfield.
    pub options: u8,
    /// Address of the identified node.
    pub remote: XBeeAddress,
    /// The node's NI string.
    pub node_identifier: String,
    /// Network address of the node's parent, or the unknown sentinel.
    pub parent: NetworkAddress,
    /// Device type (0 coordinator, 1 router, 2 end device).
    pub device_type: u8,
    /// Event that triggered the indication.
    pub source_event: u8,
    /// Digi application profile id.
    pub profile_id: u16,
    /// Digi manufacturer id.
    pub manufacturer_id: u16,
}

impl NodeIdentificationResponse {
    pub(crate) fn parse(reader: &mut FrameReader<'_>) -> Result<Self> {
        let sender_serial = SerialNumber(reader.u64_be()?);
        let sender_network = NetworkAddress(reader.u16_be()?);
        let options = reader.u8()?;
        let remote_network = NetworkAddress(reader.u16_be()?);
        let remote_serial = SerialNumber(reader.u64_be()?);
        let node_identifier = reader.cstring()?;
        let parent = NetworkAddress(reader.u16_be()?);
        let device_type = reader.u8()?;
        let source_event = reader.u8()?;
        let profile_id = reader.u16_be()?;
        let manufacturer_id = reader.u16_be()?;

        Ok(Self {
            sender: XBeeAddress::new(sender_serial, sender_network),
            options,
            remote: XBeeAddress::new(remote_serial, remote_network),
            node_identifier,
            parent,
            device_type,
            source_event,
            profile_id,
            manufacturer_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::response::XBeeResponse;

    use super::*;

    #[test]
    fn test_parse_zigbee_rx() {
        let mut frame = vec![0x90];
        frame.extend_from_slice(&0x0013_A200_4052_2BAAu64.to_be_bytes());
        frame.extend_from_slice(&[0x7D, 0x84]); // source16
        frame.push(0x01); // options
        frame.extend_from_slice(b"RxData");

        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::ZigbeeRx(rx) = response else {
            panic!("wrong variant");
        };
        assert_eq!(rx.source.serial, SerialNumber(0x0013_A200_4052_2BAA));
        assert_eq!(rx.source.network, NetworkAddress(0x7D84));
        assert_eq!(rx.options, 0x01);
        assert_eq!(&rx.payload[..], b"RxData");
    }

    #[test]
    fn test_parse_rx64_with_empty_payload() {
        let mut frame = vec![0x80];
        frame.extend_from_slice(&0x0013_A200_4000_0001u64.to_be_bytes());
        frame.extend_from_slice(&[0x28, 0x00]); // rssi, options

        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::Rx64(rx) = response else {
            panic!("wrong variant");
        };
        assert_eq!(rx.rssi, 0x28);
        assert!(rx.payload.is_empty());
    }

    #[test]
    fn test_parse_rx16() {
        let frame = [0x81, 0x12, 0x34, 0x30, 0x00, b'a', b'b'];
        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::Rx16(rx) = response else {
            panic!("wrong variant");
        };
        assert_eq!(rx.source, NetworkAddress(0x1234));
        assert_eq!(&rx.payload[..], b"ab");
    }

    #[test]
    fn test_parse_explicit_rx() {
        let mut frame = vec![0x91];
        frame.extend_from_slice(&0x0013_A200_4000_0002u64.to_be_bytes());
        frame.extend_from_slice(&[0x11, 0x22]); // source16
        frame.push(0xE8); // src endpoint
        frame.push(0xE8); // dst endpoint
        frame.extend_from_slice(&[0x00, 0x11]); // cluster
        frame.extend_from_slice(&[0xC1, 0x05]); // profile
        frame.push(0x01); // options
        frame.extend_from_slice(b"Z");

        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::ExplicitRx(rx) = response else {
            panic!("wrong variant");
        };
        assert_eq!(rx.cluster_id, 0x0011);
        assert_eq!(rx.profile_id, 0xC105);
        assert_eq!(rx.source_endpoint, 0xE8);
        assert_eq!(&rx.payload[..], b"Z");
    }

    #[test]
    fn test_parse_io_sample() {
        let mut frame = vec![0x92];
        frame.extend_from_slice(&0x0013_A200_4000_0003u64.to_be_bytes());
        frame.extend_from_slice(&[0x56, 0x78]); // source16
        frame.push(0x01); // options
        frame.push(0x01); // sample count
        frame.extend_from_slice(&[0x00, 0x0C]); // digital mask: DIO2, DIO3
        frame.push(0x03); // analog mask: AD0, AD1
        frame.extend_from_slice(&[0x00, 0x08]); // digital state: DIO3 high
        frame.extend_from_slice(&[0x02, 0x25]); // AD0
        frame.extend_from_slice(&[0x00, 0xF8]); // AD1

        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::IoSample(sample) = response else {
            panic!("wrong variant");
        };
        assert_eq!(sample.digital_pin(2), Some(false));
        assert_eq!(sample.digital_pin(3), Some(true));
        assert_eq!(sample.digital_pin(5), None);
        assert_eq!(sample.analog.len(), 2);
        assert_eq!(sample.analog[0].channel, 0);
        assert_eq!(sample.analog[0].value, 0x0225);
        assert_eq!(sample.analog[1].value, 0x00F8);
    }

    #[test]
    fn test_parse_node_identification() {
        let mut frame = vec![0x95];
        frame.extend_from_slice(&0x0013_A200_4000_0004u64.to_be_bytes());
        frame.extend_from_slice(&[0x9A, 0xBC]); // sender16
        frame.push(0x02); // options
        frame.extend_from_slice(&[0x9A, 0xBC]); // remote16
        frame.extend_from_slice(&0x0013_A200_4000_0004u64.to_be_bytes());
        frame.extend_from_slice(b"SENSOR-7\0");
        frame.extend_from_slice(&[0xFF, 0xFE]); // parent
        frame.push(0x01); // router
        frame.push(0x02); // pushbutton event
        frame.extend_from_slice(&[0xC1, 0x05]); // profile
        frame.extend_from_slice(&[0x10, 0x1E]); // manufacturer

        let response = XBeeResponse::decode(&frame).unwrap();
        let XBeeResponse::NodeIdentification(node) = response else {
            panic!("wrong variant");
        };
        assert_eq!(node.node_identifier, "SENSOR-7");
        assert_eq!(node.remote.network, NetworkAddress(0x9ABC));
        assert!(node.parent.is_unknown());
        assert_eq!(node.device_type, 0x01);
        assert_eq!(node.manufacturer_id, 0x101E);
    }
}
