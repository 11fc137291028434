//! Device configuration read at open time, plus the named AT registers the
//! library touches.

use crate::address::{NetworkAddress, SerialNumber, XBeeAddress};
use crate::error::{Error, Result};
use crate::request::AtCommandName;
use crate::response::FrameReader;

/// AT register names used by the library.
pub mod commands {
    use crate::request::AtCommandName;

    /// API mode (0 = transparent, 1 = API, 2 = API with escaping).
    pub const API_ENABLE: AtCommandName = AtCommandName(*b"AP");
    /// Hardware version; the high byte identifies the hardware series.
    pub const HARDWARE_VERSION: AtCommandName = AtCommandName(*b"HV");
    /// Firmware version.
    pub const FIRMWARE_VERSION: AtCommandName = AtCommandName(*b"VR");
    /// Serial number, high 32 bits.
    pub const SERIAL_HIGH: AtCommandName = AtCommandName(*b"SH");
    /// Serial number, low 32 bits.
    pub const SERIAL_LOW: AtCommandName = AtCommandName(*b"SL");
    /// Node identifier string.
    pub const NODE_IDENTIFIER: AtCommandName = AtCommandName(*b"NI");
    /// Node discovery timeout, 100 ms units.
    pub const DISCOVERY_TIMEOUT: AtCommandName = AtCommandName(*b"NT");
    /// Node discovery broadcast.
    pub const NODE_DISCOVER: AtCommandName = AtCommandName(*b"ND");
    /// Software reset.
    pub const SOFTWARE_RESET: AtCommandName = AtCommandName(*b"FR");
    /// Network reset.
    pub const NETWORK_RESET: AtCommandName = AtCommandName(*b"NR");
    /// Apply queued changes.
    pub const APPLY_CHANGES: AtCommandName = AtCommandName(*b"AC");
    /// Write parameters to non-volatile memory.
    pub const WRITE: AtCommandName = AtCommandName(*b"WR");
}

/// Serial API operating mode (`AP` register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    /// Transparent (AT) mode; the API engine cannot talk to the radio.
    Disabled,
    /// API frames without escaping.
    Enabled,
    /// API frames with escaping; what this library speaks.
    EnabledWithEscaping,
    /// Unrecognized register value.
    Other(u8),
}

impl ApiMode {
    /// Parses the `AP` register value.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::Disabled,
            1 => Self::Enabled,
            2 => Self::EnabledWithEscaping,
            other => Self::Other(other),
        }
    }

    /// Register value for this mode.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Disabled => 0,
            Self::Enabled => 1,
            Self::EnabledWithEscaping => 2,
            Self::Other(b) => b,
        }
    }
}

/// Hardware generation, derived from the high byte of the `HV` register.
///
/// The generation decides which transmit variants the radio accepts and
/// whether mesh address lookup is worth running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareSeries {
    /// 802.15.4 point-to-point radios (XBee / XBee-PRO S1).
    Series1,
    /// ZigBee mesh radios (S2 and later).
    Series2,
}

impl HardwareSeries {
    /// Derives the series from a hardware version register value.
    #[must_use]
    pub const fn from_hardware_version(hardware_version: u16) -> Self {
        // 0x17xx = XBee S1, 0x18xx = XBee-PRO S1; everything newer is
        // ZigBee-capable.
        match hardware_version >> 8 {
            0x17 | 0x18 => Self::Series1,
            _ => Self::Series2,
        }
    }

    /// Returns true for mesh-capable (ZigBee) hardware.
    #[must_use]
    pub const fn is_mesh_capable(self) -> bool {
        matches!(self, Self::Series2)
    }
}

/// Device parameters read once at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XBeeConfiguration {
    /// `HV` register value.
    pub hardware_version: u16,
    /// `VR` register value.
    pub firmware_version: u16,
    /// Hardware generation derived from the hardware version.
    pub series: HardwareSeries,
    /// `SH`/`SL` combined.
    pub serial_number: SerialNumber,
    /// `NI` string.
    pub node_identifier: String,
    /// `AP` register value.
    pub api_mode: ApiMode,
}

/// One record yielded by node discovery.
///
/// The `ND` command makes every reachable node answer with its addressing
/// and identity; records trickle in until the device-configured discovery
/// window closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredNode {
    /// The node's full address.
    pub address: XBeeAddress,
    /// The node's NI string.
    pub node_identifier: String,
    /// Network address of the node's parent, or the unknown sentinel.
    pub parent: NetworkAddress,
    /// Device type (0 coordinator, 1 router, 2 end device).
    pub device_type: u8,
    /// Digi application profile id.
    pub profile_id: u16,
    /// Digi manufacturer id.
    pub manufacturer_id: u16,
}

impl DiscoveredNode {
    /// Parses one discovery record from an `ND` response value.
    ///
    /// Layout:
    /// ```text
    /// [my:2BE] [sh:4BE] [sl:4BE] [identifier:cstring] [parent:2BE]
    /// [device_type:1] [status:1] [profile:2BE] [manufacturer:2BE]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for a truncated or over-long record.
    pub fn parse(value: &[u8]) -> Result<Self> {
        let mut reader = FrameReader::new(value);
        let network = NetworkAddress(reader.u16_be()?);
        let serial_high = reader.u16_be()?;
        let serial_mid = reader.u16_be()?;
        let serial_low_hi = reader.u16_be()?;
        let serial_low_lo = reader.u16_be()?;
        let serial = SerialNumber(
            (u64::from(serial_high) << 48)
                | (u64::from(serial_mid) << 32)
                | (u64::from(serial_low_hi) << 16)
                | u64::from(serial_low_lo),
        );
        let node_identifier = reader.cstring()?;
        let parent = NetworkAddress(reader.u16_be()?);
        let device_type = reader.u8()?;
        let _status = reader.u8()?;
        let profile_id = reader.u16_be()?;
        let manufacturer_id = reader.u16_be()?;
        reader.finish()?;

        Ok(Self {
            address: XBeeAddress::new(serial, network),
            node_identifier,
            parent,
            device_type,
            profile_id,
            manufacturer_id,
        })
    }
}

/// Parses a big-endian register value of 1 to 8 bytes into a `u64`.
pub(crate) fn register_value(command: AtCommandName, value: &[u8]) -> Result<u64> {
    if value.is_empty() || value.len() > 8 {
        return Err(Error::Protocol {
            message: format!("register {command} value has {} bytes", value.len()),
        });
    }
    Ok(value.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_from_hardware_version() {
        assert_eq!(
            HardwareSeries::from_hardware_version(0x1744),
            HardwareSeries::Series1
        );
        assert_eq!(
            HardwareSeries::from_hardware_version(0x1842),
            HardwareSeries::Series1
        );
        assert_eq!(
            HardwareSeries::from_hardware_version(0x1E00),
            HardwareSeries::Series2
        );
        assert!(HardwareSeries::from_hardware_version(0x1941).is_mesh_capable());
        assert!(!HardwareSeries::from_hardware_version(0x1744).is_mesh_capable());
    }

    #[test]
    fn test_api_mode_round_trip() {
        assert_eq!(ApiMode::from_byte(2), ApiMode::EnabledWithEscaping);
        assert_eq!(ApiMode::from_byte(9), ApiMode::Other(9));
        assert_eq!(ApiMode::EnabledWithEscaping.as_byte(), 2);
    }

    #[test]
    fn test_register_value() {
        assert_eq!(register_value(commands::API_ENABLE, &[0x02]).unwrap(), 2);
        assert_eq!(
            register_value(commands::FIRMWARE_VERSION, &[0x21, 0x70]).unwrap(),
            0x2170
        );
        assert!(register_value(commands::API_ENABLE, &[]).is_err());
        assert!(register_value(commands::API_ENABLE, &[0; 9]).is_err());
    }

    #[test]
    fn test_parse_discovered_node() {
        let mut value = vec![0x33, 0x10]; // MY
        value.extend_from_slice(&[0x00, 0x13, 0xA2, 0x00]); // SH
        value.extend_from_slice(&[0x40, 0x52, 0x2B, 0xAA]); // SL
        value.extend_from_slice(b"PUMP-1\0");
        value.extend_from_slice(&[0xFF, 0xFE]); // parent
        value.push(0x01); // router
        value.push(0x00); // status
        value.extend_from_slice(&[0xC1, 0x05]); // profile
        value.extend_from_slice(&[0x10, 0x1E]); // manufacturer

        let node = DiscoveredNode::parse(&value).unwrap();
        assert_eq!(node.address.serial, SerialNumber(0x0013_A200_4052_2BAA));
        assert_eq!(node.address.network, NetworkAddress(0x3310));
        assert_eq!(node.node_identifier, "PUMP-1");
        assert_eq!(node.device_type, 0x01);
        assert!(node.parent.is_unknown());
    }

    #[test]
    fn test_parse_discovered_node_rejects_truncated() {
        assert!(DiscoveredNode::parse(&[0x33, 0x10, 0x00]).is_err());
    }
}
