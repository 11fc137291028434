//! Radio addressing: 64-bit serial numbers, 16-bit network addresses and
//! the opportunistic serial-to-network lookup cache.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use crate::error::Error;

/// Globally unique 64-bit radio serial number.
///
/// This is the stable identity of a radio; it never changes for the life of
/// the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerialNumber(pub u64);

impl SerialNumber {
    /// Broadcast destination.
    pub const BROADCAST: Self = Self(0x0000_0000_0000_FFFF);

    /// ZigBee coordinator shorthand address.
    pub const COORDINATOR: Self = Self(0);

    /// Parses a serial number from 8 big-endian bytes.
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Big-endian wire representation.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl FromStr for SerialNumber {
    type Err = Error;

    /// Parses a 16-digit hex serial, e.g. `"0013A20040A12345"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| Error::Protocol {
            message: format!("invalid serial number {s:?}: {e}"),
        })?;
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| Error::Protocol {
            message: format!("invalid serial number {s:?}: expected 8 bytes"),
        })?;
        Ok(Self::from_be_bytes(bytes))
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Mesh-local 16-bit routing address.
///
/// Volatile: assigned when a node joins and may change after a re-join.
/// [`NetworkAddress::UNKNOWN`] is the sentinel a sender uses when it has no
/// routing hint; mesh firmware resolves the route itself in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkAddress(pub u16);

impl NetworkAddress {
    /// "Address unknown" sentinel (`0xFFFE`).
    pub const UNKNOWN: Self = Self(0xFFFE);

    /// Broadcast network address (`0xFFFF`).
    pub const BROADCAST: Self = Self(0xFFFF);

    /// Returns true if this is the unknown sentinel.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }

    /// Big-endian wire representation.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown")
        } else {
            write!(f, "{:04X}", self.0)
        }
    }
}

impl From<u16> for NetworkAddress {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// A radio's full address: stable serial plus volatile routing hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XBeeAddress {
    /// 64-bit serial number.
    pub serial: SerialNumber,
    /// 16-bit network address, possibly [`NetworkAddress::UNKNOWN`].
    pub network: NetworkAddress,
}

impl XBeeAddress {
    /// Creates an address with both parts known.
    #[must_use]
    pub const fn new(serial: SerialNumber, network: NetworkAddress) -> Self {
        Self { serial, network }
    }

    /// Creates an address with only the serial known.
    #[must_use]
    pub const fn from_serial(serial: SerialNumber) -> Self {
        Self {
            serial,
            network: NetworkAddress::UNKNOWN,
        }
    }

    /// Broadcast address.
    #[must_use]
    pub const fn broadcast() -> Self {
        Self {
            serial: SerialNumber::BROADCAST,
            network: NetworkAddress::BROADCAST,
        }
    }
}

impl fmt::Display for XBeeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.serial, self.network)
    }
}

impl From<SerialNumber> for XBeeAddress {
    fn from(serial: SerialNumber) -> Self {
        Self::from_serial(serial)
    }
}

/// Opportunistically populated serial-to-network address map.
///
/// Entries are recorded whenever an inbound frame carries both halves of a
/// sender's address. Lookups never block and never trigger active resolution;
/// a miss returns [`NetworkAddress::UNKNOWN`] and the caller relies on mesh
/// routing instead. Entries are never evicted - a stale entry persists until
/// a newer observation overwrites it.
#[derive(Debug, Default)]
pub struct AddressCache {
    entries: Mutex<HashMap<SerialNumber, NetworkAddress>>,
}

impl AddressCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observed serial/network pairing.
    ///
    /// Observations carrying the unknown sentinel are ignored so a cached
    /// hint is not clobbered by a frame that lacked one.
    pub fn record(&self, serial: SerialNumber, network: NetworkAddress) {
        if network.is_unknown() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.insert(serial, network);
        if previous != Some(network) {
            tracing::debug!(%serial, %network, "learned network address");
        }
    }

    /// Returns the cached network address for a serial, or the unknown
    /// sentinel if it has never been observed.
    #[must_use]
    pub fn network_address(&self, serial: SerialNumber) -> NetworkAddress {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&serial)
            .copied()
            .unwrap_or(NetworkAddress::UNKNOWN)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all entries. Used on teardown.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_number_display_and_parse() {
        let serial: SerialNumber = "0013A20040A12345".parse().unwrap();
        assert_eq!(serial.0, 0x0013_A200_40A1_2345);
        assert_eq!(serial.to_string(), "0013A20040A12345");
    }

    #[test]
    fn test_serial_number_rejects_bad_input() {
        assert!("xyz".parse::<SerialNumber>().is_err());
        assert!("0013A200".parse::<SerialNumber>().is_err());
    }

    #[test]
    fn test_network_address_sentinel() {
        assert!(NetworkAddress::UNKNOWN.is_unknown());
        assert!(!NetworkAddress(0x1234).is_unknown());
        assert_eq!(NetworkAddress::UNKNOWN.to_string(), "unknown");
    }

    #[test]
    fn test_cache_observation_then_hit() {
        let cache = AddressCache::new();
        let serial = SerialNumber(0x0013_A200_4000_0001);

        assert!(cache.network_address(serial).is_unknown());
        cache.record(serial, NetworkAddress(0x1A2B));
        assert_eq!(cache.network_address(serial), NetworkAddress(0x1A2B));
    }

    #[test]
    fn test_cache_overwrites_on_new_observation() {
        let cache = AddressCache::new();
        let serial = SerialNumber(1);
        cache.record(serial, NetworkAddress(0x0001));
        cache.record(serial, NetworkAddress(0x0002));
        assert_eq!(cache.network_address(serial), NetworkAddress(0x0002));
    }

    #[test]
    fn test_cache_ignores_unknown_sentinel() {
        let cache = AddressCache::new();
        let serial = SerialNumber(1);
        cache.record(serial, NetworkAddress(0x0001));
        cache.record(serial, NetworkAddress::UNKNOWN);
        assert_eq!(cache.network_address(serial), NetworkAddress(0x0001));
    }
}
