//! Protocol-fixed status codes carried by status and response frames.
//!
//! These values are part of the Digi wire protocol and must match exactly.

use std::fmt;

/// Delivery result reported by transmit-status frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    /// Delivered successfully.
    Success,
    /// No MAC-layer acknowledgement received.
    MacAckFailure,
    /// Clear channel assessment failed.
    CcaFailure,
    /// Invalid destination endpoint.
    InvalidDestinationEndpoint,
    /// No network-layer acknowledgement received.
    NetworkAckFailure,
    /// Radio is not joined to a network.
    NotJoined,
    /// Packet was self-addressed.
    SelfAddressed,
    /// 16-bit address of the destination could not be found.
    AddressNotFound,
    /// No route to the destination could be established.
    RouteNotFound,
    /// Status byte not covered by this protocol revision.
    Other(u8),
}

impl DeliveryStatus {
    /// Parses the status byte of a transmit-status frame.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::MacAckFailure,
            0x02 => Self::CcaFailure,
            0x15 => Self::InvalidDestinationEndpoint,
            0x21 => Self::NetworkAckFailure,
            0x22 => Self::NotJoined,
            0x23 => Self::SelfAddressed,
            0x24 => Self::AddressNotFound,
            0x25 => Self::RouteNotFound,
            other => Self::Other(other),
        }
    }

    /// Wire value of this status.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::MacAckFailure => 0x01,
            Self::CcaFailure => 0x02,
            Self::InvalidDestinationEndpoint => 0x15,
            Self::NetworkAckFailure => 0x21,
            Self::NotJoined => 0x22,
            Self::SelfAddressed => 0x23,
            Self::AddressNotFound => 0x24,
            Self::RouteNotFound => 0x25,
            Self::Other(b) => b,
        }
    }

    /// Returns true if the packet reached its destination.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(b) => write!(f, "unknown delivery status 0x{b:02x}"),
            other => write!(f, "{other:?} (0x{:02x})", other.as_byte()),
        }
    }
}

/// Unsolicited modem status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModemStatus {
    /// Power-on or hardware reset.
    HardwareReset,
    /// Watchdog timer reset (also follows a software reset command).
    WatchdogReset,
    /// Joined a network.
    Joined,
    /// Disassociated from the network.
    Disassociated,
    /// Coordinator started.
    CoordinatorStarted,
    /// Status byte not covered by this protocol revision.
    Other(u8),
}

impl ModemStatus {
    /// Parses the status byte of a modem-status frame.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::HardwareReset,
            0x01 => Self::WatchdogReset,
            0x02 => Self::Joined,
            0x03 => Self::Disassociated,
            0x06 => Self::CoordinatorStarted,
            other => Self::Other(other),
        }
    }

    /// Wire value of this status.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::HardwareReset => 0x00,
            Self::WatchdogReset => 0x01,
            Self::Joined => 0x02,
            Self::Disassociated => 0x03,
            Self::CoordinatorStarted => 0x06,
            Self::Other(b) => b,
        }
    }
}

impl fmt::Display for ModemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(b) => write!(f, "unknown modem status 0x{b:02x}"),
            other => write!(f, "{other:?} (0x{:02x})", other.as_byte()),
        }
    }
}

/// Completion status of a local or remote AT command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtStatus {
    /// Command accepted.
    Ok,
    /// Command failed.
    Error,
    /// Command name not recognized.
    InvalidCommand,
    /// Parameter out of range or malformed.
    InvalidParameter,
    /// Remote command could not be transmitted.
    TransmissionFailure,
    /// Status byte not covered by this protocol revision.
    Other(u8),
}

impl AtStatus {
    /// Parses the status byte of an AT response frame.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Ok,
            0x01 => Self::Error,
            0x02 => Self::InvalidCommand,
            0x03 => Self::InvalidParameter,
            0x04 => Self::TransmissionFailure,
            other => Self::Other(other),
        }
    }

    /// Wire value of this status.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::Error => 0x01,
            Self::InvalidCommand => 0x02,
            Self::InvalidParameter => 0x03,
            Self::TransmissionFailure => 0x04,
            Self::Other(b) => b,
        }
    }

    /// Returns true if the command was accepted.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for AtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(b) => write!(f, "unknown AT status 0x{b:02x}"),
            other => write!(f, "{other:?} (0x{:02x})", other.as_byte()),
        }
    }
}
