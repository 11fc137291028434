//! API-ID definitions for the XBee API protocol.
//!
//! The API-ID is the first byte of every frame-data range and identifies
//! the request or response kind that follows.

/// Frame kinds, requests and responses alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ApiId {
    // Requests (host to radio)
    /// Transmit to a 64-bit address (802.15.4).
    Tx64Request = 0x00,
    /// Transmit to a 16-bit address (802.15.4).
    Tx16Request = 0x01,
    /// Local AT command, applied immediately.
    AtCommand = 0x08,
    /// Local AT command, queued until an apply-changes.
    AtCommandQueue = 0x09,
    /// ZigBee transmit request.
    ZigbeeTransmitRequest = 0x10,
    /// ZigBee transmit with explicit endpoint/cluster/profile addressing.
    ExplicitTxRequest = 0x11,
    /// AT command addressed to a remote radio.
    RemoteAtCommand = 0x17,

    // Responses (radio to host)
    /// Receive from a 64-bit address (802.15.4).
    Rx64Response = 0x80,
    /// Receive from a 16-bit address (802.15.4).
    Rx16Response = 0x81,
    /// Local AT command response.
    AtResponse = 0x88,
    /// 802.15.4 transmit status.
    TxStatusResponse = 0x89,
    /// Unsolicited modem status.
    ModemStatus = 0x8A,
    /// ZigBee transmit status.
    ZigbeeTransmitStatus = 0x8B,
    /// ZigBee receive packet.
    ZigbeeRxResponse = 0x90,
    /// ZigBee receive with explicit addressing fields.
    ExplicitRxResponse = 0x91,
    /// ZigBee IO data sample.
    IoSampleResponse = 0x92,
    /// Node identification indicator.
    NodeIdentification = 0x95,
    /// Remote AT command response.
    RemoteAtResponse = 0x97,
}

impl ApiId {
    /// Attempts to parse an API-ID from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Tx64Request),
            0x01 => Some(Self::Tx16Request),
            0x08 => Some(Self::AtCommand),
            0x09 => Some(Self::AtCommandQueue),
            0x10 => Some(Self::ZigbeeTransmitRequest),
            0x11 => Some(Self::ExplicitTxRequest),
            0x17 => Some(Self::RemoteAtCommand),
            0x80 => Some(Self::Rx64Response),
            0x81 => Some(Self::Rx16Response),
            0x88 => Some(Self::AtResponse),
            0x89 => Some(Self::TxStatusResponse),
            0x8A => Some(Self::ModemStatus),
            0x8B => Some(Self::ZigbeeTransmitStatus),
            0x90 => Some(Self::ZigbeeRxResponse),
            0x91 => Some(Self::ExplicitRxResponse),
            0x92 => Some(Self::IoSampleResponse),
            0x95 => Some(Self::NodeIdentification),
            0x97 => Some(Self::RemoteAtResponse),
            _ => None,
        }
    }

    /// Returns true if this kind travels radio-to-host.
    #[must_use]
    pub const fn is_response(self) -> bool {
        (self as u8) >= 0x80
    }

    /// Returns true if this kind travels host-to-radio.
    #[must_use]
    pub const fn is_request(self) -> bool {
        !self.is_response()
    }
}

impl From<ApiId> for u8 {
    fn from(id: ApiId) -> Self {
        id as Self
    }
}
