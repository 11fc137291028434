//! Transmit frame variants.
//!
//! [`XBeeRequest`] is the tagged union of everything the host can send to
//! the radio. A request owns its serialization: `frame_data()` produces the
//! API-ID-through-payload byte range that the framing codec wraps, escapes
//! and checksums.

pub mod at;
pub mod tx;

use bytes::Bytes;

use crate::protocol::ApiId;

pub use at::{AtCommandName, AtCommandRequest, RemoteAtCommandRequest};
pub use tx::{ExplicitTxRequest, TransmitRequest, Tx16Request, Tx64Request, tx_options};

/// A transmit frame, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XBeeRequest {
    /// 802.15.4 transmit, 64-bit destination.
    Tx64(Tx64Request),
    /// 802.15.4 transmit, 16-bit destination.
    Tx16(Tx16Request),
    /// Local AT command (immediate or queued).
    At(AtCommandRequest),
    /// ZigBee transmit.
    Transmit(TransmitRequest),
    /// ZigBee transmit with explicit addressing.
    ExplicitTx(ExplicitTxRequest),
    /// Remote AT command.
    RemoteAt(RemoteAtCommandRequest),
}

impl XBeeRequest {
    /// The API-ID tag this request serializes under.
    #[must_use]
    pub const fn api_id(&self) -> ApiId {
        match self {
            Self::Tx64(_) => ApiId::Tx64Request,
            Self::Tx16(_) => ApiId::Tx16Request,
            Self::At(r) => r.api_id(),
            Self::Transmit(_) => ApiId::ZigbeeTransmitRequest,
            Self::ExplicitTx(_) => ApiId::ExplicitTxRequest,
            Self::RemoteAt(_) => ApiId::RemoteAtCommand,
        }
    }

    /// The currently assigned correlation frame-id.
    #[must_use]
    pub const fn frame_id(&self) -> u8 {
        match self {
            Self::Tx64(r) => r.frame_id,
            Self::Tx16(r) => r.frame_id,
            Self::At(r) => r.frame_id,
            Self::Transmit(r) => r.frame_id,
            Self::ExplicitTx(r) => r.frame_id,
            Self::RemoteAt(r) => r.frame_id,
        }
    }

    /// Assigns the correlation frame-id.
    pub const fn set_frame_id(&mut self, frame_id: u8) {
        match self {
            Self::Tx64(r) => r.frame_id = frame_id,
            Self::Tx16(r) => r.frame_id = frame_id,
            Self::At(r) => r.frame_id = frame_id,
            Self::Transmit(r) => r.frame_id = frame_id,
            Self::ExplicitTx(r) => r.frame_id = frame_id,
            Self::RemoteAt(r) => r.frame_id = frame_id,
        }
    }

    /// Serializes the frame-data byte range (API-ID through payload).
    #[must_use]
    pub fn frame_data(&self) -> Bytes {
        match self {
            Self::Tx64(r) => r.frame_data(),
            Self::Tx16(r) => r.frame_data(),
            Self::At(r) => r.frame_data(),
            Self::Transmit(r) => r.frame_data(),
            Self::ExplicitTx(r) => r.frame_data(),
            Self::RemoteAt(r) => r.frame_data(),
        }
    }

    /// The response API-IDs that can echo this request's frame-id.
    #[must_use]
    pub const fn response_api_ids(&self) -> &'static [ApiId] {
        match self {
            Self::Tx64(_) | Self::Tx16(_) => &[ApiId::TxStatusResponse],
            Self::At(_) => &[ApiId::AtResponse],
            Self::Transmit(_) | Self::ExplicitTx(_) => &[ApiId::ZigbeeTransmitStatus],
            Self::RemoteAt(_) => &[ApiId::RemoteAtResponse],
        }
    }
}

impl From<Tx64Request> for XBeeRequest {
    fn from(r: Tx64Request) -> Self {
        Self::Tx64(r)
    }
}

impl From<Tx16Request> for XBeeRequest {
    fn from(r: Tx16Request) -> Self {
        Self::Tx16(r)
    }
}

impl From<AtCommandRequest> for XBeeRequest {
    fn from(r: AtCommandRequest) -> Self {
        Self::At(r)
    }
}

impl From<TransmitRequest> for XBeeRequest {
    fn from(r: TransmitRequest) -> Self {
        Self::Transmit(r)
    }
}

impl From<ExplicitTxRequest> for XBeeRequest {
    fn from(r: ExplicitTxRequest) -> Self {
        Self::ExplicitTx(r)
    }
}

impl From<RemoteAtCommandRequest> for XBeeRequest {
    fn from(r: RemoteAtCommandRequest) -> Self {
        Self::RemoteAt(r)
    }
}
