//! Receive frame variants.
//!
//! [`XBeeResponse`] is the tagged union of everything the radio can push at
//! the host. Decoding is a straight API-ID match; each variant parses exactly
//! the bytes between the tag and the checksum, and a variant that reads past
//! the end or leaves bytes unconsumed is reported as a protocol error rather
//! than ignored.

pub mod at;
pub mod rx;
pub mod status;

use crate::address::XBeeAddress;
use crate::error::{Error, Result};
use crate::protocol::ApiId;

pub use at::{AtResponse, RemoteAtResponse};
pub use rx::{
    AnalogSample, ExplicitRxResponse, IoSampleResponse, NodeIdentificationResponse, Rx16Response,
    Rx64Response, ZigbeeRxResponse,
};
pub use status::{ModemStatusResponse, TransmitStatusResponse, TxStatusResponse};

/// Bounds-checked cursor over a frame-data byte range.
///
/// Every read fails with a protocol error when the range is exhausted, and
/// [`FrameReader::finish`] fails when a variant leaves bytes behind, so both
/// directions of a mis-sized parse surface as errors.
pub(crate) struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn short_read(&self, wanted: usize) -> Error {
        Error::Protocol {
            message: format!(
                "frame truncated: wanted {wanted} more bytes, {} left",
                self.remaining()
            ),
        }
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.short_read(1))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn u16_be(&mut self) -> Result<u16> {
        let bytes: [u8; 2] = self.take(2)?.try_into().map_err(|_| self.short_read(2))?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub(crate) fn u64_be(&mut self) -> Result<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().map_err(|_| self.short_read(8))?;
        Ok(u64::from_be_bytes(bytes))
    }

    pub(crate) fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(self.short_read(count));
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Consumes everything left in the range.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    /// Reads a null-terminated string, consuming the terminator.
    pub(crate) fn cstring(&mut self) -> Result<String> {
        let start = self.pos;
        let nul = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Protocol {
                message: "unterminated string in frame".into(),
            })?;
        let s = String::from_utf8_lossy(&self.data[start..start + nul]).into_owned();
        self.pos = start + nul + 1;
        Ok(s)
    }

    /// Asserts the variant consumed the whole range.
    pub(crate) fn finish(self) -> Result<()> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(Error::Protocol {
                message: format!("{} trailing bytes after frame fields", self.remaining()),
            })
        }
    }
}

/// A decoded receive frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XBeeResponse {
    /// 802.15.4 receive, 64-bit source addressing.
    Rx64(Rx64Response),
    /// 802.15.4 receive, 16-bit source addressing.
    Rx16(Rx16Response),
    /// Local AT command response.
    At(AtResponse),
    /// 802.15.4 transmit status.
    TxStatus(TxStatusResponse),
    /// Unsolicited modem status.
    ModemStatus(ModemStatusResponse),
    /// ZigBee transmit status / delivery confirmation.
    TransmitStatus(TransmitStatusResponse),
    /// ZigBee receive packet.
    ZigbeeRx(ZigbeeRxResponse),
    /// ZigBee receive with explicit addressing fields.
    ExplicitRx(ExplicitRxResponse),
    /// ZigBee IO data sample.
    IoSample(IoSampleResponse),
    /// Node identification indicator.
    NodeIdentification(NodeIdentificationResponse),
    /// Remote AT command response.
    RemoteAt(RemoteAtResponse),
}

impl XBeeResponse {
    /// Decodes checksum-verified frame-data into a response variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for an unknown or request-direction API-ID
    /// and for any variant whose fields do not fill the range exactly.
    pub fn decode(frame_data: &[u8]) -> Result<Self> {
        let mut reader = FrameReader::new(frame_data);
        let tag = reader.u8()?;
        let api_id = ApiId::from_byte(tag).ok_or_else(|| Error::Protocol {
            message: format!("unknown API-ID 0x{tag:02x}"),
        })?;

        let response = match api_id {
            ApiId::Rx64Response => Self::Rx64(Rx64Response::parse(&mut reader)?),
            ApiId::Rx16Response => Self::Rx16(Rx16Response::parse(&mut reader)?),
            ApiId::AtResponse => Self::At(AtResponse::parse(&mut reader)?),
            ApiId::TxStatusResponse => Self::TxStatus(TxStatusResponse::parse(&mut reader)?),
            ApiId::ModemStatus => Self::ModemStatus(ModemStatusResponse::parse(&mut reader)?),
            ApiId::ZigbeeTransmitStatus => {
                Self::TransmitStatus(TransmitStatusResponse::parse(&mut reader)?)
            }
            ApiId::ZigbeeRxResponse => Self::ZigbeeRx(ZigbeeRxResponse::parse(&mut reader)?),
            ApiId::ExplicitRxResponse => Self::ExplicitRx(ExplicitRxResponse::parse(&mut reader)?),
            ApiId::IoSampleResponse => Self::IoSample(IoSampleResponse::parse(&mut reader)?),
            ApiId::NodeIdentification => {
                Self::NodeIdentification(NodeIdentificationResponse::parse(&mut reader)?)
            }
            ApiId::RemoteAtResponse => Self::RemoteAt(RemoteAtResponse::parse(&mut reader)?),
            other => {
                return Err(Error::Protocol {
                    message: format!("API-ID {other:?} is not a response kind"),
                });
            }
        };

        reader.finish()?;
        Ok(response)
    }

    /// The API-ID tag of this variant.
    #[must_use]
    pub const fn api_id(&self) -> ApiId {
        match self {
            Self::Rx64(_) => ApiId::Rx64Response,
            Self::Rx16(_) => ApiId::Rx16Response,
            Self::At(_) => ApiId::AtResponse,
            Self::TxStatus(_) => ApiId::TxStatusResponse,
            Self::ModemStatus(_) => ApiId::ModemStatus,
            Self::TransmitStatus(_) => ApiId::ZigbeeTransmitStatus,
            Self::ZigbeeRx(_) => ApiId::ZigbeeRxResponse,
            Self::ExplicitRx(_) => ApiId::ExplicitRxResponse,
            Self::IoSample(_) => ApiId::IoSampleResponse,
            Self::NodeIdentification(_) => ApiId::NodeIdentification,
            Self::RemoteAt(_) => ApiId::RemoteAtResponse,
        }
    }

    /// The echoed correlation frame-id, for variants that carry one.
    #[must_use]
    pub const fn frame_id(&self) -> Option<u8> {
        match self {
            Self::At(r) => Some(r.frame_id),
            Self::TxStatus(r) => Some(r.frame_id),
            Self::TransmitStatus(r) => Some(r.frame_id),
            Self::RemoteAt(r) => Some(r.frame_id),
            _ => None,
        }
    }

    /// The sender's address, for variants that carry one.
    ///
    /// For 802.15.4 receive frames only one half of the address is on the
    /// wire; the other half is the unknown sentinel / zero.
    #[must_use]
    pub fn source(&self) -> Option<XBeeAddress> {
        match self {
            Self::Rx64(r) => Some(XBeeAddress::from_serial(r.source)),
            Self::ZigbeeRx(r) => Some(r.source),
            Self::ExplicitRx(r) => Some(r.source),
            Self::IoSample(r) => Some(r.source),
            Self::NodeIdentification(r) => Some(r.sender),
            Self::RemoteAt(r) => Some(r.source),
            _ => None,
        }
    }

    /// The application payload, for data-bearing variants.
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Rx64(r) => Some(&r.payload),
            Self::Rx16(r) => Some(&r.payload),
            Self::ZigbeeRx(r) => Some(&r.payload),
            Self::ExplicitRx(r) => Some(&r.payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_unknown_tag() {
        let err = XBeeResponse::decode(&[0x42, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_decode_rejects_request_tag() {
        let err = XBeeResponse::decode(&[0x08, 0x01, b'N', b'I']).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_decode_rejects_empty_frame() {
        assert!(XBeeResponse::decode(&[]).is_err());
    }

    #[test]
    fn test_decode_detects_trailing_bytes() {
        // Modem status is exactly one byte; a second byte is a protocol bug.
        let err = XBeeResponse::decode(&[0x8A, 0x01, 0xAA]).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_decode_detects_truncated_variant() {
        // Tx status needs frame-id and status.
        let err = XBeeResponse::decode(&[0x89, 0x01]).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_frame_reader_rest_and_finish() {
        let mut reader = FrameReader::new(&[1, 2, 3]);
        assert_eq!(reader.u8().unwrap(), 1);
        assert_eq!(reader.rest(), &[2, 3]);
        assert!(reader.finish().is_ok());
    }
}
