//! Packet framing and escaping for the XBee API protocol (API mode 2).
//!
//! The wire format:
//! ```text
//! ┌──────────┬───────────────┬──────────────┬───────────┐
//! │  0x7E    │  length (BE)  │  frame-data  │  checksum │
//! │  1 byte  │   2 bytes     │  len bytes   │  1 byte   │
//! └──────────┴───────────────┴──────────────┴───────────┘
//! ```
//! Length and checksum are computed over the *unescaped* frame-data. After
//! assembly, every reserved byte at index >= 1 is escaped as
//! `{0x7D, byte ^ 0x20}`; the start byte itself is never escaped.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::protocol::checksum;

/// Packet start byte.
pub const START_BYTE: u8 = 0x7E;

/// Escape marker byte.
pub const ESCAPE_BYTE: u8 = 0x7D;

/// XOR mask applied to escaped bytes.
pub const ESCAPE_MASK: u8 = 0x20;

/// Software flow control XON.
pub const XON: u8 = 0x11;

/// Software flow control XOFF.
pub const XOFF: u8 = 0x13;

/// Maximum frame-data length (16-bit length field).
pub const MAX_FRAME_DATA: usize = 65535;

/// Shortest possible packet: start byte, two length bytes, checksum.
pub const MIN_PACKET_SIZE: usize = 4;

const fn needs_escape(byte: u8) -> bool {
    matches!(byte, START_BYTE | ESCAPE_BYTE | XON | XOFF)
}

/// Encodes frame-data into a complete escaped wire packet.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the frame-data exceeds the 16-bit
/// length field.
pub fn encode(frame_data: &[u8]) -> Result<Bytes, FrameError> {
    if frame_data.len() > MAX_FRAME_DATA {
        return Err(FrameError::TooLarge {
            size: frame_data.len(),
            max: MAX_FRAME_DATA,
        });
    }

    let length = frame_data.len() as u16;
    let check = checksum::compute(frame_data);

    let mut buf = BytesMut::with_capacity(MIN_PACKET_SIZE + frame_data.len());
    buf.put_u8(START_BYTE);
    put_escaped(&mut buf, (length >> 8) as u8);
    put_escaped(&mut buf, (length & 0xFF) as u8);
    for &b in frame_data {
        put_escaped(&mut buf, b);
    }
    put_escaped(&mut buf, check);
    Ok(buf.freeze())
}

fn put_escaped(buf: &mut BytesMut, byte: u8) {
    if needs_escape(byte) {
        buf.put_u8(ESCAPE_BYTE);
        buf.put_u8(byte ^ ESCAPE_MASK);
    } else {
        buf.put_u8(byte);
    }
}

/// Removes escape sequences from a byte range.
///
/// Every `0x7D` is dropped and the following byte XORed with `0x20`.
#[must_use]
pub fn unescape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut escaped = false;
    for &b in data {
        if escaped {
            out.push(b ^ ESCAPE_MASK);
            escaped = false;
        } else if b == ESCAPE_BYTE {
            escaped = true;
        } else {
            out.push(b);
        }
    }
    out
}

/// Decodes and verifies a complete wire packet, returning its frame-data.
///
/// # Errors
///
/// Returns a [`FrameError`] if the packet does not start with [`START_BYTE`],
/// is shorter than [`MIN_PACKET_SIZE`], declares a length that disagrees with
/// the bytes present, or fails checksum verification.
pub fn decode(packet: &[u8]) -> Result<Bytes, FrameError> {
    if packet.len() < MIN_PACKET_SIZE {
        return Err(FrameError::TooShort(packet.len()));
    }
    if packet[0] != START_BYTE {
        return Err(FrameError::BadStartByte(packet[0]));
    }

    let unescaped = unescape(&packet[1..]);
    if unescaped.len() < 3 {
        return Err(FrameError::TooShort(packet.len()));
    }

    let declared = usize::from(u16::from_be_bytes([unescaped[0], unescaped[1]]));
    let body = &unescaped[2..];
    if body.len() != declared + 1 {
        return Err(FrameError::LengthMismatch {
            declared,
            got: body.len().saturating_sub(1),
        });
    }

    let frame_data = &body[..declared];
    let got = body[declared];
    let computed = checksum::compute(frame_data);
    if computed != got {
        return Err(FrameError::ChecksumMismatch { computed, got });
    }

    Ok(Bytes::copy_from_slice(frame_data))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for a start byte.
    #[default]
    Idle,
    /// Waiting for the high length byte.
    LengthMsb,
    /// Waiting for the low length byte.
    LengthLsb,
    /// Accumulating frame-data bytes.
    FrameData,
    /// Waiting for the checksum byte.
    Checksum,
}

/// Streaming packet decoder.
///
/// Bytes are pushed in as they arrive from the transport; escape sequences
/// are resolved inline and each completed packet is checksum-verified before
/// its frame-data is handed out. Corrupt packets are dropped silently - a raw
/// start byte restarts accumulation, so the decoder resynchronizes on the
/// next packet boundary after garbled input.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: DecodeState,
    escaped: bool,
    length: usize,
    buf: BytesMut,
    dropped: u64,
}

impl FrameDecoder {
    /// Creates a new decoder in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packets discarded due to corruption since creation.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Resets the decoder to the idle state, discarding partial input.
    pub fn clear(&mut self) {
        self.state = DecodeState::Idle;
        self.escaped = false;
        self.buf.clear();
    }

    /// Pushes a single byte, returning verified frame-data when a packet
    /// completes.
    pub fn push(&mut self, byte: u8) -> Option<Bytes> {
        // An unescaped start byte cannot occur inside a well-formed packet,
        // so treat it as the beginning of a new one wherever it appears.
        if byte == START_BYTE && !self.escaped {
            if self.state != DecodeState::Idle {
                tracing::warn!("start byte inside packet, resynchronizing");
                self.dropped += 1;
            }
            self.state = DecodeState::LengthMsb;
            self.escaped = false;
            self.buf.clear();
            return None;
        }

        if self.state == DecodeState::Idle {
            // Noise between packets.
            return None;
        }

        if byte == ESCAPE_BYTE && !self.escaped {
            self.escaped = true;
            return None;
        }
        let byte = if self.escaped {
            self.escaped = false;
            byte ^ ESCAPE_MASK
        } else {
            byte
        };

        match self.state {
            DecodeState::Idle => None,
            DecodeState::LengthMsb => {
                self.length = usize::from(byte) << 8;
                self.state = DecodeState::LengthLsb;
                None
            }
            DecodeState::LengthLsb => {
                self.length |= usize::from(byte);
                self.state = if self.length == 0 {
                    DecodeState::Checksum
                } else {
                    DecodeState::FrameData
                };
                None
            }
            DecodeState::FrameData => {
                self.buf.put_u8(byte);
                if self.buf.len() == self.length {
                    self.state = DecodeState::Checksum;
                }
                None
            }
            DecodeState::Checksum => {
                self.state = DecodeState::Idle;
                let computed = checksum::compute(&self.buf);
                if computed == byte {
                    Some(self.buf.split().freeze())
                } else {
                    tracing::warn!(
                        computed = format_args!("0x{computed:02x}"),
                        got = format_args!("0x{byte:02x}"),
                        "dropping packet with bad checksum"
                    );
                    self.dropped += 1;
                    self.buf.clear();
                    None
                }
            }
        }
    }

    /// Feeds a chunk of bytes, invoking `on_frame` for each completed packet.
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(Bytes)) {
        for &b in data {
            if let Some(frame) = self.push(b) {
                on_frame(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(decoder: &mut FrameDecoder, data: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();
        decoder.feed(data, |f| frames.push(f));
        frames
    }

    #[test]
    fn test_encode_simple() {
        // AT command "NJ" = 0xFF from the Digi documentation.
        let frame_data = [0x08, 0x01, 0x4E, 0x4A, 0xFF];
        let packet = encode(&frame_data).unwrap();
        assert_eq!(packet[0], START_BYTE);
        assert_eq!(packet[1], 0x00);
        assert_eq!(packet[2], 0x05);
        assert_eq!(&packet[3..8], &frame_data);
        assert_eq!(packet[8], 0x5F);
    }

    #[test]
    fn test_encode_escapes_reserved_bytes() {
        let packet = encode(&[0x23, 0x11]).unwrap();
        // 0x11 (XON) must appear as 0x7D 0x31.
        assert_eq!(&packet[..], &[0x7E, 0x00, 0x02, 0x23, 0x7D, 0x31, 0xCB]);
    }

    #[test]
    fn test_encode_never_escapes_start_byte_at_index_zero() {
        let packet = encode(&[0x7E, 0x7D, 0x11, 0x13]).unwrap();
        assert_eq!(packet[0], START_BYTE);
        // No further raw start byte anywhere after index 0.
        assert!(!packet[1..].contains(&START_BYTE));
    }

    #[test]
    fn test_decode_round_trip() {
        let frame_data = [0x90, 0x7E, 0x7D, 0x11, 0x13, 0x00, 0xFF, b'H', b'i'];
        let packet = encode(&frame_data).unwrap();
        assert_eq!(&decode(&packet).unwrap()[..], &frame_data);
    }

    #[test]
    fn test_decode_rejects_bad_start() {
        let mut packet = encode(&[0x8A, 0x06]).unwrap().to_vec();
        packet[0] = 0x42;
        assert!(matches!(
            decode(&packet),
            Err(FrameError::BadStartByte(0x42))
        ));
    }

    #[test]
    fn test_decode_rejects_short_packet() {
        assert!(matches!(
            decode(&[0x7E, 0x00]),
            Err(FrameError::TooShort(2))
        ));
    }

    #[test]
    fn test_decode_rejects_corrupt_checksum() {
        let mut packet = encode(&[0x8A, 0x06]).unwrap().to_vec();
        let last = packet.len() - 1;
        packet[last] ^= 0x01;
        assert!(matches!(
            decode(&packet),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_unescape_inverse_of_escaping() {
        let frame_data: Vec<u8> = (0u8..=255).collect();
        let packet = encode(&frame_data).unwrap();
        let unescaped = unescape(&packet[1..]);
        assert_eq!(&unescaped[2..2 + frame_data.len()], &frame_data[..]);
    }

    #[test]
    fn test_decoder_single_packet() {
        let frame_data = [0x8A, 0x01];
        let packet = encode(&frame_data).unwrap();
        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, &packet);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &frame_data);
    }

    #[test]
    fn test_decoder_split_delivery() {
        let packet = encode(&[0x90, 0x7E, 0x13, b'x']).unwrap();
        let mut decoder = FrameDecoder::new();
        let (a, b) = packet.split_at(3);
        assert!(collect(&mut decoder, a).is_empty());
        let frames = collect(&mut decoder, b);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[0x90, 0x7E, 0x13, b'x']);
    }

    #[test]
    fn test_decoder_skips_interpacket_noise() {
        let packet = encode(&[0x8A, 0x02]).unwrap();
        let mut input = vec![0x00, 0x42, 0xFF];
        input.extend_from_slice(&packet);
        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, &input);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_decoder_resyncs_after_corrupt_packet() {
        let good = encode(&[0x8A, 0x06]).unwrap();
        let mut corrupt = good.to_vec();
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0xFF;

        let mut input = corrupt;
        input.extend_from_slice(&good);

        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, &input);
        assert_eq!(frames.len(), 1, "exactly one packet after resync");
        assert_eq!(decoder.dropped(), 1);
    }

    #[test]
    fn test_decoder_resyncs_on_truncated_packet() {
        let good = encode(&[0x8A, 0x06]).unwrap();
        // A packet that claims 10 bytes of frame-data but is cut off.
        let mut input = vec![0x7E, 0x00, 0x0A, 0x01, 0x02];
        input.extend_from_slice(&good);

        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, &input);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[0x8A, 0x06]);
        assert_eq!(decoder.dropped(), 1);
    }

    #[test]
    fn test_decoder_handles_escaped_checksum() {
        // Frame-data whose checksum lands on a reserved byte.
        // sum(frame_data) must be 0xFF - 0x7E = 0x81.
        let frame_data = [0x80, 0x01];
        assert_eq!(checksum::compute(&frame_data), 0x7E);
        let packet = encode(&frame_data).unwrap();
        let mut decoder = FrameDecoder::new();
        let frames = collect(&mut decoder, &packet);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &frame_data);
    }
}
