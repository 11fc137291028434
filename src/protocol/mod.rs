//! Protocol definitions for XBee API-mode communication.
//!
//! This module contains the low-level protocol types:
//! - Packet framing, escaping and the streaming decoder
//! - Frame-data checksum
//! - API-ID definitions
//! - Correlation frame-id allocation
//! - Protocol status codes

pub mod api_id;
pub mod checksum;
pub mod frame;
pub mod frame_id;
pub mod status;

pub use api_id::ApiId;
pub use frame::{
    ESCAPE_BYTE, FrameDecoder, MAX_FRAME_DATA, START_BYTE, decode as decode_packet,
    encode as encode_packet, unescape,
};
pub use frame_id::{FrameIdGenerator, NO_REPLY_FRAME_ID};
pub use status::{AtStatus, DeliveryStatus, ModemStatus};
