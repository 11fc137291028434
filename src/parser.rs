//! Push-based packet parser.
//!
//! [`PacketParser`] is the bridge between the transport's byte stream and
//! the listener table: bytes go in from whatever thread the transport reads
//! on, verified frames come out of the streaming decoder, get decoded into
//! response variants and are dispatched synchronously to every matching
//! listener. Corrupt packets never reach a listener - the decoder drops them
//! and resynchronizes on the next start byte.

use std::sync::{Arc, Mutex, PoisonError};

use crate::dispatch::ListenerTable;
use crate::protocol::FrameDecoder;
use crate::response::XBeeResponse;

/// Stateful byte-stream decoder with listener dispatch.
pub struct PacketParser {
    decoder: Mutex<FrameDecoder>,
    listeners: Arc<ListenerTable>,
}

impl PacketParser {
    /// Creates a parser with an empty listener table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: Mutex::new(FrameDecoder::new()),
            listeners: Arc::new(ListenerTable::new()),
        }
    }

    /// The listener table responses are dispatched to.
    #[must_use]
    pub fn listeners(&self) -> &Arc<ListenerTable> {
        &self.listeners
    }

    /// Ingests a chunk of raw transport bytes.
    ///
    /// Safe to call from any thread; decoding state is serialized behind a
    /// lock while dispatch itself runs on the calling thread. A slow inline
    /// handler therefore stalls further decoding - handlers must buffer and
    /// return.
    pub fn ingest(&self, data: &[u8]) {
        tracing::trace!(bytes = data.len(), "ingesting");

        let mut frames = Vec::new();
        {
            let mut decoder = self.decoder.lock().unwrap_or_else(PoisonError::into_inner);
            decoder.feed(data, |frame| frames.push(frame));
        }

        for frame in frames {
            match XBeeResponse::decode(&frame) {
                Ok(response) => {
                    tracing::trace!(api_id = ?response.api_id(), "dispatching response");
                    self.listeners.dispatch(&Arc::new(response));
                }
                Err(e) => {
                    tracing::warn!("undecodable frame: {e}");
                }
            }
        }
    }

    /// Resets decoder state, discarding any partial packet. Used on close.
    pub fn reset(&self) {
        self.decoder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of corrupt packets dropped since creation.
    #[must_use]
    pub fn dropped_packets(&self) -> u64 {
        self.decoder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dropped()
    }
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}
