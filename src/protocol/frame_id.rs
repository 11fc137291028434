//! Correlation frame-id allocation.

use std::sync::atomic::{AtomicU32, Ordering};

/// Frame-id that suppresses the device's response frame.
pub const NO_REPLY_FRAME_ID: u8 = 0x00;

/// Cycling allocator for correlation frame-ids.
///
/// Ids cycle through `1..=255`; `0` is reserved to mean "no response
/// requested" and is never handed out. Allocation is atomic, so concurrently
/// sending tasks cannot collide on a correlation id within one cycle.
#[derive(Debug)]
pub struct FrameIdGenerator {
    counter: AtomicU32,
}

impl FrameIdGenerator {
    /// Creates a generator starting at frame-id 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Allocates the next frame-id.
    pub fn next_id(&self) -> u8 {
        let raw = self.counter.fetch_add(1, Ordering::SeqCst);
        (raw % 255) as u8 + 1
    }
}

impl Default for FrameIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
