use std::collections::VecDeque;

/// FIFO of raw sample bytes shared between a stream handle and its audio
/// callback. Wrap in `Arc<parking_lot::Mutex<ByteFifo>>` for cross-thread
/// access.
///
/// Unlike a bounded ring buffer there is no drop-oldest overflow: playback
/// data must reach the device intact, and stale capture data is bounded by
/// the controller's high-water discard instead.
#[derive(Debug, Default)]
pub struct ByteFifo {
    buf: VecDeque<u8>,
}

impl ByteFifo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes at the tail.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes);
    }

    /// Remove and return exactly `n` bytes, or `None` (removing nothing)
    /// if fewer are buffered.
    pub fn pop_exact(&mut self, n: usize) -> Option<Vec<u8>> {
        if self.buf.len() < n {
            return None;
        }
        Some(self.buf.drain(..n).collect())
    }

    /// Remove and return up to `n` bytes; may be short or empty.
    pub fn pop_up_to(&mut self, n: usize) -> Vec<u8> {
        let take = n.min(self.buf.len());
        self.buf.drain(..take).collect()
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drop everything buffered.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
