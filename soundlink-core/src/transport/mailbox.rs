/// Single-slot store for the most recently decoded, not-yet-read message.
///
/// Holds at most one payload. A new decode replaces an unread one; the
/// replaced payload is returned so the caller can account for the loss.
/// There is deliberately no queue; see the transport's diagnostics for the
/// overwrite counter.
#[derive(Debug, Default)]
pub struct Mailbox {
    slot: Option<Vec<u8>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload`, returning any unread payload it displaced.
    pub fn replace(&mut self, payload: Vec<u8>) -> Option<Vec<u8>> {
        self.slot.replace(payload)
    }

    /// Remove and return the pending payload, if any.
    pub fn take(&mut self) -> Option<Vec<u8>> {
        self.slot.take()
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }
}
