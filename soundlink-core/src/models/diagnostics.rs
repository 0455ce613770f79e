use serde::Serialize;

/// Counters accumulated over the lifetime of a transport session.
///
/// Reset by `init`. The `mailbox_overwrites` counter records decoded
/// messages lost to the single-slot mailbox before they were read: the
/// transport keeps the newest message and drops the unread one silently,
/// so this is the only trace of the loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransportDiagnostics {
    /// Processing ticks executed.
    pub ticks: u64,
    /// Waveforms enqueued for playback.
    pub waveforms_sent: u64,
    /// Total waveform bytes handed to the output stream.
    pub bytes_enqueued: u64,
    /// Capture frames fed to the decoder.
    pub frames_decoded: u64,
    /// Frames that yielded a payload.
    pub messages_decoded: u64,
    /// Unread messages replaced by a newer decode.
    pub mailbox_overwrites: u64,
    /// Whole-buffer input discards triggered by the high-water mark.
    pub input_discards: u64,
}
