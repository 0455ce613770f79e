use crate::models::format::SampleFormat;
use crate::models::protocol::ProtocolId;

/// Operating point the codec is bound to for one session.
///
/// Input and output sides carry the *obtained* device formats, which may
/// differ from the nominal rate when the backend granted something else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecParams {
    /// Nominal internal rate of the modulation scheme in Hz.
    pub sample_rate: f32,
    /// Obtained capture rate in Hz.
    pub sample_rate_inp: f32,
    /// Obtained playback rate in Hz.
    pub sample_rate_out: f32,
    /// Capture sample encoding.
    pub format_inp: SampleFormat,
    /// Playback sample encoding.
    pub format_out: SampleFormat,
    /// Samples per decode frame.
    pub samples_per_frame: usize,
}

/// The acoustic modulation codec, treated as a black box.
///
/// Implementations wrap a data-over-sound engine (FSK tones, error
/// correction, framing). The transport only relies on the contract below;
/// boundary errors are plain strings that the codec adapter maps onto
/// transport errors.
pub trait AcousticCodec: Send {
    /// Bind the codec to a session's negotiated formats. Called once per
    /// `init`; a failure aborts initialization.
    fn configure(&mut self, params: &CodecParams) -> Result<(), String>;

    /// Encode a payload into a ready-to-play waveform of output-format
    /// bytes. Fails if the codec rejects the protocol/volume combination.
    fn encode(
        &mut self,
        payload: &[u8],
        protocol: ProtocolId,
        volume: u8,
    ) -> Result<Vec<u8>, String>;

    /// Feed one frame of input-format bytes to the demodulator.
    ///
    /// Returns `None` until a full symbol sequence has been observed —
    /// the normal result for the vast majority of frames, not a failure.
    fn decode(&mut self, frame: &[u8]) -> Option<Vec<u8>>;
}
