use super::format::{DeviceFormat, DeviceSelector, SampleFormat};
use super::protocol::ProtocolId;

/// Nominal operating rate of the acoustic codec in Hz.
pub const CODEC_SAMPLE_RATE: u32 = 48_000;

/// Samples per capture frame, the minimum unit the codec can decode.
pub const SAMPLES_PER_FRAME: usize = 1024;

/// Playback queue granularity in samples. Large enough that a whole
/// waveform enqueues without the callback starving, compact i16 samples
/// keep the queue small.
pub const OUTPUT_BUFFER_SAMPLES: usize = 16 * 1024;

/// Capture backlog threshold, in frames, beyond which buffered input is
/// discarded wholesale instead of decoded.
pub const DEFAULT_HIGH_WATER_FRAMES: usize = 32;

/// Configuration for bringing up a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Playback device to open.
    pub playback_device: DeviceSelector,
    /// Capture device to open.
    pub capture_device: DeviceSelector,
    /// Protocol used for transmissions until changed.
    pub protocol: ProtocolId,
    /// Requested sample rate for both directions (backend may grant another).
    pub sample_rate: u32,
    /// Capture frame size in samples.
    pub samples_per_frame: usize,
    /// Backlog discard threshold in frames.
    pub high_water_frames: usize,
}

impl TransportConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.samples_per_frame == 0 {
            return Err("frame size must be positive".into());
        }
        if self.high_water_frames == 0 {
            return Err("high-water mark must be at least one frame".into());
        }
        Ok(())
    }

    /// Format requested for the playback stream: compact integer samples,
    /// large queue granularity for low-overhead asynchronous draining.
    pub fn playback_format(&self) -> DeviceFormat {
        DeviceFormat {
            sample_rate: self.sample_rate,
            sample_format: SampleFormat::I16,
            channels: 1,
            frames_per_buffer: OUTPUT_BUFFER_SAMPLES,
        }
    }

    /// Format requested for the capture stream: float samples for decode
    /// precision, one codec frame per buffer.
    pub fn capture_format(&self) -> DeviceFormat {
        DeviceFormat {
            sample_rate: self.sample_rate,
            sample_format: SampleFormat::F32,
            channels: 1,
            frames_per_buffer: self.samples_per_frame,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            playback_device: DeviceSelector::Default,
            capture_device: DeviceSelector::Default,
            protocol: ProtocolId::default(),
            sample_rate: CODEC_SAMPLE_RATE,
            samples_per_frame: SAMPLES_PER_FRAME,
            high_water_frames: DEFAULT_HIGH_WATER_FRAMES,
        }
    }
}
