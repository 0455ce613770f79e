use serde::{Deserialize, Serialize};

/// Direction of an audio stream relative to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamDirection {
    Playback,
    Capture,
}

/// On-the-wire sample encoding of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Signed 16-bit little-endian integer samples.
    I16,
    /// 32-bit little-endian float samples.
    F32,
}

impl SampleFormat {
    /// Width of one sample in bytes.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::I16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Audio format negotiated with the backend for one stream direction.
///
/// The controller requests a format; the backend may grant a different
/// sample rate. The *obtained* format is what the codec must be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample encoding.
    pub sample_format: SampleFormat,
    /// Channel count (the transport always runs mono).
    pub channels: u16,
    /// Buffer granularity in frames: playback queue chunk for output,
    /// decode frame for input.
    pub frames_per_buffer: usize,
}

impl DeviceFormat {
    /// Size in bytes of one buffer of `frames_per_buffer` samples.
    pub fn buffer_bytes(&self) -> usize {
        self.frames_per_buffer * self.channels as usize * self.sample_format.bytes_per_sample()
    }
}

/// Device selection for opening a stream.
///
/// The original interface used `-1` for "system default"; this is the typed
/// equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceSelector {
    /// Use the backend's default device for the direction.
    Default,
    /// Use the device at this enumeration index.
    Index(usize),
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self::Default
    }
}

/// An audio device reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Enumeration index, stable for the lifetime of the listing.
    pub index: usize,
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the backend's default device for the direction.
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_widths() {
        assert_eq!(SampleFormat::I16.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::F32.bytes_per_sample(), 4);
    }

    #[test]
    fn buffer_bytes_accounts_for_width_and_channels() {
        let fmt = DeviceFormat {
            sample_rate: 48_000,
            sample_format: SampleFormat::F32,
            channels: 1,
            frames_per_buffer: 1024,
        };
        assert_eq!(fmt.buffer_bytes(), 4096);

        let stereo = DeviceFormat {
            channels: 2,
            sample_format: SampleFormat::I16,
            ..fmt
        };
        assert_eq!(stereo.buffer_bytes(), 4096);
    }

    #[test]
    fn descriptor_serde_round_trip() {
        let dev = DeviceDescriptor {
            index: 3,
            name: "USB Microphone".into(),
            is_default: true,
        };
        let json = serde_json::to_string(&dev).unwrap();
        let back: DeviceDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dev);
    }
}
