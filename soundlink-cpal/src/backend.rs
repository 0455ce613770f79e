//! Device enumeration and stream opening on top of cpal.

use cpal::traits::{DeviceTrait, HostTrait};

use soundlink_core::models::error::TransportError;
use soundlink_core::models::format::{
    DeviceDescriptor, DeviceFormat, DeviceSelector, SampleFormat, StreamDirection,
};
use soundlink_core::traits::audio_backend::AudioBackend;

use crate::input::CpalInputStream;
use crate::output::CpalOutputStream;

/// Audio backend over the host's default cpal audio subsystem.
///
/// Sample-rate negotiation: the requested rate is clamped into the device's
/// supported range for the requested sample format, and the clamped rate is
/// reported back as the obtained format. Channel layout is whatever the
/// device offers (fewest channels preferred); the stream callbacks adapt it
/// to the transport's mono byte queues, so the FIFO side is always mono.
pub struct CpalBackend {
    host: cpal::Host,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    fn devices(&self, direction: StreamDirection) -> Result<Vec<cpal::Device>, TransportError> {
        let unavailable =
            |e: cpal::DevicesError| TransportError::BackendUnavailable(e.to_string());
        let devices = match direction {
            StreamDirection::Playback => self.host.output_devices().map_err(unavailable)?.collect(),
            StreamDirection::Capture => self.host.input_devices().map_err(unavailable)?.collect(),
        };
        Ok(devices)
    }

    fn default_device(&self, direction: StreamDirection) -> Option<cpal::Device> {
        match direction {
            StreamDirection::Playback => self.host.default_output_device(),
            StreamDirection::Capture => self.host.default_input_device(),
        }
    }

    fn select_device(
        &self,
        direction: StreamDirection,
        selector: DeviceSelector,
    ) -> Result<cpal::Device, TransportError> {
        match selector {
            DeviceSelector::Default => self.default_device(direction).ok_or_else(|| {
                TransportError::DeviceOpenFailed(format!("no default {direction:?} device"))
            }),
            DeviceSelector::Index(index) => {
                self.devices(direction)?.into_iter().nth(index).ok_or_else(|| {
                    TransportError::DeviceOpenFailed(format!(
                        "no {direction:?} device at index {index}"
                    ))
                })
            }
        }
    }

    /// Pick a stream config for `device`: requested sample format, fewest
    /// channels on offer, rate clamped into the supported range.
    fn negotiate(
        &self,
        device: &cpal::Device,
        direction: StreamDirection,
        requested: &DeviceFormat,
    ) -> Result<(cpal::StreamConfig, DeviceFormat), TransportError> {
        let want = match requested.sample_format {
            SampleFormat::I16 => cpal::SampleFormat::I16,
            SampleFormat::F32 => cpal::SampleFormat::F32,
        };

        let open_failed = |e: cpal::SupportedStreamConfigsError| {
            TransportError::DeviceOpenFailed(format!("query supported configs: {e}"))
        };
        let ranges: Vec<cpal::SupportedStreamConfigRange> = match direction {
            StreamDirection::Playback => device
                .supported_output_configs()
                .map_err(open_failed)?
                .collect(),
            StreamDirection::Capture => device
                .supported_input_configs()
                .map_err(open_failed)?
                .collect(),
        };

        let range = ranges
            .into_iter()
            .filter(|r| r.sample_format() == want)
            .min_by_key(|r| r.channels())
            .ok_or_else(|| {
                TransportError::DeviceOpenFailed(format!(
                    "device offers no {:?} configuration",
                    requested.sample_format
                ))
            })?;

        let rate = requested
            .sample_rate
            .clamp(range.min_sample_rate().0, range.max_sample_rate().0);
        if rate != requested.sample_rate {
            log::info!(
                "{direction:?} device granted {rate} Hz instead of requested {} Hz",
                requested.sample_rate,
            );
        }

        let config = cpal::StreamConfig {
            channels: range.channels(),
            sample_rate: cpal::SampleRate(rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let obtained = DeviceFormat {
            sample_rate: rate,
            sample_format: requested.sample_format,
            channels: range.channels(),
            frames_per_buffer: requested.frames_per_buffer,
        };
        Ok((config, obtained))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    type Output = CpalOutputStream;
    type Input = CpalInputStream;

    fn enumerate(
        &self,
        direction: StreamDirection,
    ) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let default_name = self
            .default_device(direction)
            .and_then(|d| d.name().ok());

        let mut descriptors = Vec::new();
        for (index, device) in self.devices(direction)?.into_iter().enumerate() {
            let name = device
                .name()
                .unwrap_or_else(|_| format!("Device {index}"));
            let is_default = default_name.as_deref() == Some(name.as_str());
            descriptors.push(DeviceDescriptor {
                index,
                name,
                is_default,
            });
        }
        Ok(descriptors)
    }

    fn open_output(
        &self,
        selector: DeviceSelector,
        requested: &DeviceFormat,
    ) -> Result<(Self::Output, DeviceFormat), TransportError> {
        let device = self.select_device(StreamDirection::Playback, selector)?;
        let (config, obtained) = self.negotiate(&device, StreamDirection::Playback, requested)?;

        let stream = CpalOutputStream::open(&device, &config)?;
        log::info!(
            "playback open: \"{}\", {} Hz, {} ch",
            device.name().unwrap_or_else(|_| "unknown".into()),
            obtained.sample_rate,
            obtained.channels,
        );
        Ok((stream, obtained))
    }

    fn open_input(
        &self,
        selector: DeviceSelector,
        requested: &DeviceFormat,
    ) -> Result<(Self::Input, DeviceFormat), TransportError> {
        let device = self.select_device(StreamDirection::Capture, selector)?;
        let (config, obtained) = self.negotiate(&device, StreamDirection::Capture, requested)?;

        let stream = CpalInputStream::open(&device, &config)?;
        log::info!(
            "capture open: \"{}\", {} Hz, {} ch",
            device.name().unwrap_or_else(|_| "unknown".into()),
            obtained.sample_rate,
            obtained.channels,
        );
        Ok((stream, obtained))
    }
}
