//! cpal capture stream: the device callback fills a byte FIFO.
//!
//! Captured f32 samples are downmixed to mono and appended as f32-LE bytes;
//! the transport drains them in whole decode frames and applies its own
//! backpressure, so the FIFO itself is unbounded.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::Mutex;

use soundlink_core::models::error::TransportError;
use soundlink_core::processing::{byte_fifo::ByteFifo, pcm};
use soundlink_core::traits::audio_backend::InputStream;

pub struct CpalInputStream {
    fifo: Arc<Mutex<ByteFifo>>,
    stream: Option<cpal::Stream>,
}

// SAFETY: cpal::Stream is !Send. The stream handle lives inside the
// transport's single lock from open to close and is never touched from two
// threads at once; the audio callback only shares the Mutex-guarded FIFO.
unsafe impl Send for CpalInputStream {}

impl CpalInputStream {
    /// Build and start a capture stream on `device`.
    pub fn open(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
    ) -> Result<Self, TransportError> {
        let fifo = Arc::new(Mutex::new(ByteFifo::new()));
        let channels = config.channels as usize;

        let callback_fifo = Arc::clone(&fifo);
        let stream = device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if channels == 1 {
                        callback_fifo.lock().push(&pcm::f32_to_bytes(data));
                    } else {
                        let mono = downmix_to_mono(data, channels);
                        callback_fifo.lock().push(&pcm::f32_to_bytes(&mono));
                    }
                },
                move |err| {
                    log::error!("capture stream error: {err}");
                },
                None,
            )
            .map_err(|e| TransportError::DeviceOpenFailed(format!("build capture stream: {e}")))?;

        stream
            .play()
            .map_err(|e| TransportError::DeviceOpenFailed(format!("start capture stream: {e}")))?;

        Ok(Self {
            fifo,
            stream: Some(stream),
        })
    }
}

impl InputStream for CpalInputStream {
    fn available_bytes(&self) -> usize {
        self.fifo.lock().len()
    }

    fn dequeue(&self, n: usize) -> Result<Vec<u8>, TransportError> {
        self.fifo.lock().pop_exact(n).ok_or_else(|| {
            TransportError::DeviceOpenFailed(format!("capture buffer holds fewer than {n} bytes"))
        })
    }

    fn discard_all(&self) {
        self.fifo.lock().clear();
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            drop(stream);
            self.fifo.lock().clear();
        }
    }
}

impl Drop for CpalInputStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Average interleaved multi-channel samples down to mono.
fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
