//! cpal playback stream: a byte FIFO drained by the device callback.
//!
//! The transport enqueues mono i16-LE waveform bytes; the callback pulls one
//! sample per device frame and duplicates it across the device's channels.
//! Underrun plays silence — the queue simply reads empty, which is exactly
//! the "transmission finished" signal the controller polls for.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::Mutex;

use soundlink_core::models::error::TransportError;
use soundlink_core::processing::{byte_fifo::ByteFifo, pcm};
use soundlink_core::traits::audio_backend::OutputStream;

pub struct CpalOutputStream {
    fifo: Arc<Mutex<ByteFifo>>,
    stream: Option<cpal::Stream>,
}

// SAFETY: cpal::Stream is !Send. The stream handle lives inside the
// transport's single lock from open to close and is never touched from two
// threads at once; the audio callback only shares the Mutex-guarded FIFO.
unsafe impl Send for CpalOutputStream {}

impl CpalOutputStream {
    /// Build and start a playback stream on `device`.
    pub fn open(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
    ) -> Result<Self, TransportError> {
        let fifo = Arc::new(Mutex::new(ByteFifo::new()));
        let channels = config.channels as usize;

        let callback_fifo = Arc::clone(&fifo);
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    let bytes = callback_fifo.lock().pop_up_to(frames * 2);
                    let samples = pcm::bytes_to_i16(&bytes);
                    fill_frames(data, &samples, channels);
                },
                move |err| {
                    log::error!("playback stream error: {err}");
                },
                None,
            )
            .map_err(|e| TransportError::DeviceOpenFailed(format!("build playback stream: {e}")))?;

        stream
            .play()
            .map_err(|e| TransportError::DeviceOpenFailed(format!("start playback stream: {e}")))?;

        Ok(Self {
            fifo,
            stream: Some(stream),
        })
    }
}

impl OutputStream for CpalOutputStream {
    fn enqueue(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.stream.is_none() {
            return Err(TransportError::DeviceOpenFailed("playback stream closed".into()));
        }
        self.fifo.lock().push(bytes);
        Ok(())
    }

    fn queued_bytes(&self) -> usize {
        self.fifo.lock().len()
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            drop(stream);
            self.fifo.lock().clear();
        }
    }
}

impl Drop for CpalOutputStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Write `samples` into interleaved `data`, one mono sample per frame,
/// duplicated across channels; frames past the queued samples get silence.
fn fill_frames(data: &mut [i16], samples: &[i16], channels: usize) {
    for (i, frame) in data.chunks_mut(channels).enumerate() {
        let sample = samples.get(i).copied().unwrap_or(0);
        for out in frame.iter_mut() {
            *out = sample;
        }
    }
}
