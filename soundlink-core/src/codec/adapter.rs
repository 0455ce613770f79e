use crate::models::error::TransportError;
use crate::models::format::DeviceFormat;
use crate::models::protocol::ProtocolId;
use crate::traits::codec::{AcousticCodec, CodecParams};

/// Lowest accepted transmission volume.
pub const MIN_VOLUME: u8 = 1;
/// Highest accepted transmission volume.
pub const MAX_VOLUME: u8 = 100;

/// The codec bound to one session's negotiated stream formats.
///
/// Owns the active protocol and the frame-size accounting; payloads go in,
/// ready-to-play waveform bytes come out. Constructed by `init` from the
/// *obtained* formats and must be [`bind`](Self::bind)ed before use; on a
/// bind failure the codec can be recovered with
/// [`into_inner`](Self::into_inner) for a later session.
pub struct CodecAdapter<C: AcousticCodec> {
    codec: C,
    params: CodecParams,
    protocol: ProtocolId,
    frame_bytes: usize,
}

impl<C: AcousticCodec> CodecAdapter<C> {
    /// Pair `codec` with the obtained playback/capture formats.
    pub fn new(
        codec: C,
        nominal_rate: u32,
        samples_per_frame: usize,
        output: &DeviceFormat,
        input: &DeviceFormat,
        protocol: ProtocolId,
    ) -> Self {
        let params = CodecParams {
            sample_rate: nominal_rate as f32,
            sample_rate_inp: input.sample_rate as f32,
            sample_rate_out: output.sample_rate as f32,
            format_inp: input.sample_format,
            format_out: output.sample_format,
            samples_per_frame,
        };
        Self {
            codec,
            params,
            protocol,
            frame_bytes: samples_per_frame * input.sample_format.bytes_per_sample(),
        }
    }

    /// Bind the codec to the stored operating point.
    pub fn bind(&mut self) -> Result<(), TransportError> {
        self.codec
            .configure(&self.params)
            .map_err(TransportError::EncodeFailed)?;

        log::debug!(
            "codec bound: nominal {} Hz, in {} Hz/{:?}, out {} Hz/{:?}, frame {} samples",
            self.params.sample_rate,
            self.params.sample_rate_inp,
            self.params.format_inp,
            self.params.sample_rate_out,
            self.params.format_out,
            self.params.samples_per_frame,
        );
        Ok(())
    }

    /// Size in bytes of one decode frame of input-format samples.
    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    pub fn protocol(&self) -> ProtocolId {
        self.protocol
    }

    /// Select the protocol for subsequent encodes. Decoding is unaffected.
    pub fn set_protocol(&mut self, protocol: ProtocolId) {
        self.protocol = protocol;
    }

    /// Encode `payload` under the current protocol into a waveform ready to
    /// enqueue on the playback stream.
    pub fn encode(&mut self, payload: &[u8], volume: u8) -> Result<Vec<u8>, TransportError> {
        if payload.is_empty() {
            return Err(TransportError::EncodeFailed("empty payload".into()));
        }
        if !(MIN_VOLUME..=MAX_VOLUME).contains(&volume) {
            return Err(TransportError::EncodeFailed(format!(
                "volume {} outside {}..={}",
                volume, MIN_VOLUME, MAX_VOLUME
            )));
        }

        let waveform = self
            .codec
            .encode(payload, self.protocol, volume)
            .map_err(TransportError::EncodeFailed)?;
        if waveform.is_empty() {
            return Err(TransportError::EncodeFailed("codec produced no samples".into()));
        }
        Ok(waveform)
    }

    /// Feed one frame of capture bytes to the demodulator. `None` is the
    /// normal no-payload-yet result.
    pub fn decode(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
        debug_assert_eq!(frame.len(), self.frame_bytes);
        self.codec.decode(frame)
    }

    /// Release the bound formats and hand the codec back for a later session.
    pub fn into_inner(self) -> C {
        self.codec
    }
}
