use crate::models::error::TransportError;
use crate::models::format::{DeviceDescriptor, DeviceFormat, DeviceSelector, StreamDirection};

/// Interface to the platform audio subsystem.
///
/// Implemented by `soundlink-cpal` for real hardware and by scripted mocks
/// in tests. The backend owns device discovery and stream creation; the
/// transport controller never touches the OS audio layer directly.
///
/// Streams returned by `open_*` are already running: the playback stream
/// drains its queue and the capture stream accumulates samples from the
/// moment the call returns.
pub trait AudioBackend: Send {
    type Output: OutputStream;
    type Input: InputStream;

    /// List devices for one direction, in stable index order.
    fn enumerate(&self, direction: StreamDirection) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open a playback stream with the requested format.
    ///
    /// The backend may grant a different sample rate than requested; the
    /// returned format is what was actually obtained and must be propagated
    /// to the codec.
    fn open_output(
        &self,
        device: DeviceSelector,
        requested: &DeviceFormat,
    ) -> Result<(Self::Output, DeviceFormat), TransportError>;

    /// Open a capture stream with the requested format. Same negotiation
    /// contract as [`open_output`](Self::open_output).
    fn open_input(
        &self,
        device: DeviceSelector,
        requested: &DeviceFormat,
    ) -> Result<(Self::Input, DeviceFormat), TransportError>;
}

/// A running playback stream.
///
/// Enqueued bytes are played asynchronously by the backend's own thread;
/// none of these methods block on playback.
pub trait OutputStream: Send {
    /// Append waveform bytes to the playback queue.
    fn enqueue(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Bytes enqueued but not yet played. Zero means the last transmission
    /// has fully left the queue.
    fn queued_bytes(&self) -> usize;

    /// Stop and release the stream. Idempotent.
    fn close(&mut self);
}

/// A running capture stream.
///
/// Captured bytes accumulate asynchronously; the controller drains them in
/// whole decode frames.
pub trait InputStream: Send {
    /// Bytes captured and not yet dequeued.
    fn available_bytes(&self) -> usize;

    /// Remove and return exactly `n` bytes. Fails if fewer are buffered;
    /// the buffer is left untouched in that case.
    fn dequeue(&self, n: usize) -> Result<Vec<u8>, TransportError>;

    /// Drop all buffered capture bytes.
    fn discard_all(&self);

    /// Stop and release the stream. Idempotent.
    fn close(&mut self);
}
