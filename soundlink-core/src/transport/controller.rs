use parking_lot::Mutex;

use crate::codec::adapter::CodecAdapter;
use crate::models::config::TransportConfig;
use crate::models::diagnostics::TransportDiagnostics;
use crate::models::error::TransportError;
use crate::models::format::{DeviceDescriptor, StreamDirection};
use crate::models::protocol::ProtocolId;
use crate::traits::audio_backend::{AudioBackend, InputStream, OutputStream};
use crate::traits::codec::AcousticCodec;

/// State owned by an initialized session.
struct Session<O: OutputStream, I: InputStream, C: AcousticCodec> {
    output: O,
    input: I,
    adapter: CodecAdapter<C>,
    mailbox: super::mailbox::Mailbox,
    /// Set by `send`, cleared once the playback queue drains. While set,
    /// ticks do no capture work.
    transmitting: bool,
    high_water_frames: usize,
    diagnostics: TransportDiagnostics,
}

/// Everything behind the controller's single lock.
struct Inner<B: AudioBackend, C: AcousticCodec> {
    backend: B,
    /// Parked between sessions; moves into the codec adapter during one.
    codec: Option<C>,
    session: Option<Session<B::Output, B::Input, C>>,
    last_error: String,
}

/// Half-duplex acoustic transport controller.
///
/// One instance owns the whole transport: device streams, codec binding,
/// transmit state, and the single-slot receive mailbox. Every public
/// operation serializes on one internal lock, so the controller behaves as
/// a single-threaded actor no matter which threads call in; the audio
/// backend's own threads never enter here, they only fill and drain the
/// stream FIFOs the controller observes through size queries.
///
/// Drive it from a polling loop:
///
/// ```ignore
/// let transport = AcousticTransport::new(backend, codec);
/// transport.init(&TransportConfig::default())?;
/// transport.send("hello", 50)?;
/// loop {
///     transport.tick()?;
///     if let Some(msg) = transport.receive_message(256)? {
///         println!("{msg}");
///     }
///     std::thread::sleep(Duration::from_millis(50));
/// }
/// ```
pub struct AcousticTransport<B: AudioBackend, C: AcousticCodec> {
    inner: Mutex<Inner<B, C>>,
}

impl<B: AudioBackend, C: AcousticCodec> AcousticTransport<B, C> {
    /// Construct an uninitialized transport over `backend` and `codec`.
    pub fn new(backend: B, codec: C) -> Self {
        Self {
            inner: Mutex::new(Inner {
                backend,
                codec: Some(codec),
                session: None,
                last_error: String::new(),
            }),
        }
    }

    /// List playback devices. Valid in any lifecycle state.
    pub fn enumerate_playback(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let mut inner = self.inner.lock();
        match inner.backend.enumerate(StreamDirection::Playback) {
            Ok(devices) => Ok(devices),
            Err(e) => Self::fail(&mut inner, e),
        }
    }

    /// List capture devices. Valid in any lifecycle state.
    pub fn enumerate_capture(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let mut inner = self.inner.lock();
        match inner.backend.enumerate(StreamDirection::Capture) {
            Ok(devices) => Ok(devices),
            Err(e) => Self::fail(&mut inner, e),
        }
    }

    /// Open both streams, bind the codec to the obtained formats, and make
    /// the session ready.
    ///
    /// Any failure after a partial open releases everything already opened
    /// before returning; no device handle survives a failed init.
    pub fn init(&self, config: &TransportConfig) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();

        if inner.session.is_some() {
            return Self::fail(&mut inner, TransportError::AlreadyInitialized);
        }
        if let Err(reason) = config.validate() {
            return Self::fail(
                &mut inner,
                TransportError::DeviceOpenFailed(format!("invalid configuration: {reason}")),
            );
        }
        let Some(codec) = inner.codec.take() else {
            return Self::fail(&mut inner, TransportError::AlreadyInitialized);
        };

        let (output, obtained_out) =
            match inner.backend.open_output(config.playback_device, &config.playback_format()) {
                Ok(opened) => opened,
                Err(e) => {
                    inner.codec = Some(codec);
                    return Self::fail(&mut inner, e);
                }
            };

        let (input, obtained_in) =
            match inner.backend.open_input(config.capture_device, &config.capture_format()) {
                Ok(opened) => opened,
                Err(e) => {
                    let mut output = output;
                    output.close();
                    inner.codec = Some(codec);
                    return Self::fail(&mut inner, e);
                }
            };

        let mut adapter = CodecAdapter::new(
            codec,
            config.sample_rate,
            config.samples_per_frame,
            &obtained_out,
            &obtained_in,
            config.protocol,
        );
        if let Err(e) = adapter.bind() {
            let (mut output, mut input) = (output, input);
            output.close();
            input.close();
            inner.codec = Some(adapter.into_inner());
            return Self::fail(&mut inner, e);
        }

        log::info!(
            "transport ready: playback {} Hz/{:?}, capture {} Hz/{:?}, protocol {:?}",
            obtained_out.sample_rate,
            obtained_out.sample_format,
            obtained_in.sample_rate,
            obtained_in.sample_format,
            config.protocol,
        );

        inner.session = Some(Session {
            output,
            input,
            adapter,
            mailbox: super::mailbox::Mailbox::new(),
            transmitting: false,
            high_water_frames: config.high_water_frames,
            diagnostics: TransportDiagnostics::default(),
        });
        Ok(())
    }

    /// Encode `message` under the current protocol and hand the waveform to
    /// the playback stream. Returns as soon as the waveform is queued;
    /// playback completes asynchronously.
    pub fn send(&self, message: &str, volume: u8) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        let Some(session) = inner.session.as_mut() else {
            return Self::fail(&mut inner, TransportError::NotInitialized);
        };
        if message.is_empty() {
            return Self::fail(&mut inner, TransportError::EmptyPayload);
        }

        let waveform = match session.adapter.encode(message.as_bytes(), volume) {
            Ok(w) => w,
            Err(e) => return Self::fail(&mut inner, e),
        };
        if let Err(e) = session.output.enqueue(&waveform) {
            return Self::fail(&mut inner, e);
        }

        session.transmitting = true;
        session.diagnostics.waveforms_sent += 1;
        session.diagnostics.bytes_enqueued += waveform.len() as u64;
        log::debug!(
            "queued {} waveform bytes for {} payload bytes at volume {}",
            waveform.len(),
            message.len(),
            volume,
        );
        Ok(())
    }

    /// Whether the playback stream still holds unplayed bytes from the most
    /// recent send. Recomputed from the backend, never answered from cache.
    pub fn is_transmitting(&self) -> bool {
        let mut inner = self.inner.lock();
        let Some(session) = inner.session.as_mut() else {
            return false;
        };
        session.transmitting = session.output.queued_bytes() > 0;
        session.transmitting
    }

    /// One processing step; call on a steady interval.
    ///
    /// Transmission takes priority: while the last send is still draining,
    /// no capture bytes are touched — the transport never tries to decode
    /// what may be its own signal. Once idle, an over-watermark capture
    /// backlog is discarded wholesale for freshness; otherwise at most one
    /// frame is dequeued and offered to the decoder.
    pub fn tick(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        let Some(session) = inner.session.as_mut() else {
            return Self::fail(&mut inner, TransportError::NotInitialized);
        };
        session.diagnostics.ticks += 1;

        if session.transmitting {
            if session.output.queued_bytes() == 0 {
                session.transmitting = false;
                log::debug!("transmission drained, returning to idle");
            }
            return Ok(());
        }

        let frame_bytes = session.adapter.frame_bytes();
        let available = session.input.available_bytes();

        if available > session.high_water_frames * frame_bytes {
            session.input.discard_all();
            session.diagnostics.input_discards += 1;
            log::warn!(
                "capture backlog of {} bytes exceeded {} frames, discarded",
                available,
                session.high_water_frames,
            );
            return Ok(());
        }

        if available >= frame_bytes {
            let frame = match session.input.dequeue(frame_bytes) {
                Ok(frame) => frame,
                Err(e) => return Self::fail(&mut inner, e),
            };
            session.diagnostics.frames_decoded += 1;

            if let Some(payload) = session.adapter.decode(&frame) {
                session.diagnostics.messages_decoded += 1;
                log::info!("decoded {} payload bytes", payload.len());
                if session.mailbox.replace(payload).is_some() {
                    session.diagnostics.mailbox_overwrites += 1;
                    log::warn!("unread message replaced by newer decode");
                }
            }
        }
        Ok(())
    }

    /// Return and clear the pending message, if any.
    ///
    /// A stored payload longer than `buffer_size` is truncated to
    /// `buffer_size - 1` bytes before lossy UTF-8 conversion, keeping one
    /// byte of the caller's budget reserved for a terminator. The mailbox
    /// is cleared even when truncating.
    pub fn receive_message(&self, buffer_size: usize) -> Result<Option<String>, TransportError> {
        let mut inner = self.inner.lock();
        let Some(session) = inner.session.as_mut() else {
            return Self::fail(&mut inner, TransportError::NotInitialized);
        };

        let Some(mut payload) = session.mailbox.take() else {
            return Ok(None);
        };
        if payload.len() >= buffer_size {
            payload.truncate(buffer_size.saturating_sub(1));
        }
        Ok(Some(String::from_utf8_lossy(&payload).into_owned()))
    }

    /// Select the protocol for subsequent sends. An unknown id fails with
    /// `InvalidProtocol` and leaves the active protocol untouched.
    pub fn set_protocol(&self, raw_id: i32) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.session.is_none() {
            return Self::fail(&mut inner, TransportError::NotInitialized);
        }
        let Some(protocol) = ProtocolId::from_id(raw_id) else {
            return Self::fail(&mut inner, TransportError::InvalidProtocol(raw_id));
        };
        if let Some(session) = inner.session.as_mut() {
            session.adapter.set_protocol(protocol);
            log::debug!("protocol set to {:?}", protocol);
        }
        Ok(())
    }

    /// Release both streams and the codec binding and return to the
    /// uninitialized state. Fail-safe: never errors, no-op when already
    /// uninitialized.
    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        if let Some(mut session) = inner.session.take() {
            session.output.close();
            session.input.close();
            inner.codec = Some(session.adapter.into_inner());
            log::info!("transport torn down");
        }
    }

    /// Human-readable description of the most recent failing call. Empty
    /// until something fails; valid until the next failure.
    pub fn last_error(&self) -> String {
        self.inner.lock().last_error.clone()
    }

    /// Snapshot of the current session's counters. Zeroed when
    /// uninitialized.
    pub fn diagnostics(&self) -> TransportDiagnostics {
        let inner = self.inner.lock();
        inner
            .session
            .as_ref()
            .map(|s| s.diagnostics)
            .unwrap_or_default()
    }

    fn fail<T>(inner: &mut Inner<B, C>, err: TransportError) -> Result<T, TransportError> {
        inner.last_error = err.to_string();
        log::error!("{err}");
        Err(err)
    }
}

impl<B: AudioBackend, C: AcousticCodec> Drop for AcousticTransport<B, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::models::config::SAMPLES_PER_FRAME;
    use crate::models::format::{DeviceFormat, DeviceSelector};
    use crate::processing::byte_fifo::ByteFifo;
    use crate::traits::codec::CodecParams;

    const FRAME_BYTES: usize = SAMPLES_PER_FRAME * 4;
    const MAGIC: &[u8; 4] = b"SLNK";

    // --- Scripted backend -------------------------------------------------

    type SharedFifo = Arc<Mutex<ByteFifo>>;

    struct MockOutput {
        fifo: SharedFifo,
        closes: Arc<Mutex<usize>>,
    }

    impl OutputStream for MockOutput {
        fn enqueue(&self, bytes: &[u8]) -> Result<(), TransportError> {
            self.fifo.lock().push(bytes);
            Ok(())
        }

        fn queued_bytes(&self) -> usize {
            self.fifo.lock().len()
        }

        fn close(&mut self) {
            *self.closes.lock() += 1;
        }
    }

    struct MockInput {
        fifo: SharedFifo,
        closes: Arc<Mutex<usize>>,
    }

    impl InputStream for MockInput {
        fn available_bytes(&self) -> usize {
            self.fifo.lock().len()
        }

        fn dequeue(&self, n: usize) -> Result<Vec<u8>, TransportError> {
            self.fifo.lock().pop_exact(n).ok_or_else(|| {
                TransportError::DeviceOpenFailed("dequeue past available bytes".into())
            })
        }

        fn discard_all(&self) {
            self.fifo.lock().clear();
        }

        fn close(&mut self) {
            *self.closes.lock() += 1;
        }
    }

    /// Backend whose FIFOs the test controls directly: draining the output
    /// FIFO stands in for playback, pushing into the input FIFO stands in
    /// for capture.
    #[derive(Clone, Default)]
    struct MockBackend {
        out_fifo: SharedFifo,
        in_fifo: SharedFifo,
        out_closes: Arc<Mutex<usize>>,
        in_closes: Arc<Mutex<usize>>,
        fail_input_open: bool,
        granted_rate: Option<u32>,
    }

    impl AudioBackend for MockBackend {
        type Output = MockOutput;
        type Input = MockInput;

        fn enumerate(
            &self,
            direction: StreamDirection,
        ) -> Result<Vec<DeviceDescriptor>, TransportError> {
            let name = match direction {
                StreamDirection::Playback => "Mock Speaker",
                StreamDirection::Capture => "Mock Microphone",
            };
            Ok(vec![DeviceDescriptor {
                index: 0,
                name: name.into(),
                is_default: true,
            }])
        }

        fn open_output(
            &self,
            _device: DeviceSelector,
            requested: &DeviceFormat,
        ) -> Result<(Self::Output, DeviceFormat), TransportError> {
            let mut obtained = *requested;
            if let Some(rate) = self.granted_rate {
                obtained.sample_rate = rate;
            }
            Ok((
                MockOutput {
                    fifo: Arc::clone(&self.out_fifo),
                    closes: Arc::clone(&self.out_closes),
                },
                obtained,
            ))
        }

        fn open_input(
            &self,
            _device: DeviceSelector,
            requested: &DeviceFormat,
        ) -> Result<(Self::Input, DeviceFormat), TransportError> {
            if self.fail_input_open {
                return Err(TransportError::DeviceOpenFailed("no capture device".into()));
            }
            let mut obtained = *requested;
            if let Some(rate) = self.granted_rate {
                obtained.sample_rate = rate;
            }
            Ok((
                MockInput {
                    fifo: Arc::clone(&self.in_fifo),
                    closes: Arc::clone(&self.in_closes),
                },
                obtained,
            ))
        }
    }

    // --- Scripted codec ---------------------------------------------------

    /// Waveforms are `MAGIC || protocol-id || len || payload`; decode finds
    /// that marker anywhere in a frame.
    #[derive(Default)]
    struct MockCodec {
        params: Arc<Mutex<Option<CodecParams>>>,
        fail_encode: bool,
    }

    impl AcousticCodec for MockCodec {
        fn configure(&mut self, params: &CodecParams) -> Result<(), String> {
            *self.params.lock() = Some(*params);
            Ok(())
        }

        fn encode(
            &mut self,
            payload: &[u8],
            protocol: ProtocolId,
            _volume: u8,
        ) -> Result<Vec<u8>, String> {
            if self.fail_encode {
                return Err("protocol rejected".into());
            }
            let mut waveform = MAGIC.to_vec();
            waveform.push(protocol.id() as u8);
            waveform.push(payload.len() as u8);
            waveform.extend_from_slice(payload);
            Ok(waveform)
        }

        fn decode(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
            let start = frame.windows(MAGIC.len()).position(|w| w == MAGIC)?;
            let len = *frame.get(start + 5)? as usize;
            frame.get(start + 6..start + 6 + len).map(|b| b.to_vec())
        }
    }

    // --- Helpers ----------------------------------------------------------

    fn transport() -> (AcousticTransport<MockBackend, MockCodec>, MockBackend) {
        let backend = MockBackend::default();
        let handle = backend.clone();
        (AcousticTransport::new(backend, MockCodec::default()), handle)
    }

    fn ready_transport() -> (AcousticTransport<MockBackend, MockCodec>, MockBackend) {
        let (t, backend) = transport();
        t.init(&TransportConfig::default()).unwrap();
        (t, backend)
    }

    /// One frame of capture bytes carrying a decodable payload.
    fn decodable_frame(payload: &[u8]) -> Vec<u8> {
        let mut frame = MAGIC.to_vec();
        frame.push(ProtocolId::AudibleFast.id() as u8);
        frame.push(payload.len() as u8);
        frame.extend_from_slice(payload);
        frame.resize(FRAME_BYTES, 0);
        frame
    }

    fn silent_frame() -> Vec<u8> {
        vec![0u8; FRAME_BYTES]
    }

    // --- Lifecycle --------------------------------------------------------

    #[test]
    fn teardown_is_idempotent_and_safe_without_init() {
        let (t, _) = transport();
        t.teardown();
        t.teardown();

        let (t, _) = ready_transport();
        t.teardown();
        t.teardown();
        assert!(matches!(t.tick(), Err(TransportError::NotInitialized)));
    }

    #[test]
    fn operations_fail_before_init() {
        let (t, _) = transport();

        assert_eq!(t.send("hi", 50), Err(TransportError::NotInitialized));
        assert_eq!(t.tick(), Err(TransportError::NotInitialized));
        assert_eq!(t.receive_message(64), Err(TransportError::NotInitialized));
        assert_eq!(t.set_protocol(1), Err(TransportError::NotInitialized));
        assert!(!t.is_transmitting());
    }

    #[test]
    fn double_init_fails() {
        let (t, _) = ready_transport();
        assert_eq!(
            t.init(&TransportConfig::default()),
            Err(TransportError::AlreadyInitialized)
        );
    }

    #[test]
    fn reinit_after_teardown_works() {
        let (t, _) = ready_transport();
        t.teardown();
        t.init(&TransportConfig::default()).unwrap();
        t.send("again", 50).unwrap();
    }

    #[test]
    fn invalid_config_rejected() {
        let (t, _) = transport();
        let mut config = TransportConfig::default();
        config.high_water_frames = 0;

        assert!(matches!(
            t.init(&config),
            Err(TransportError::DeviceOpenFailed(_))
        ));
        // Still uninitialized, and a good config succeeds afterwards.
        t.init(&TransportConfig::default()).unwrap();
    }

    #[test]
    fn failed_input_open_releases_output() {
        let backend = MockBackend {
            fail_input_open: true,
            ..Default::default()
        };
        let closes = Arc::clone(&backend.out_closes);
        let t = AcousticTransport::new(backend, MockCodec::default());

        assert!(matches!(
            t.init(&TransportConfig::default()),
            Err(TransportError::DeviceOpenFailed(_))
        ));
        assert_eq!(*closes.lock(), 1);
        assert!(matches!(t.tick(), Err(TransportError::NotInitialized)));
    }

    #[test]
    fn teardown_closes_both_streams() {
        let (t, backend) = ready_transport();
        t.teardown();

        assert_eq!(*backend.out_closes.lock(), 1);
        assert_eq!(*backend.in_closes.lock(), 1);
    }

    #[test]
    fn enumeration_works_in_any_state() {
        let (t, _) = transport();
        let playback = t.enumerate_playback().unwrap();
        assert_eq!(playback[0].name, "Mock Speaker");
        assert!(playback[0].is_default);

        t.init(&TransportConfig::default()).unwrap();
        let capture = t.enumerate_capture().unwrap();
        assert_eq!(capture[0].name, "Mock Microphone");
    }

    // --- Transmission -----------------------------------------------------

    #[test]
    fn send_queues_waveform_and_marks_transmitting() {
        let (t, backend) = ready_transport();
        t.send("hello", 50).unwrap();

        assert!(backend.out_fifo.lock().len() > 0);
        assert!(t.is_transmitting());
        assert_eq!(t.diagnostics().waveforms_sent, 1);
    }

    #[test]
    fn empty_message_rejected_without_enqueue() {
        let (t, backend) = ready_transport();

        assert_eq!(t.send("", 50), Err(TransportError::EmptyPayload));
        assert_eq!(backend.out_fifo.lock().len(), 0);
        assert!(!t.is_transmitting());
    }

    #[test]
    fn encode_failure_surfaces_and_queues_nothing() {
        let backend = MockBackend::default();
        let out = Arc::clone(&backend.out_fifo);
        let codec = MockCodec {
            fail_encode: true,
            ..Default::default()
        };
        let t = AcousticTransport::new(backend, codec);
        t.init(&TransportConfig::default()).unwrap();

        assert_eq!(
            t.send("hi", 50),
            Err(TransportError::EncodeFailed("protocol rejected".into()))
        );
        assert_eq!(out.lock().len(), 0);
    }

    #[test]
    fn transmit_flag_follows_queued_bytes() {
        let (t, backend) = ready_transport();
        t.send("hello", 50).unwrap();
        assert!(t.is_transmitting());

        // Playback drains the queue.
        let queued = backend.out_fifo.lock().len();
        backend.out_fifo.lock().pop_up_to(queued);
        assert!(!t.is_transmitting());
    }

    // --- Half-duplex interleave -------------------------------------------

    #[test]
    fn no_decode_while_transmitting() {
        let (t, backend) = ready_transport();
        t.send("outbound", 50).unwrap();
        backend.in_fifo.lock().push(&decodable_frame(b"inbound"));

        // Queue still draining: capture untouched.
        t.tick().unwrap();
        assert_eq!(t.diagnostics().frames_decoded, 0);
        assert_eq!(backend.in_fifo.lock().len(), FRAME_BYTES);

        // Queue drained: this tick only flips back to idle.
        let queued = backend.out_fifo.lock().len();
        backend.out_fifo.lock().pop_up_to(queued);
        t.tick().unwrap();
        assert_eq!(t.diagnostics().frames_decoded, 0);

        // Now idle: the frame decodes.
        t.tick().unwrap();
        assert_eq!(t.diagnostics().frames_decoded, 1);
        assert_eq!(t.receive_message(64).unwrap().as_deref(), Some("inbound"));
    }

    #[test]
    fn tick_without_full_frame_does_nothing() {
        let (t, backend) = ready_transport();
        backend.in_fifo.lock().push(&vec![0u8; FRAME_BYTES - 1]);

        t.tick().unwrap();
        assert_eq!(t.diagnostics().frames_decoded, 0);
        assert_eq!(backend.in_fifo.lock().len(), FRAME_BYTES - 1);
    }

    #[test]
    fn tick_consumes_one_frame_at_a_time() {
        let (t, backend) = ready_transport();
        for _ in 0..3 {
            backend.in_fifo.lock().push(&silent_frame());
        }

        t.tick().unwrap();
        assert_eq!(backend.in_fifo.lock().len(), 2 * FRAME_BYTES);
        assert_eq!(t.diagnostics().frames_decoded, 1);
    }

    // --- Backpressure -----------------------------------------------------

    #[test]
    fn backlog_over_watermark_discarded_whole() {
        let (t, backend) = ready_transport();
        for _ in 0..33 {
            backend.in_fifo.lock().push(&decodable_frame(b"stale"));
        }

        t.tick().unwrap();
        assert_eq!(backend.in_fifo.lock().len(), 0);
        assert_eq!(t.diagnostics().input_discards, 1);
        // Discarded, not decoded.
        assert_eq!(t.diagnostics().frames_decoded, 0);
        assert_eq!(t.receive_message(64).unwrap(), None);
    }

    #[test]
    fn backlog_at_watermark_still_processed() {
        let (t, backend) = ready_transport();
        for _ in 0..32 {
            backend.in_fifo.lock().push(&silent_frame());
        }

        t.tick().unwrap();
        assert_eq!(t.diagnostics().input_discards, 0);
        assert_eq!(t.diagnostics().frames_decoded, 1);
        assert_eq!(backend.in_fifo.lock().len(), 31 * FRAME_BYTES);
    }

    // --- Mailbox ----------------------------------------------------------

    #[test]
    fn receive_with_nothing_pending_returns_none() {
        let (t, _) = ready_transport();
        assert_eq!(t.receive_message(64).unwrap(), None);
    }

    #[test]
    fn mailbox_keeps_only_newest_message() {
        let (t, backend) = ready_transport();

        backend.in_fifo.lock().push(&decodable_frame(b"first"));
        t.tick().unwrap();
        backend.in_fifo.lock().push(&decodable_frame(b"second"));
        t.tick().unwrap();

        assert_eq!(t.receive_message(64).unwrap().as_deref(), Some("second"));
        assert_eq!(t.receive_message(64).unwrap(), None);
        assert_eq!(t.diagnostics().mailbox_overwrites, 1);
    }

    #[test]
    fn receive_truncates_to_buffer_budget() {
        let (t, backend) = ready_transport();
        backend.in_fifo.lock().push(&decodable_frame(b"hello world"));
        t.tick().unwrap();

        // 11-byte message, 6-byte buffer: 5 bytes of text survive.
        assert_eq!(t.receive_message(6).unwrap().as_deref(), Some("hello"));
        // Cleared despite the truncation.
        assert_eq!(t.receive_message(64).unwrap(), None);
    }

    #[test]
    fn receive_buffer_exactly_fitting_keeps_message_whole() {
        let (t, backend) = ready_transport();
        backend.in_fifo.lock().push(&decodable_frame(b"hi"));
        t.tick().unwrap();

        assert_eq!(t.receive_message(3).unwrap().as_deref(), Some("hi"));
    }

    // --- Protocol selection -----------------------------------------------

    #[test]
    fn invalid_protocol_leaves_active_protocol() {
        let (t, backend) = ready_transport();

        assert_eq!(t.set_protocol(999), Err(TransportError::InvalidProtocol(999)));

        // The next send still encodes under the old protocol.
        t.send("check", 50).unwrap();
        let queued = backend.out_fifo.lock().len();
        let waveform = backend.out_fifo.lock().pop_exact(queued).unwrap();
        assert_eq!(waveform[4], ProtocolId::AudibleFast.id() as u8);
    }

    #[test]
    fn set_protocol_applies_to_next_send() {
        let (t, backend) = ready_transport();
        t.set_protocol(ProtocolId::UltrasoundNormal.id()).unwrap();

        t.send("check", 50).unwrap();
        let queued = backend.out_fifo.lock().len();
        let waveform = backend.out_fifo.lock().pop_exact(queued).unwrap();
        assert_eq!(waveform[4], ProtocolId::UltrasoundNormal.id() as u8);
    }

    // --- Format negotiation -----------------------------------------------

    #[test]
    fn obtained_format_reaches_codec() {
        let backend = MockBackend {
            granted_rate: Some(44_100),
            ..Default::default()
        };
        let codec = MockCodec::default();
        let params = Arc::clone(&codec.params);
        let t = AcousticTransport::new(backend, codec);
        t.init(&TransportConfig::default()).unwrap();

        let bound = params.lock().unwrap();
        assert_eq!(bound.sample_rate_inp, 44_100.0);
        assert_eq!(bound.sample_rate_out, 44_100.0);
        // The nominal codec rate stays at the configured operating point.
        assert_eq!(bound.sample_rate, 48_000.0);
    }

    // --- End to end -------------------------------------------------------

    #[test]
    fn round_trip_through_both_fifos() {
        let (t, backend) = ready_transport();

        t.send("hello", 50).unwrap();
        assert!(t.is_transmitting());

        // "Play" the waveform: drain the output queue and loop it back into
        // the capture FIFO, padded to a whole decode frame.
        let queued = backend.out_fifo.lock().len();
        let mut echo = backend.out_fifo.lock().pop_exact(queued).unwrap();
        echo.resize(FRAME_BYTES, 0);
        assert!(!t.is_transmitting());

        // is_transmitting() already observed the drained queue, so the next
        // tick goes straight to capture work and decodes the frame.
        backend.in_fifo.lock().push(&echo);
        t.tick().unwrap();

        assert_eq!(t.receive_message(256).unwrap().as_deref(), Some("hello"));
    }

    // --- Error reporting --------------------------------------------------

    #[test]
    fn last_error_tracks_most_recent_failure() {
        let (t, _) = transport();
        assert!(t.last_error().is_empty());

        let _ = t.send("hi", 50);
        assert_eq!(t.last_error(), TransportError::NotInitialized.to_string());

        t.init(&TransportConfig::default()).unwrap();
        let _ = t.send("", 50);
        assert_eq!(t.last_error(), TransportError::EmptyPayload.to_string());
    }

    #[test]
    fn diagnostics_track_session_activity() {
        let (t, backend) = ready_transport();

        t.tick().unwrap();
        t.tick().unwrap();
        backend.in_fifo.lock().push(&decodable_frame(b"msg"));
        t.tick().unwrap();

        let diag = t.diagnostics();
        assert_eq!(diag.ticks, 3);
        assert_eq!(diag.frames_decoded, 1);
        assert_eq!(diag.messages_decoded, 1);

        // Teardown resets to the zeroed snapshot.
        t.teardown();
        assert_eq!(t.diagnostics(), TransportDiagnostics::default());
    }
}
