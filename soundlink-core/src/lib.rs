//! # soundlink-core
//!
//! Platform-agnostic half-duplex acoustic data transport.
//!
//! Short text messages become sound on a speaker and come back as text from
//! a microphone, letting two machines with no other shared channel exchange
//! small payloads. This crate holds everything that runs off-device: the
//! transport controller (state machine, half-duplex interleave, capture
//! backpressure), the codec adapter, and the trait seams that audio backends
//! (e.g. `soundlink-cpal`) and acoustic codecs plug into.
//!
//! ## Architecture
//!
//! ```text
//! soundlink-core (this crate)
//! ├── traits/       ← AudioBackend, OutputStream, InputStream, AcousticCodec
//! ├── models/       ← TransportError, DeviceFormat, ProtocolId, TransportConfig, …
//! ├── processing/   ← ByteFifo, PCM byte conversions
//! ├── codec/        ← CodecAdapter (codec bound to negotiated formats)
//! └── transport/    ← AcousticTransport (controller), Mailbox
//! ```
//!
//! The controller is driven by a polling loop calling
//! [`AcousticTransport::tick`] on a steady interval; `send` and
//! `receive_message` may come from any thread. One internal lock serializes
//! all callers.

pub mod codec;
pub mod models;
pub mod processing;
pub mod traits;
pub mod transport;

// Re-export key types at crate root for convenience.
pub use codec::adapter::{CodecAdapter, MAX_VOLUME, MIN_VOLUME};
pub use models::config::TransportConfig;
pub use models::diagnostics::TransportDiagnostics;
pub use models::error::TransportError;
pub use models::format::{
    DeviceDescriptor, DeviceFormat, DeviceSelector, SampleFormat, StreamDirection,
};
pub use models::protocol::ProtocolId;
pub use processing::byte_fifo::ByteFifo;
pub use traits::audio_backend::{AudioBackend, InputStream, OutputStream};
pub use traits::codec::{AcousticCodec, CodecParams};
pub use transport::controller::AcousticTransport;
