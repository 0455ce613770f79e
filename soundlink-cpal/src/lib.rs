//! # soundlink-cpal
//!
//! cpal audio backend for soundlink.
//!
//! Provides:
//! - `CpalBackend` — device enumeration and stream opening via the host's
//!   default audio subsystem
//! - `CpalOutputStream` — playback queue drained by the device callback
//! - `CpalInputStream` — capture FIFO filled by the device callback
//!
//! ## Usage
//! ```ignore
//! use soundlink_core::{AcousticTransport, TransportConfig};
//! use soundlink_cpal::CpalBackend;
//!
//! let transport = AcousticTransport::new(CpalBackend::new(), codec);
//! transport.init(&TransportConfig::default())?;
//! ```
//!
//! The audio callbacks touch only their Mutex-guarded byte FIFOs; all
//! controller state stays behind the transport's own lock.

pub mod backend;
pub mod input;
pub mod output;

pub use backend::CpalBackend;
pub use input::CpalInputStream;
pub use output::CpalOutputStream;
