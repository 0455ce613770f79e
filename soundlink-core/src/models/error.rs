use thiserror::Error;

/// Errors reported by the acoustic transport.
///
/// Every public operation returns one of these as a discrete value; callers
/// are expected to check each result. A decode that finds no payload is not
/// an error — it is the steady-state outcome of most ticks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("audio backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("failed to open audio device: {0}")]
    DeviceOpenFailed(String),

    #[error("encode failed: {0}")]
    EncodeFailed(String),

    #[error("invalid protocol id: {0}")]
    InvalidProtocol(i32),

    #[error("empty payload")]
    EmptyPayload,

    #[error("transport not initialized")]
    NotInitialized,

    #[error("transport already initialized")]
    AlreadyInitialized,
}
