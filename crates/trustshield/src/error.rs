/// Unified error type for the trustshield crate.
///
/// Gate outcomes such as `Denied` or `Failed` are never errors; they travel
/// as ordinary verdict values.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed observation, rejected before any score is touched.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("firmware scan failed: {0}")]
    Firmware(#[from] firmware::FirmwareError),

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Result type alias using [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
