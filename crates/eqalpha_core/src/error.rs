//! Engine Error Types

use thiserror::Error;

/// Errors that can occur outside the audio path: configuration and
/// state persistence
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Stream configuration error: {0}")]
    ConfigError(String),

    #[error("DSP error: {0}")]
    DspError(#[from] eqalpha_dsp::DspError),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("State format mismatch: expected {expected}, found {found}")]
    StateFormat { expected: String, found: String },

    #[error("Failed to parse state: {0}")]
    StateParse(#[from] serde_json::Error),

    #[error("State I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine a config directory for saved state")]
    NoStateDirectory,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
