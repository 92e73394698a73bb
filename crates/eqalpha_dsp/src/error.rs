//! DSP Error Types

use thiserror::Error;

/// Errors that can occur while preparing the DSP chain
///
/// None of these are produced on the audio path: processing calls never
/// fail, they skip malformed buffers instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("Invalid channel count: {0} (must be 1-{max})", max = crate::MAX_CHANNELS)]
    InvalidChannelCount(usize),

    #[error("Buffer size must be non-zero, got {0}")]
    InvalidBufferSize(usize),

    /// Valid for the chain but outside what the host-facing processor supports
    #[error("Unsupported stream configuration: {0}")]
    UnsupportedStream(String),
}
