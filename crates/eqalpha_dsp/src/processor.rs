//! Audio Processor Trait
//!
//! Defines the interface a host uses to drive a processor: prepare once per
//! stream configuration, then process buffers on the audio thread.

use crate::chain::MAX_CHANNELS;
use crate::error::DspError;

/// Context passed to processors containing stream metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessContext {
    pub sample_rate: f32,
    pub channels: usize,
    pub buffer_size: usize,
}

impl ProcessContext {
    pub fn new(sample_rate: f32, channels: usize, buffer_size: usize) -> Self {
        Self {
            sample_rate,
            channels,
            buffer_size,
        }
    }

    /// Check that the context describes a stream the chain can run
    pub fn validate(&self) -> Result<(), DspError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(DspError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(DspError::InvalidChannelCount(self.channels));
        }
        if self.buffer_size == 0 {
            return Err(DspError::InvalidBufferSize(self.buffer_size));
        }
        Ok(())
    }
}

/// Trait for audio processors driven by a host
///
/// # Real-time Safety Contract
///
/// Implementors MUST follow these rules in `process()`:
/// - NO heap allocations (no Vec::push, no Box::new, no String)
/// - NO syscalls (no file I/O, no network, no mutex locks)
/// - NO panics; malformed buffers are skipped, not reported
/// - Constant or O(n) time complexity where n = buffer size
///
/// `prepare()` runs off the audio thread and may allocate.
pub trait AudioProcessor: Send {
    /// (Re)configure for a stream; clears all filter history
    fn prepare(&mut self, context: ProcessContext) -> Result<(), DspError>;

    /// Process audio buffer in-place
    ///
    /// Buffer format is interleaved with `context.channels` channels:
    /// [L0, R0, L1, R1, ...]
    fn process(&mut self, buffer: &mut [f32], context: &ProcessContext);

    /// Reset internal state (delay lines)
    fn reset(&mut self);

    /// Human-readable name for debugging/UI
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_context() {
        let ctx = ProcessContext::new(48000.0, 2, 512);
        assert_eq!(ctx.sample_rate, 48000.0);
        assert_eq!(ctx.channels, 2);
        assert_eq!(ctx.buffer_size, 512);
        assert!(ctx.validate().is_ok());
    }

    #[test]
    fn test_context_validation() {
        assert_eq!(
            ProcessContext::new(0.0, 2, 512).validate(),
            Err(DspError::InvalidSampleRate(0.0))
        );
        assert!(ProcessContext::new(f32::NAN, 2, 512).validate().is_err());
        assert!(ProcessContext::new(f32::INFINITY, 2, 512).validate().is_err());
        assert_eq!(
            ProcessContext::new(48000.0, 0, 512).validate(),
            Err(DspError::InvalidChannelCount(0))
        );
        assert_eq!(
            ProcessContext::new(48000.0, MAX_CHANNELS + 1, 512).validate(),
            Err(DspError::InvalidChannelCount(MAX_CHANNELS + 1))
        );
        assert_eq!(
            ProcessContext::new(48000.0, 2, 0).validate(),
            Err(DspError::InvalidBufferSize(0))
        );
    }
}
