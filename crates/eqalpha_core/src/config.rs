//! Stream Configuration

use serde::{Deserialize, Serialize};

use eqalpha_dsp::{ProcessContext, MAX_CHANNELS};

/// Audio stream configuration as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: f32,

    /// Maximum block size in frames the host will deliver
    pub block_size: usize,

    /// Channels on the input bus
    pub input_channels: u16,

    /// Channels on the output bus
    pub output_channels: u16,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            block_size: 512,
            input_channels: 2,
            output_channels: 2,
        }
    }
}

impl StreamConfig {
    /// Same channel count in and out
    pub fn symmetric(sample_rate: f32, block_size: usize, channels: u16) -> Self {
        Self {
            sample_rate,
            block_size,
            input_channels: channels,
            output_channels: channels,
        }
    }

    /// Calculate latency in milliseconds for one block
    pub fn latency_ms(&self) -> f32 {
        (self.block_size as f32 / self.sample_rate) * 1000.0
    }

    /// Whether input and output buses carry the same channel count
    ///
    /// Processing is skipped for unbalanced layouts.
    pub fn is_balanced(&self) -> bool {
        self.input_channels == self.output_channels
    }

    /// DSP context for the chain (filters run on the input channels)
    pub fn process_context(&self) -> ProcessContext {
        ProcessContext::new(self.sample_rate, self.input_channels as usize, self.block_size)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(8000.0..=192000.0).contains(&self.sample_rate) {
            return Err(format!("Invalid sample rate: {}", self.sample_rate));
        }
        for channels in [self.input_channels, self.output_channels] {
            if channels == 0 || channels as usize > MAX_CHANNELS {
                return Err(format!("Invalid channel count: {}", channels));
            }
        }
        if self.block_size < 16 || self.block_size > 8192 {
            return Err(format!("Invalid block size: {}", self.block_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.block_size, 512);
        assert_eq!(config.input_channels, 2);
        assert!(config.is_balanced());
    }

    #[test]
    fn test_latency_calculation() {
        let config = StreamConfig::symmetric(48000.0, 480, 2); // Exactly 10ms at 48kHz
        let latency = config.latency_ms();
        assert!((latency - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_validation() {
        let valid = StreamConfig::default();
        assert!(valid.validate().is_ok());

        let invalid_rate = StreamConfig {
            sample_rate: 100.0,
            ..Default::default()
        };
        assert!(invalid_rate.validate().is_err());

        let nan_rate = StreamConfig {
            sample_rate: f32::NAN,
            ..Default::default()
        };
        assert!(nan_rate.validate().is_err());

        let invalid_channels = StreamConfig {
            output_channels: 0,
            ..Default::default()
        };
        assert!(invalid_channels.validate().is_err());

        let too_many = StreamConfig::symmetric(48000.0, 512, 9);
        assert!(too_many.validate().is_err());

        let invalid_block = StreamConfig {
            block_size: 10,
            ..Default::default()
        };
        assert!(invalid_block.validate().is_err());
    }

    #[test]
    fn test_unbalanced_layout_still_valid() {
        let config = StreamConfig {
            input_channels: 1,
            output_channels: 2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.is_balanced());
    }

    #[test]
    fn test_process_context() {
        let ctx = StreamConfig::symmetric(44100.0, 256, 1).process_context();
        assert_eq!(ctx, ProcessContext::new(44100.0, 1, 256));
    }

    #[test]
    fn test_config_serialization() {
        let config = StreamConfig::symmetric(96000.0, 128, 2);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: StreamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
