//! EQ Processor
//!
//! Ties the parameter store, the update scheduler and the filter chain
//! together. The host calls [`EqProcessor::configure`] off the audio thread
//! and one of the `process_*` methods per block on it.
//!
//! # Block lifecycle
//!
//! ```text
//! control thread: store.set() ──▶ listener ──▶ scheduler.mark_dirty()
//!                                                   │
//! audio thread:   take_dirty()? ──▶ snapshot ──▶ design ──▶ chain.apply
//!                      └─────────────────────────────────▶ chain.process
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use eqalpha_dsp::{AudioProcessor, ChainUpdate, DspError, FilterChain, ProcessContext};

use crate::config::StreamConfig;
use crate::error::{EngineError, EngineResult};
use crate::params::{ListenerId, ParameterStore};
use crate::scheduler::UpdateScheduler;

/// 4-band EQ with saturation, driven by a shared parameter store
pub struct EqProcessor {
    params: Arc<ParameterStore>,
    scheduler: Arc<UpdateScheduler>,
    listener_id: ListenerId,
    chain: FilterChain,
    config: Option<StreamConfig>,
    /// Number of coefficient recomputations since creation
    recompute_count: u64,
}

impl EqProcessor {
    /// Create a processor and subscribe it to `params`
    ///
    /// Processing is a no-op until [`EqProcessor::configure`] succeeds.
    pub fn new(params: Arc<ParameterStore>) -> Self {
        let scheduler = Arc::new(UpdateScheduler::new());
        let listener_id = params.add_listener(scheduler.clone());

        Self {
            params,
            scheduler,
            listener_id,
            chain: FilterChain::new(),
            config: None,
            recompute_count: 0,
        }
    }

    /// Prepare for a stream
    ///
    /// Validates the configuration, reallocates per-channel filter state
    /// and computes coefficients immediately. Must not be called on the
    /// audio thread.
    pub fn configure(&mut self, config: &StreamConfig) -> EngineResult<()> {
        config.validate().map_err(EngineError::ConfigError)?;
        self.prepare_chain(*config)?;

        info!(
            "EQ configured: {} Hz, {} in / {} out, block {} ({:.1} ms)",
            config.sample_rate,
            config.input_channels,
            config.output_channels,
            config.block_size,
            config.latency_ms()
        );
        if !config.is_balanced() {
            info!("Input and output channel counts differ; processing will pass audio through");
        }
        Ok(())
    }

    fn prepare_chain(&mut self, config: StreamConfig) -> Result<(), DspError> {
        self.chain.configure(config.process_context())?;
        self.config = Some(config);

        self.scheduler.take_dirty();
        self.update_filters();
        Ok(())
    }

    /// Recompute coefficients from the store and swap them into the chain
    fn update_filters(&mut self) {
        let Some(config) = self.config else {
            return;
        };
        let snapshot = self.params.snapshot();
        let update = ChainUpdate::design(&snapshot, config.sample_rate);
        self.chain.apply(&update);
        self.recompute_count += 1;
    }

    /// Channel count the chain can run on, if the layout allows processing
    #[inline]
    fn active_channels(&self) -> Option<usize> {
        match self.config {
            Some(config) if config.is_balanced() => Some(config.input_channels as usize),
            _ => None,
        }
    }

    #[inline]
    fn refresh_if_dirty(&mut self) {
        if self.scheduler.take_dirty() {
            self.update_filters();
        }
    }

    /// Process one block of planar audio in place
    ///
    /// Skipped when unconfigured, when the buses differ, or when the slice
    /// count does not match the configured channels.
    pub fn process_planar(&mut self, channels: &mut [&mut [f32]]) {
        match self.active_channels() {
            Some(expected) if expected == channels.len() => {}
            _ => return,
        }
        self.refresh_if_dirty();
        self.chain.process_planar(channels);
    }

    /// Process one block of interleaved audio in place
    ///
    /// Buffer format: [L0, R0, L1, R1, ...]
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        let Some(channels) = self.active_channels() else {
            return;
        };
        if buffer.len() % channels != 0 {
            return;
        }
        self.refresh_if_dirty();
        self.chain.process_interleaved(buffer, channels);
    }

    /// Clear filter history, keeping coefficients
    pub fn reset(&mut self) {
        self.chain.reset();
    }

    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn config(&self) -> Option<&StreamConfig> {
        self.config.as_ref()
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }
}

impl Drop for EqProcessor {
    fn drop(&mut self) {
        if self.params.remove_listener(self.listener_id) {
            debug!("EQ processor detached from parameter store");
        }
    }
}

impl AudioProcessor for EqProcessor {
    /// Same acceptance rules as [`EqProcessor::configure`]
    fn prepare(&mut self, context: ProcessContext) -> Result<(), DspError> {
        context.validate()?;
        let config = StreamConfig::symmetric(
            context.sample_rate,
            context.buffer_size,
            context.channels as u16,
        );
        config.validate().map_err(DspError::UnsupportedStream)?;
        self.prepare_chain(config)
    }

    fn process(&mut self, buffer: &mut [f32], context: &ProcessContext) {
        if self.active_channels() == Some(context.channels) {
            self.process_interleaved(buffer);
        }
    }

    fn reset(&mut self) {
        EqProcessor::reset(self);
    }

    fn name(&self) -> &'static str {
        "EQAlpha"
    }
}
