//! EQAlpha Core - Processor
//!
//! This crate wires the DSP chain to the outside world:
//! - Lock-free parameter store with change notification
//! - Dirty-flag scheduler that debounces recomputation to once per block
//! - Host-facing processor (configure, planar/interleaved processing)
//! - JSON persistence of parameter state
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Control Thread                         │
//! │   ParameterStore::set ──notify──▶ UpdateScheduler (dirty)   │
//! └─────────────────────────────────────────────────────────────┘
//!                 │ atomics only        │ AtomicBool
//!                 ▼                     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   EqProcessor: take_dirty ─▶ snapshot ─▶ design ─▶ chain   │
//! │              (Zero allocation in this path)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod params;
mod processor;
mod scheduler;
mod state;

pub use config::StreamConfig;
pub use error::{EngineError, EngineResult};
pub use params::{
    BandParamIds, ListenerId, ParamId, ParamKind, ParamListener, ParameterStore, PARAM_COUNT,
};
pub use processor::EqProcessor;
pub use scheduler::{UpdateScheduler, UpdateState};
pub use state::{ParameterState, STATE_FORMAT, STATE_VERSION};

// Re-export DSP types for convenience
pub use eqalpha_dsp::{AudioProcessor, BandSlot, EqSnapshot, FilterChain, ProcessContext, Topology};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_crate_exports() {
        // Verify public API is accessible
        let params = Arc::new(ParameterStore::new());
        let _processor = EqProcessor::new(Arc::clone(&params));
        let _config = StreamConfig::default();
        let _state = ParameterState::capture(&params);
    }
}
