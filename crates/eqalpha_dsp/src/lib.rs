//! EQAlpha DSP - Digital Signal Processing Module
//!
//! This crate provides the audio processing core for EQAlpha, including:
//! - Band coefficient calculator (stepped controls → BiQuad coefficients)
//! - 4-band filter chain with per-band bypass
//! - tanh saturation stage
//! - Zero-allocation processing path
//!
//! # Architecture
//!
//! ```text
//! EqSnapshot ──design──▶ ChainUpdate ──apply──▶ FilterChain
//!                                                  │
//!   input ─▶ Low ─▶ Low-Mid ─▶ High-Mid ─▶ High ─▶ Saturation ─▶ output
//! ```
//!
//! The DSP chain follows a strict "no allocation in audio callback" rule.
//! Coefficients are swapped in as a complete set between buffers.

mod chain;
mod eq;
mod error;
mod processor;
mod saturation;
pub mod tables;

pub use chain::{ChainUpdate, FilterChain, DENORMAL_THRESHOLD, MAX_CHANNELS};
pub use eq::{
    band_q, db_to_gain, BandCoefficients, BandParams, BandSlot, EqSnapshot, Topology, BAND_COUNT,
    FIXED_Q, HIGH_SHELF_FREQUENCY_SCALE, MAX_Q, MIN_Q,
};
pub use error::DspError;
pub use processor::{AudioProcessor, ProcessContext};
pub use saturation::{Saturation, MAX_DRIVE, MIN_ACTIVE_DRIVE};
