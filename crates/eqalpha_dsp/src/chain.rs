//! Four-Band Filter Chain
//!
//! Runs the bands in fixed order Low → Low-Mid → High-Mid → High, then the
//! saturation stage. Each channel owns its own filter state; all channels
//! share the same coefficients.
//!
//! # Real-time Safety
//!
//! Per-channel state is allocated in `configure()`. `apply()` and the
//! `process_*` methods never allocate, lock or panic.

use biquad::{Biquad, DirectForm2Transposed};

use crate::eq::{BandCoefficients, BandSlot, EqSnapshot, BAND_COUNT};
use crate::error::DspError;
use crate::processor::{AudioProcessor, ProcessContext};
use crate::saturation::Saturation;

/// Most channels a chain can be configured for
pub const MAX_CHANNELS: usize = 8;

/// Section outputs below this magnitude (about -300 dBFS) are flushed to zero
pub const DENORMAL_THRESHOLD: f32 = 1e-15;

/// Zero out values small enough to drift into subnormal range
#[inline]
fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}

/// Run one sample through a section, flushing its output and state
///
/// A decaying tail otherwise settles into subnormal floats, which are far
/// slower to compute on most CPUs.
#[inline]
fn run_flushed(section: &mut DirectForm2Transposed<f32>, input: f32) -> f32 {
    let output = section.run(input);
    section.s1 = flush_denormal(section.s1);
    section.s2 = flush_denormal(section.s2);
    flush_denormal(output)
}

/// A complete, internally consistent set of chain settings
///
/// Produced once per recomputation and swapped into the chain as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainUpdate {
    pub bands: [BandCoefficients; BAND_COUNT],
    /// Bypassed bands are skipped entirely, whatever their coefficients
    pub bypassed: [bool; BAND_COUNT],
    pub saturation: Saturation,
}

impl ChainUpdate {
    /// Design every band and capture the drive from one parameter snapshot
    pub fn design(snapshot: &EqSnapshot, sample_rate: f32) -> Self {
        let bands = BandSlot::ALL.map(|slot| {
            BandCoefficients::design(
                slot,
                &snapshot.bands[slot.index()],
                snapshot.proportional_q,
                sample_rate,
            )
        });
        let bypassed = BandSlot::ALL.map(|slot| snapshot.bands[slot.index()].bypass);

        Self {
            bands,
            bypassed,
            saturation: Saturation::new(snapshot.drive),
        }
    }
}

impl Default for ChainUpdate {
    /// Pass-through: unity sections, saturation off
    fn default() -> Self {
        Self {
            bands: [BandCoefficients::unity(); BAND_COUNT],
            bypassed: [false; BAND_COUNT],
            saturation: Saturation::off(),
        }
    }
}

// One section per band, for a single channel
type ChannelSections = [DirectForm2Transposed<f32>; BAND_COUNT];

/// The EQ signal chain
pub struct FilterChain {
    // DirectForm2Transposed: better numerical stability than DF1
    // Outer index is the channel
    sections: Vec<ChannelSections>,
    current: ChainUpdate,
    context: Option<ProcessContext>,
}

impl FilterChain {
    /// Create an unconfigured chain; processing is a no-op until
    /// [`FilterChain::configure`] succeeds
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            current: ChainUpdate::default(),
            context: None,
        }
    }

    /// (Re)initialize per-channel state for a stream
    ///
    /// Clears all filter history. Coefficients carry over unchanged, so the
    /// owner should follow up with [`FilterChain::apply`] when the sample
    /// rate changed.
    pub fn configure(&mut self, context: ProcessContext) -> Result<(), DspError> {
        context.validate()?;

        let current = &self.current;
        self.sections = (0..context.channels)
            .map(|_| {
                core::array::from_fn(|band| {
                    DirectForm2Transposed::<f32>::new(current.bands[band].coefficients)
                })
            })
            .collect();
        self.context = Some(context);
        Ok(())
    }

    /// Swap in a new set of coefficients, bypass flags and drive
    ///
    /// Filter history is kept, so a parameter tweak never clicks from a
    /// full reset.
    pub fn apply(&mut self, update: &ChainUpdate) {
        for channel in self.sections.iter_mut() {
            for (section, band) in channel.iter_mut().zip(update.bands.iter()) {
                section.update_coefficients(band.coefficients);
            }
        }
        self.current = *update;
    }

    /// Process planar audio in place, one slice per channel
    ///
    /// Skipped entirely when the channel count does not match the
    /// configuration or the slices differ in length.
    pub fn process_planar(&mut self, channels: &mut [&mut [f32]]) {
        if channels.is_empty() || channels.len() != self.sections.len() {
            return;
        }
        let frames = channels[0].len();
        if channels.iter().any(|channel| channel.len() != frames) {
            return;
        }

        for band in 0..BAND_COUNT {
            if self.current.bypassed[band] {
                continue;
            }
            for (channel, state) in channels.iter_mut().zip(self.sections.iter_mut()) {
                let section = &mut state[band];
                for sample in channel.iter_mut() {
                    *sample = run_flushed(section, *sample);
                }
            }
        }

        let saturation = self.current.saturation;
        for channel in channels.iter_mut() {
            saturation.process_buffer(channel);
        }
    }

    /// Process interleaved audio in place
    ///
    /// Buffer format: [L0, R0, L1, R1, ...]. Skipped when `channels` does
    /// not match the configuration or the buffer holds a partial frame.
    pub fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        if channels == 0 || channels != self.sections.len() || buffer.len() % channels != 0 {
            return;
        }

        for band in 0..BAND_COUNT {
            if self.current.bypassed[band] {
                continue;
            }
            for frame in buffer.chunks_exact_mut(channels) {
                for (sample, state) in frame.iter_mut().zip(self.sections.iter_mut()) {
                    *sample = run_flushed(&mut state[band], *sample);
                }
            }
        }

        self.current.saturation.process_buffer(buffer);
    }

    /// Reset filter state (clear delay lines), keeping coefficients
    pub fn reset(&mut self) {
        for channel in self.sections.iter_mut() {
            for section in channel.iter_mut() {
                section.reset_state();
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<ProcessContext> {
        self.context
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.context.map(|context| context.sample_rate)
    }

    /// Configured channel count (0 before `configure`)
    pub fn channels(&self) -> usize {
        self.sections.len()
    }

    /// Coefficients currently loaded for a band
    pub fn coefficients(&self, slot: BandSlot) -> &BandCoefficients {
        &self.current.bands[slot.index()]
    }

    pub fn is_bypassed(&self, slot: BandSlot) -> bool {
        self.current.bypassed[slot.index()]
    }

    pub fn saturation(&self) -> Saturation {
        self.current.saturation
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioProcessor for FilterChain {
    fn prepare(&mut self, context: ProcessContext) -> Result<(), DspError> {
        self.configure(context)
    }

    fn process(&mut self, buffer: &mut [f32], context: &ProcessContext) {
        self.process_interleaved(buffer, context.channels);
    }

    fn reset(&mut self) {
        FilterChain::reset(self);
    }

    fn name(&self) -> &'static str {
        "4-Band Filter Chain"
    }
}
