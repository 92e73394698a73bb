//! Band Coefficient Calculator
//!
//! Maps one band's stepped controls onto a BiQuad coefficient set.
//! Formulas follow the RBJ (Robert Bristow-Johnson) Audio EQ Cookbook,
//! taking a linear gain factor and using `A = sqrt(gain)`.
//!
//! Every function here is total and allocation-free, so it can run at the
//! top of an audio callback.

use std::f64::consts::PI;

use biquad::{Coefficients, Q_BUTTERWORTH_F32};

use crate::tables::{lookup, GAIN_STEPS_DB, HIGH_FREQUENCIES, LOW_FREQUENCIES, UNITY_GAIN_INDEX};

/// Number of bands in the chain
pub const BAND_COUNT: usize = 4;

/// Q used when proportional-Q mode is off
pub const FIXED_Q: f32 = 1.5;

/// Lower bound for proportional Q
pub const MIN_Q: f32 = 0.7;

/// Upper bound for proportional Q
pub const MAX_Q: f32 = 2.2;

/// The High band's shelf is designed this far above its nominal frequency
/// so the shelf knee lines up with the bell at the same switch position.
pub const HIGH_SHELF_FREQUENCY_SCALE: f32 = 1.3;

/// Design frequencies are capped to this fraction of the sample rate
pub const MAX_DESIGN_FREQUENCY_RATIO: f32 = 0.49;

/// Position of a band in the chain, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandSlot {
    Low,
    LowMid,
    HighMid,
    High,
}

impl BandSlot {
    /// All bands in processing order
    pub const ALL: [BandSlot; BAND_COUNT] = [
        BandSlot::Low,
        BandSlot::LowMid,
        BandSlot::HighMid,
        BandSlot::High,
    ];

    pub fn index(self) -> usize {
        match self {
            BandSlot::Low => 0,
            BandSlot::LowMid => 1,
            BandSlot::HighMid => 2,
            BandSlot::High => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BandSlot::Low => "Low",
            BandSlot::LowMid => "Low Mid",
            BandSlot::HighMid => "High Mid",
            BandSlot::High => "High",
        }
    }

    /// Frequency table the band's switch indexes into
    pub fn frequencies(self) -> &'static [f32; 7] {
        match self {
            BandSlot::Low | BandSlot::LowMid => &LOW_FREQUENCIES,
            BandSlot::HighMid | BandSlot::High => &HIGH_FREQUENCIES,
        }
    }

    /// Shelf topology for the outer bands; the mid bands have none
    pub fn shelf(self) -> Option<Topology> {
        match self {
            BandSlot::Low => Some(Topology::LowShelf),
            BandSlot::High => Some(Topology::HighShelf),
            BandSlot::LowMid | BandSlot::HighMid => None,
        }
    }
}

/// Stepped controls for a single band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandParams {
    pub frequency_index: usize,
    pub gain_index: usize,
    pub mute: bool,
    pub bypass: bool,
    /// Ignored by bands without a shelf
    pub shelf: bool,
}

impl BandParams {
    pub fn new(frequency_index: usize, gain_index: usize) -> Self {
        Self {
            frequency_index,
            gain_index,
            mute: false,
            bypass: false,
            shelf: false,
        }
    }

    /// Gain in dB after mute is applied (muted bands sit at 0 dB)
    pub fn effective_gain_db(&self) -> f32 {
        if self.mute {
            0.0
        } else {
            lookup(&GAIN_STEPS_DB, self.gain_index)
        }
    }
}

impl Default for BandParams {
    fn default() -> Self {
        Self::new(0, UNITY_GAIN_INDEX)
    }
}

/// Everything the calculator needs from the parameter store, read once
/// per recomputation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqSnapshot {
    pub bands: [BandParams; BAND_COUNT],
    pub proportional_q: bool,
    pub drive: f32,
}

impl Default for EqSnapshot {
    fn default() -> Self {
        // Power-on switch positions: 300 Hz, 600 Hz, 3 kHz, 5 kHz, all flat
        Self {
            bands: [
                BandParams::new(3, UNITY_GAIN_INDEX),
                BandParams::new(4, UNITY_GAIN_INDEX),
                BandParams::new(2, UNITY_GAIN_INDEX),
                BandParams::new(3, UNITY_GAIN_INDEX),
            ],
            proportional_q: false,
            drive: 2.0,
        }
    }
}

/// Convert dB gain to linear amplitude
/// Formula: amplitude = 10^(dB/20)
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Q for a band given its effective gain
///
/// Proportional mode narrows the bell as the boost/cut grows.
#[inline]
pub fn band_q(gain_db: f32, proportional: bool) -> f32 {
    if proportional {
        (1.0 + 0.2 * gain_db.abs()).clamp(MIN_Q, MAX_Q)
    } else {
        FIXED_Q
    }
}

/// Closed set of second-order topologies the EQ can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Unity magnitude, phase only (bypassed bands)
    AllPass,
    Peak,
    LowShelf,
    HighShelf,
}

impl Topology {
    /// Design normalized (`a0 = 1`) coefficients
    ///
    /// `gain` is linear amplitude and is ignored by [`Topology::AllPass`].
    /// Intermediate math runs in f64 so narrow low-frequency bells keep
    /// their shape at high sample rates.
    pub fn design(self, sample_rate: f32, frequency: f32, q: f32, gain: f32) -> Coefficients<f32> {
        let omega = 2.0 * PI * frequency as f64 / sample_rate as f64;
        let (sin_omega, cos_omega) = omega.sin_cos();
        let q = q as f64;
        let a = (gain.max(0.0) as f64).sqrt();

        let (b0, b1, b2, a0, a1, a2) = match self {
            Topology::AllPass => {
                let alpha = sin_omega / (2.0 * q);
                (
                    1.0 - alpha,
                    -2.0 * cos_omega,
                    1.0 + alpha,
                    1.0 + alpha,
                    -2.0 * cos_omega,
                    1.0 - alpha,
                )
            }
            Topology::Peak => {
                let alpha = sin_omega / (2.0 * q);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_omega,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_omega,
                    1.0 - alpha / a,
                )
            }
            Topology::LowShelf => {
                let beta = sin_omega * a.sqrt() / q;
                let a_minus_cos = (a - 1.0) * cos_omega;
                (
                    a * ((a + 1.0) - a_minus_cos + beta),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - a_minus_cos - beta),
                    (a + 1.0) + a_minus_cos + beta,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + a_minus_cos - beta,
                )
            }
            Topology::HighShelf => {
                let beta = sin_omega * a.sqrt() / q;
                let a_minus_cos = (a - 1.0) * cos_omega;
                (
                    a * ((a + 1.0) + a_minus_cos + beta),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + a_minus_cos - beta),
                    (a + 1.0) - a_minus_cos + beta,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - a_minus_cos - beta,
                )
            }
        };

        Coefficients {
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
        }
    }
}

/// One band's designed filter plus the values it was designed from
#[derive(Debug, Clone, Copy)]
pub struct BandCoefficients {
    pub topology: Topology,
    /// Frequency actually handed to the formula (after shelf offset and cap)
    pub frequency: f32,
    pub q: f32,
    /// Linear amplitude
    pub gain: f32,
    pub coefficients: Coefficients<f32>,
}

impl BandCoefficients {
    /// Pass-through section used before the first design
    pub fn unity() -> Self {
        Self {
            topology: Topology::Peak,
            frequency: 0.0,
            q: FIXED_Q,
            gain: 1.0,
            coefficients: Coefficients {
                a1: 0.0,
                a2: 0.0,
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
            },
        }
    }

    /// Design the coefficient set for one band
    ///
    /// Topology priority: bypass → all-pass, shelf flag on a shelf-capable
    /// band → shelf, otherwise peak. `sample_rate` must be positive, which
    /// the chain guarantees by validating it in `configure`.
    pub fn design(slot: BandSlot, params: &BandParams, proportional_q: bool, sample_rate: f32) -> Self {
        let nominal = lookup(slot.frequencies(), params.frequency_index);
        let gain_db = params.effective_gain_db();
        let q = band_q(gain_db, proportional_q);
        let gain = db_to_gain(gain_db);

        let (topology, frequency, q) = if params.bypass {
            (Topology::AllPass, nominal, Q_BUTTERWORTH_F32)
        } else {
            match slot.shelf() {
                Some(Topology::HighShelf) if params.shelf => {
                    (Topology::HighShelf, nominal * HIGH_SHELF_FREQUENCY_SCALE, q)
                }
                Some(shelf) if params.shelf => (shelf, nominal, q),
                _ => (Topology::Peak, nominal, q),
            }
        };

        let frequency = frequency.min(sample_rate * MAX_DESIGN_FREQUENCY_RATIO);

        Self {
            topology,
            frequency,
            q,
            gain,
            coefficients: topology.design(sample_rate, frequency, q, gain),
        }
    }

    /// Magnitude response in dB at `frequency`
    ///
    /// Evaluates |H(e^jω)| directly from the coefficients.
    pub fn magnitude_db(&self, frequency: f32, sample_rate: f32) -> f32 {
        let c = &self.coefficients;
        let omega = 2.0 * PI * frequency as f64 / sample_rate as f64;
        let (s1, c1) = omega.sin_cos();
        let (s2, c2) = (2.0 * omega).sin_cos();

        let num_re = c.b0 as f64 + c.b1 as f64 * c1 + c.b2 as f64 * c2;
        let num_im = -(c.b1 as f64 * s1 + c.b2 as f64 * s2);
        let den_re = 1.0 + c.a1 as f64 * c1 + c.a2 as f64 * c2;
        let den_im = -(c.a1 as f64 * s1 + c.a2 as f64 * s2);

        let magnitude = ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt();
        (20.0 * magnitude.log10()) as f32
    }
}

// biquad's Coefficients has no PartialEq, so compare field by field
impl PartialEq for BandCoefficients {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.coefficients, &other.coefficients);
        self.topology == other.topology
            && self.frequency == other.frequency
            && self.q == other.q
            && self.gain == other.gain
            && a.b0 == b.b0
            && a.b1 == b.b1
            && a.b2 == b.b2
            && a.a1 == b.a1
            && a.a2 == b.a2
    }
}
