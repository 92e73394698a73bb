//! Saturation Stage
//!
//! Drive-scaled tanh waveshaper that closes the chain:
//!
//! ```text
//! y = tanh(drive * x) / drive
//! ```
//!
//! Dividing by the drive keeps the small-signal slope at unity, so quiet
//! material passes nearly untouched while peaks are rounded off more as
//! drive increases. The stage is stateless; its only setting is captured
//! when coefficients are recomputed and handed to the chain by value.

/// Drive at or below this is treated as "off" (identity transform)
pub const MIN_ACTIVE_DRIVE: f32 = 0.001;

/// Upper end of the drive control
pub const MAX_DRIVE: f32 = 10.0;

/// Stateless tanh saturator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturation {
    drive: f32,
}

impl Saturation {
    /// Create a saturator; drive is clamped to `[0, 10]`, NaN becomes 0
    pub fn new(drive: f32) -> Self {
        let drive = if drive.is_nan() { 0.0 } else { drive.clamp(0.0, MAX_DRIVE) };
        Self { drive }
    }

    /// Identity stage (drive 0)
    pub fn off() -> Self {
        Self { drive: 0.0 }
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    /// Whether the stage changes the signal at all
    pub fn is_active(&self) -> bool {
        self.drive > MIN_ACTIVE_DRIVE
    }

    /// Shape a single sample
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, O(1) time.
    #[inline]
    pub fn process_sample(&self, sample: f32) -> f32 {
        saturate(sample, self.drive)
    }

    /// Shape every sample in place, regardless of channel layout
    #[inline]
    pub fn process_buffer(&self, buffer: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample = saturate(*sample, self.drive);
        }
    }
}

impl Default for Saturation {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[inline]
fn saturate(sample: f32, drive: f32) -> f32 {
    if drive > MIN_ACTIVE_DRIVE {
        (drive * sample).tanh() / drive
    } else {
        sample
    }
}
