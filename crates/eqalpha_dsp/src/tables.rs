//! Stepped Control Tables
//!
//! Every frequency and gain control is a detented switch: the stored
//! parameter is an index into one of these tables.

/// Center frequencies (Hz) for the Low and Low-Mid bands
pub const LOW_FREQUENCIES: [f32; 7] = [40.0, 75.0, 150.0, 300.0, 600.0, 1200.0, 2400.0];

/// Center frequencies (Hz) for the High-Mid and High bands
pub const HIGH_FREQUENCIES: [f32; 7] = [800.0, 1500.0, 3000.0, 5000.0, 7000.0, 10000.0, 12500.0];

/// Gain steps in dB, shared by all bands
pub const GAIN_STEPS_DB: [f32; 9] = [-12.0, -9.0, -6.0, -3.0, 0.0, 3.0, 6.0, 9.0, 12.0];

/// Index of the 0 dB entry in [`GAIN_STEPS_DB`]
pub const UNITY_GAIN_INDEX: usize = 4;

/// Display labels matching [`LOW_FREQUENCIES`]
pub const LOW_FREQUENCY_LABELS: [&str; 7] = ["40", "75", "150", "300", "600", "1.2k", "2.4k"];

/// Display labels matching [`HIGH_FREQUENCIES`]
pub const HIGH_FREQUENCY_LABELS: [&str; 7] = ["800", "1.5k", "3k", "5k", "7k", "10k", "12.5k"];

/// Display labels matching [`GAIN_STEPS_DB`]
pub const GAIN_LABELS: [&str; 9] = ["-12", "-9", "-6", "-3", "0", "3", "6", "9", "12"];

/// Look up a table entry, clamping the index to the last valid slot
///
/// Out-of-range indices are never an error. An empty table yields 0.0.
#[inline]
pub fn lookup<const N: usize>(table: &[f32; N], index: usize) -> f32 {
    match N.checked_sub(1) {
        Some(last) => table[index.min(last)],
        None => 0.0,
    }
}

/// Convert a raw stored parameter value into a table index
///
/// Host automation delivers floats; negative and NaN values land on 0
/// because float-to-int `as` casts saturate.
#[inline]
pub fn index_from_raw(raw: f32) -> usize {
    raw as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_ascending() {
        for table in [&LOW_FREQUENCIES[..], &HIGH_FREQUENCIES[..], &GAIN_STEPS_DB[..]] {
            assert!(table.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_unity_index_is_zero_db() {
        assert_eq!(GAIN_STEPS_DB[UNITY_GAIN_INDEX], 0.0);
    }

    #[test]
    fn test_labels_match_tables() {
        assert_eq!(LOW_FREQUENCY_LABELS.len(), LOW_FREQUENCIES.len());
        assert_eq!(HIGH_FREQUENCY_LABELS.len(), HIGH_FREQUENCIES.len());
        assert_eq!(GAIN_LABELS.len(), GAIN_STEPS_DB.len());
    }

    #[test]
    fn test_lookup_clamps_to_last_entry() {
        assert_eq!(lookup(&LOW_FREQUENCIES, 6), 2400.0);
        assert_eq!(lookup(&LOW_FREQUENCIES, 7), 2400.0);
        assert_eq!(lookup(&GAIN_STEPS_DB, usize::MAX), 12.0);
    }

    #[test]
    fn test_lookup_empty_table() {
        let empty: [f32; 0] = [];
        assert_eq!(lookup(&empty, 0), 0.0);
        assert_eq!(lookup(&empty, 5), 0.0);
    }

    #[test]
    fn test_index_from_raw_saturates() {
        assert_eq!(index_from_raw(3.0), 3);
        assert_eq!(index_from_raw(3.9), 3);
        assert_eq!(index_from_raw(-2.0), 0);
        assert_eq!(index_from_raw(f32::NAN), 0);
        assert!(index_from_raw(1.0e12) > 6);
    }
}
