//! Parameter Store
//!
//! Holds the current value of every control as an atomic f32, keyed by a
//! stable identifier. The audio thread only ever reads; the control thread
//! writes and gets change notifications delivered to registered listeners.
//!
//! Each value is independently atomic. A snapshot taken while the control
//! thread is writing may mix old and new values; the next recomputation
//! picks up whatever it missed.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use eqalpha_dsp::tables::{
    index_from_raw, GAIN_LABELS, HIGH_FREQUENCY_LABELS, LOW_FREQUENCY_LABELS, UNITY_GAIN_INDEX,
};
use eqalpha_dsp::{BandParams, BandSlot, EqSnapshot, MAX_DRIVE};

use crate::error::{EngineError, EngineResult};

/// Number of parameters in the store
pub const PARAM_COUNT: usize = 20;

/// Stable parameter identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    LowFreq,
    LowGain,
    LowShelf,
    LowMute,
    LowBypass,
    LowMidFreq,
    LowMidGain,
    LowMidMute,
    LowMidBypass,
    HighMidFreq,
    HighMidGain,
    HighMidMute,
    HighMidBypass,
    HighFreq,
    HighGain,
    HighShelf,
    HighMute,
    HighBypass,
    SatDrive,
    QMode,
}

/// How a parameter's raw value is interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Index into a stepped table; stored raw, clamped when read
    Choice(&'static [&'static str]),
    /// On when the value is above 0.5
    Toggle,
    /// Continuous, clamped into range on write
    Float { min: f32, max: f32 },
}

impl ParamKind {
    fn normalize(self, value: f32) -> f32 {
        match self {
            ParamKind::Float { min, max } => value.clamp(min, max),
            ParamKind::Choice(_) | ParamKind::Toggle => value,
        }
    }
}

/// Parameter ids belonging to one band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandParamIds {
    pub frequency: ParamId,
    pub gain: ParamId,
    pub mute: ParamId,
    pub bypass: ParamId,
    pub shelf: Option<ParamId>,
}

impl ParamId {
    /// Every parameter, in storage order
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::LowFreq,
        ParamId::LowGain,
        ParamId::LowShelf,
        ParamId::LowMute,
        ParamId::LowBypass,
        ParamId::LowMidFreq,
        ParamId::LowMidGain,
        ParamId::LowMidMute,
        ParamId::LowMidBypass,
        ParamId::HighMidFreq,
        ParamId::HighMidGain,
        ParamId::HighMidMute,
        ParamId::HighMidBypass,
        ParamId::HighFreq,
        ParamId::HighGain,
        ParamId::HighShelf,
        ParamId::HighMute,
        ParamId::HighBypass,
        ParamId::SatDrive,
        ParamId::QMode,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable key used for persistence and automation
    pub fn key(self) -> &'static str {
        match self {
            ParamId::LowFreq => "LOW_FREQ",
            ParamId::LowGain => "LOW_GAIN",
            ParamId::LowShelf => "LOW_SHELF",
            ParamId::LowMute => "LOW_MUTE",
            ParamId::LowBypass => "LOW_BYPASS",
            ParamId::LowMidFreq => "LM_FREQ",
            ParamId::LowMidGain => "LM_GAIN",
            ParamId::LowMidMute => "LM_MUTE",
            ParamId::LowMidBypass => "LM_BYPASS",
            ParamId::HighMidFreq => "HM_FREQ",
            ParamId::HighMidGain => "HM_GAIN",
            ParamId::HighMidMute => "HM_MUTE",
            ParamId::HighMidBypass => "HM_BYPASS",
            ParamId::HighFreq => "HIGH_FREQ",
            ParamId::HighGain => "HIGH_GAIN",
            ParamId::HighShelf => "HIGH_SHELF",
            ParamId::HighMute => "HIGH_MUTE",
            ParamId::HighBypass => "HIGH_BYPASS",
            ParamId::SatDrive => "SAT_DRIVE",
            ParamId::QMode => "Q_MODE",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.key() == key)
    }

    /// Human-readable name for UI labels
    pub fn name(self) -> &'static str {
        match self {
            ParamId::LowFreq => "Low Freq",
            ParamId::LowGain => "Low Gain",
            ParamId::LowShelf => "Low Shelf",
            ParamId::LowMute => "Low Mute",
            ParamId::LowBypass => "Low Bypass",
            ParamId::LowMidFreq => "Low Mid Freq",
            ParamId::LowMidGain => "Low Mid Gain",
            ParamId::LowMidMute => "Low Mid Mute",
            ParamId::LowMidBypass => "Low Mid Bypass",
            ParamId::HighMidFreq => "High Mid Freq",
            ParamId::HighMidGain => "High Mid Gain",
            ParamId::HighMidMute => "High Mid Mute",
            ParamId::HighMidBypass => "High Mid Bypass",
            ParamId::HighFreq => "High Freq",
            ParamId::HighGain => "High Gain",
            ParamId::HighShelf => "High Shelf",
            ParamId::HighMute => "High Mute",
            ParamId::HighBypass => "High Bypass",
            ParamId::SatDrive => "Saturation Drive",
            ParamId::QMode => "Proportional Q",
        }
    }

    pub fn kind(self) -> ParamKind {
        match self {
            ParamId::LowFreq | ParamId::LowMidFreq => ParamKind::Choice(&LOW_FREQUENCY_LABELS),
            ParamId::HighMidFreq | ParamId::HighFreq => ParamKind::Choice(&HIGH_FREQUENCY_LABELS),
            ParamId::LowGain | ParamId::LowMidGain | ParamId::HighMidGain | ParamId::HighGain => {
                ParamKind::Choice(&GAIN_LABELS)
            }
            ParamId::SatDrive => ParamKind::Float {
                min: 0.0,
                max: MAX_DRIVE,
            },
            _ => ParamKind::Toggle,
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::LowFreq => 3.0,     // 300 Hz
            ParamId::LowMidFreq => 4.0,  // 600 Hz
            ParamId::HighMidFreq => 2.0, // 3 kHz
            ParamId::HighFreq => 3.0,    // 5 kHz
            ParamId::LowGain | ParamId::LowMidGain | ParamId::HighMidGain | ParamId::HighGain => {
                UNITY_GAIN_INDEX as f32
            }
            ParamId::SatDrive => 2.0,
            _ => 0.0,
        }
    }

    /// The ids that make up one band
    pub fn for_band(slot: BandSlot) -> BandParamIds {
        match slot {
            BandSlot::Low => BandParamIds {
                frequency: ParamId::LowFreq,
                gain: ParamId::LowGain,
                mute: ParamId::LowMute,
                bypass: ParamId::LowBypass,
                shelf: Some(ParamId::LowShelf),
            },
            BandSlot::LowMid => BandParamIds {
                frequency: ParamId::LowMidFreq,
                gain: ParamId::LowMidGain,
                mute: ParamId::LowMidMute,
                bypass: ParamId::LowMidBypass,
                shelf: None,
            },
            BandSlot::HighMid => BandParamIds {
                frequency: ParamId::HighMidFreq,
                gain: ParamId::HighMidGain,
                mute: ParamId::HighMidMute,
                bypass: ParamId::HighMidBypass,
                shelf: None,
            },
            BandSlot::High => BandParamIds {
                frequency: ParamId::HighFreq,
                gain: ParamId::HighGain,
                mute: ParamId::HighMute,
                bypass: ParamId::HighBypass,
                shelf: Some(ParamId::HighShelf),
            },
        }
    }
}

/// Receives change notifications from the store
///
/// Called on whichever thread wrote the value. Implementations must be
/// cheap and must not block; setting a flag is the intended use.
pub trait ParamListener: Send + Sync {
    fn parameter_changed(&self, id: ParamId, value: f32);
}

/// Handle returned by [`ParameterStore::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn ParamListener>)>,
}

/// Lock-free table of parameter values with change notification
pub struct ParameterStore {
    /// f32 values stored as bits
    /// Rust pattern: AtomicF32 doesn't exist, so we use bit-casting
    values: [AtomicU32; PARAM_COUNT],
    listeners: RwLock<Listeners>,
}

impl ParameterStore {
    /// Create a store holding every parameter's default
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(ParamId::ALL[i].default_value().to_bits())),
            listeners: RwLock::new(Listeners::default()),
        }
    }

    /// Current raw value
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    #[inline]
    pub fn get_bool(&self, id: ParamId) -> bool {
        self.get(id) > 0.5
    }

    /// Current value as a table index (unclamped; tables clamp on lookup)
    #[inline]
    pub fn get_index(&self, id: ParamId) -> usize {
        index_from_raw(self.get(id))
    }

    /// Write a value and notify listeners if it changed
    ///
    /// Returns whether the stored value changed. NaN is ignored; float
    /// parameters are clamped into range.
    pub fn set(&self, id: ParamId, value: f32) -> bool {
        if value.is_nan() {
            return false;
        }
        let value = id.kind().normalize(value);
        let bits = value.to_bits();
        let previous = self.values[id.index()].swap(bits, Ordering::Relaxed);
        if previous == bits {
            return false;
        }

        // Clone out of the lock so listeners may touch the store
        let listeners: Vec<Arc<dyn ParamListener>> = self
            .listeners
            .read()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.parameter_changed(id, value);
        }
        true
    }

    pub fn set_bool(&self, id: ParamId, on: bool) -> bool {
        self.set(id, if on { 1.0 } else { 0.0 })
    }

    /// Set a value by its persistence key
    pub fn set_by_key(&self, key: &str, value: f32) -> EngineResult<bool> {
        let id = ParamId::from_key(key)
            .ok_or_else(|| EngineError::UnknownParameter(key.to_string()))?;
        Ok(self.set(id, value))
    }

    /// Restore every parameter to its default, notifying as usual
    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.set(id, id.default_value());
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn ParamListener>) -> ListenerId {
        let mut listeners = self.listeners.write();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        debug!("Parameter listener {:?} registered", id);
        id
    }

    /// Returns whether a listener was removed
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        before != listeners.entries.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().entries.len()
    }

    /// Read everything the coefficient calculator needs
    ///
    /// Lock-free; safe on the audio thread.
    pub fn snapshot(&self) -> EqSnapshot {
        let bands = BandSlot::ALL.map(|slot| {
            let ids = ParamId::for_band(slot);
            BandParams {
                frequency_index: self.get_index(ids.frequency),
                gain_index: self.get_index(ids.gain),
                mute: self.get_bool(ids.mute),
                bypass: self.get_bool(ids.bypass),
                shelf: ids.shelf.map_or(false, |shelf| self.get_bool(shelf)),
            }
        });

        EqSnapshot {
            bands,
            proportional_q: self.get_bool(ParamId::QMode),
            drive: self.get(ParamId::SatDrive),
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Records every notification it receives
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(ParamId, f32)>>,
    }

    impl ParamListener for Recorder {
        fn parameter_changed(&self, id: ParamId, value: f32) {
            self.seen.lock().unwrap().push((id, value));
        }
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ParamListener for Counter {
        fn parameter_changed(&self, _id: ParamId, _value: f32) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_defaults_match_snapshot_default() {
        let store = ParameterStore::new();
        assert_eq!(store.snapshot(), EqSnapshot::default());
    }

    #[test]
    fn test_keys_round_trip() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_key(id.key()), Some(id));
        }
        assert_eq!(ParamId::from_key("NOPE"), None);
    }

    #[test]
    fn test_index_matches_storage_order() {
        for (i, id) in ParamId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_choice_defaults_within_tables() {
        for id in ParamId::ALL {
            if let ParamKind::Choice(labels) = id.kind() {
                assert!((id.default_value() as usize) < labels.len(), "{}", id.key());
            }
        }
    }

    #[test]
    fn test_set_and_get() {
        let store = ParameterStore::new();
        assert!(store.set(ParamId::LowGain, 7.0));
        assert_eq!(store.get(ParamId::LowGain), 7.0);
        assert_eq!(store.get_index(ParamId::LowGain), 7);

        assert!(store.set_bool(ParamId::HighShelf, true));
        assert!(store.get_bool(ParamId::HighShelf));
    }

    #[test]
    fn test_drive_clamped_and_nan_ignored() {
        let store = ParameterStore::new();
        store.set(ParamId::SatDrive, 50.0);
        assert_eq!(store.get(ParamId::SatDrive), 10.0);
        store.set(ParamId::SatDrive, -3.0);
        assert_eq!(store.get(ParamId::SatDrive), 0.0);
        assert!(!store.set(ParamId::SatDrive, f32::NAN));
        assert_eq!(store.get(ParamId::SatDrive), 0.0);
    }

    #[test]
    fn test_choice_stored_raw() {
        let store = ParameterStore::new();
        store.set(ParamId::HighFreq, 42.0);
        assert_eq!(store.get_index(ParamId::HighFreq), 42);
    }

    #[test]
    fn test_notifies_only_on_change() {
        let store = ParameterStore::new();
        let recorder = Arc::new(Recorder::default());
        store.add_listener(recorder.clone());

        assert!(store.set(ParamId::LowMute, 1.0));
        assert!(!store.set(ParamId::LowMute, 1.0));
        assert!(store.set(ParamId::QMode, 1.0));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(*seen, vec![(ParamId::LowMute, 1.0), (ParamId::QMode, 1.0)]);
        assert_eq!(seen[0].0.key(), "LOW_MUTE");
    }

    #[test]
    fn test_remove_listener() {
        let store = ParameterStore::new();
        let counter = Arc::new(Counter::default());
        let id = store.add_listener(counter.clone());
        assert_eq!(store.listener_count(), 1);

        store.set(ParamId::LowGain, 1.0);
        assert!(store.remove_listener(id));
        assert!(!store.remove_listener(id));
        store.set(ParamId::LowGain, 2.0);

        assert_eq!(counter.0.load(Ordering::Relaxed), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_set_by_key() {
        let store = ParameterStore::new();
        assert!(store.set_by_key("HM_GAIN", 8.0).unwrap());
        assert_eq!(store.get(ParamId::HighMidGain), 8.0);
        assert!(matches!(
            store.set_by_key("BOGUS", 1.0),
            Err(EngineError::UnknownParameter(key)) if key == "BOGUS"
        ));
    }

    #[test]
    fn test_reset_to_defaults() {
        let store = ParameterStore::new();
        store.set(ParamId::LowFreq, 6.0);
        store.set(ParamId::SatDrive, 9.0);
        store.set_bool(ParamId::HighBypass, true);

        store.reset_to_defaults();
        assert_eq!(store.snapshot(), EqSnapshot::default());
    }

    #[test]
    fn test_snapshot_maps_bands() {
        let store = ParameterStore::new();
        store.set(ParamId::LowMidFreq, 1.0);
        store.set(ParamId::LowMidGain, 0.0);
        store.set_bool(ParamId::LowMidMute, true);
        store.set_bool(ParamId::HighBypass, true);
        store.set_bool(ParamId::LowShelf, true);
        store.set_bool(ParamId::QMode, true);
        store.set(ParamId::SatDrive, 0.5);

        let snapshot = store.snapshot();
        let low_mid = snapshot.bands[BandSlot::LowMid.index()];
        assert_eq!(low_mid.frequency_index, 1);
        assert_eq!(low_mid.gain_index, 0);
        assert!(low_mid.mute);
        assert!(!low_mid.shelf);
        assert!(snapshot.bands[BandSlot::High.index()].bypass);
        assert!(snapshot.bands[BandSlot::Low.index()].shelf);
        assert!(snapshot.proportional_q);
        assert_eq!(snapshot.drive, 0.5);
    }

    #[test]
    fn test_mid_bands_have_no_shelf() {
        assert_eq!(ParamId::for_band(BandSlot::LowMid).shelf, None);
        assert_eq!(ParamId::for_band(BandSlot::HighMid).shelf, None);
        assert_eq!(ParamId::for_band(BandSlot::High).shelf, Some(ParamId::HighShelf));
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let store = Arc::new(ParameterStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    store.set(ParamId::LowGain, (i % 9) as f32);
                    store.set(ParamId::SatDrive, (i % 11) as f32);
                }
            })
        };

        for _ in 0..1000 {
            let snapshot = store.snapshot();
            assert!(snapshot.bands[0].gain_index < 9);
            assert!((0.0..=10.0).contains(&snapshot.drive));
        }
        writer.join().unwrap();
    }
}
