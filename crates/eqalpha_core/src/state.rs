//! Parameter State Persistence
//!
//! Saves and restores the parameter store as a small JSON document keyed
//! by parameter key.
//!
//! # Storage Locations
//! - Linux: `~/.config/eqalpha/state.json`
//! - Windows: `%APPDATA%\eqalpha\eqalpha\config\state.json`
//! - macOS: `~/Library/Application Support/com.eqalpha.eqalpha/state.json`

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::params::{ParamId, ParameterStore};

/// Tag identifying a saved EQAlpha state document
pub const STATE_FORMAT: &str = "EQAlpha3";

/// Current document version
pub const STATE_VERSION: u32 = 1;

/// Serializable copy of every parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterState {
    pub format: String,
    #[serde(default)]
    pub version: u32,
    pub values: BTreeMap<String, f32>,
}

impl ParameterState {
    /// Read every parameter from the store
    pub fn capture(store: &ParameterStore) -> Self {
        let values = ParamId::ALL
            .iter()
            .map(|&id| (id.key().to_string(), store.get(id)))
            .collect();

        Self {
            format: STATE_FORMAT.to_string(),
            version: STATE_VERSION,
            values,
        }
    }

    /// Write the saved values into the store
    ///
    /// Unknown keys are skipped with a warning and missing keys keep their
    /// current value. Changes notify listeners as any other write would.
    /// Returns the number of values that changed.
    pub fn restore(&self, store: &ParameterStore) -> EngineResult<usize> {
        if self.format != STATE_FORMAT {
            return Err(EngineError::StateFormat {
                expected: STATE_FORMAT.to_string(),
                found: self.format.clone(),
            });
        }

        let mut changed = 0;
        for (key, &value) in &self.values {
            match store.set_by_key(key, value) {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(e) => warn!("Ignoring saved value: {}", e),
            }
        }
        Ok(changed)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from(path: &Path) -> EngineResult<Self> {
        let file = fs::File::open(path)?;
        let state = serde_json::from_reader(file)?;
        info!("State loaded from {:?}", path);
        Ok(state)
    }

    pub fn save_to(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;

        info!("State saved to {:?}", path);
        Ok(())
    }

    /// Platform-specific location of the saved state
    pub fn default_path() -> EngineResult<PathBuf> {
        ProjectDirs::from("com", "eqalpha", "eqalpha")
            .map(|proj| proj.config_dir().join("state.json"))
            .ok_or(EngineError::NoStateDirectory)
    }

    /// Load from the default location, or capture defaults if missing/corrupt
    pub fn load_or_default() -> Self {
        match Self::default_path().and_then(|path| Self::load_from(&path)) {
            Ok(state) => state,
            Err(e) => {
                warn!("Using default parameter state: {}", e);
                Self::capture(&ParameterStore::new())
            }
        }
    }

    /// Save to the default location
    pub fn save(&self) -> EngineResult<()> {
        self.save_to(&Self::default_path()?)
    }
}

impl ParameterStore {
    pub fn to_state(&self) -> ParameterState {
        ParameterState::capture(self)
    }

    pub fn apply_state(&self, state: &ParameterState) -> EngineResult<usize> {
        state.restore(self)
    }
}
