//! Runner configuration.
//!
//! Provides session parameters (seed, tick length, run count, storage) plus
//! the strategy script and the full encounter balance.
//! Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use skirmish_gameplay::BalanceConfig;

use crate::script::StrategyScript;

/// Configuration file name.
pub const CONFIG_FILE: &str = "skirmish.toml";

/// Errors from reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    /// File is not valid TOML for this schema
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be encoded
    #[error("config encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Session configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishConfig {
    // === Session ===
    /// Random seed (None = seeded from entropy)
    pub seed: Option<u64>,
    /// Simulation step in milliseconds
    pub tick_ms: f32,
    /// Runs to play back to back
    pub runs: u32,

    // === Storage ===
    /// Directory holding the run history
    pub data_dir: PathBuf,
    /// Runs kept in the history
    pub max_stored_runs: usize,

    // === Play ===
    /// Strategy timeline applied to every run
    pub script: StrategyScript,
    /// Encounter balance
    pub balance: BalanceConfig,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_ms: 16.0,
            runs: 3,

            data_dir: PathBuf::from("skirmish-data"),
            max_stored_runs: 20,

            script: StrategyScript::default(),
            balance: BalanceConfig::default(),
        }
    }
}

impl SkirmishConfig {
    /// Load configuration from `skirmish.toml` in the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration, reporting any failure.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut contents = String::new();
        fs::File::open(path)?.read_to_string(&mut contents)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Session
        if !self.tick_ms.is_finite() {
            self.tick_ms = 16.0;
        }
        self.tick_ms = self.tick_ms.clamp(1.0, 100.0);
        self.runs = self.runs.clamp(1, 100);

        // Storage
        self.max_stored_runs = self.max_stored_runs.clamp(1, 1000);

        self.balance.validate();
    }
}
