//! Skirmish Engine - headless runner for Skirmish encounters.
//!
//! This crate provides configuration loading, file-backed run history,
//! scripted strategy timelines and the session loop that plays runs back
//! to back, carrying granted traits from one run into the next.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod script;
pub mod session;
pub mod storage;

pub use config::{ConfigError, SkirmishConfig, CONFIG_FILE};
pub use script::{ScriptError, ScriptStep, StrategyScript};
pub use session::{RunSummary, Session};
pub use storage::FileStore;
