//! # Skirmish
//!
//! Headless entry point: plays the configured runs and prints each run's
//! playstyle profile and trait grants.
//!
//! Usage: `skirmish [config.toml] [script]`, where `script` overrides the
//! configured strategy timeline, e.g. `"0:ENGAGE,45:EVADE,90:GUARD"`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skirmish_engine::{FileStore, Session, SkirmishConfig, StrategyScript, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("skirmish=info".parse()?))
        .init();

    info!("Skirmish starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let mut config = SkirmishConfig::load_from(&config_path);
    if let Some(script) = args.next() {
        config.script = StrategyScript::parse(&script).context("invalid strategy script")?;
    }
    config.validate();

    let store = FileStore::new(&config.data_dir);
    let mut session = Session::new(config, store);
    let summaries = session.play_all().context("session failed")?;

    for summary in &summaries {
        let profile = &summary.growth.profile;
        println!(
            "Run {}: {} in {:.1}s | {} (dodge {:.0}, aggression {:.0}, defense {:.0})",
            summary.index + 1,
            summary.telemetry.run_result.as_str(),
            summary.telemetry.run_duration_secs,
            profile.name,
            profile.dodge,
            profile.aggression,
            profile.defense
        );
        for line in &summary.growth.explanations {
            println!("  - {line}");
        }
    }

    let stats = session.recorder().cumulative_stats();
    info!(
        "History: {} runs, {} victories, {} kills, {:.1}s average",
        stats.total_runs, stats.victories, stats.total_kills, stats.average_duration_secs
    );

    info!("Skirmish shutdown complete");
    Ok(())
}
