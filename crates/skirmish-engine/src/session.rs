//! Back-to-back runs with trait carry-over.
//!
//! Each run starts with the traits granted by the previous one, plays out
//! under the configured strategy script, then is resolved into a growth
//! result and prepended to the run history.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use skirmish_common::SkirmishResult;
use skirmish_gameplay::{
    ArenaPhysics, Battle, FastRandSource, GrowthResolver, GrowthResult, KeyValueStore,
    RandomSource, RunRecord, RunRecorder, SpawnRng, TelemetryRecord, TraitId,
};

use crate::config::SkirmishConfig;

/// Result of one finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Zero-based position in the session
    pub index: u32,
    /// Traits the agent started with
    pub carried_traits: Vec<TraitId>,
    /// Frozen telemetry
    pub telemetry: TelemetryRecord,
    /// Profile and grants
    pub growth: GrowthResult,
}

/// Plays configured runs against a run history.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    config: SkirmishConfig,
    recorder: RunRecorder<S>,
    resolver: GrowthResolver,
}

impl<S: KeyValueStore> Session<S> {
    /// Creates a session persisting into `store`.
    pub fn new(config: SkirmishConfig, store: S) -> Self {
        let recorder = RunRecorder::with_capacity(store, config.max_stored_runs);
        Self {
            config,
            recorder,
            resolver: GrowthResolver::new(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SkirmishConfig {
        &self.config
    }

    /// Run history.
    #[must_use]
    pub const fn recorder(&self) -> &RunRecorder<S> {
        &self.recorder
    }

    fn random_source(&self, index: u32) -> Box<dyn RandomSource> {
        match self.config.seed {
            Some(seed) => Box::new(SpawnRng::for_run(seed, index)),
            None => Box::new(FastRandSource::from_entropy()),
        }
    }

    /// Plays one run and records it.
    pub fn play_run(&mut self, index: u32) -> SkirmishResult<RunSummary> {
        let carried_traits = self.recorder.carried_traits();
        let balance = self.config.balance.clone();
        let physics = ArenaPhysics::new(balance.arena.width, balance.arena.height);
        let max_ticks = (balance.run_duration_secs * 1000.0 / self.config.tick_ms).ceil() as u64 + 1;

        let mut battle = Battle::new(
            balance,
            carried_traits.iter().copied(),
            Box::new(physics),
            self.random_source(index),
        );

        info!("Run {} starting", index + 1);
        let mut ticks = 0u64;
        while !battle.is_over() {
            let strategy = self.config.script.strategy_at(battle.timer().elapsed_secs());
            battle.set_strategy(strategy);
            battle.update(self.config.tick_ms);
            ticks += 1;
            if ticks > max_ticks {
                warn!("Run {} exceeded {} ticks, abandoning", index + 1, max_ticks);
                break;
            }
        }

        let telemetry = battle.finish();
        let growth = self.resolver.resolve(&telemetry);
        self.recorder
            .save_run(RunRecord::new(now_millis(), telemetry.clone(), &growth))?;

        info!(
            "Run {} {}: {:.1}s, {} kills, profile {}",
            index + 1,
            telemetry.run_result.as_str(),
            telemetry.run_duration_secs,
            telemetry.kills.total(),
            growth.profile.name
        );
        Ok(RunSummary {
            index,
            carried_traits,
            telemetry,
            growth,
        })
    }

    /// Plays every configured run in order.
    pub fn play_all(&mut self) -> SkirmishResult<Vec<RunSummary>> {
        (0..self.config.runs).map(|i| self.play_run(i)).collect()
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::StrategyScript;
    use skirmish_gameplay::{MemoryStore, RunResult, Strategy};

    fn short_config() -> SkirmishConfig {
        let mut config = SkirmishConfig::default();
        config.seed = Some(11);
        config.runs = 2;
        config.balance.run_duration_secs = 10.0;
        config
    }

    #[test]
    fn test_play_all_records_each_run() {
        let mut session = Session::new(short_config(), MemoryStore::new());
        let summaries = session.play_all().expect("play");
        assert_eq!(summaries.len(), 2);
        assert_eq!(session.recorder().all_runs().len(), 2);
        assert!(summaries[0].carried_traits.is_empty());
        for summary in &summaries {
            assert!(summary.telemetry.run_duration_secs <= 10.0);
        }
    }

    #[test]
    fn test_granted_traits_carry_into_next_run() {
        let mut config = short_config();
        config.script = StrategyScript::constant(Strategy::Guard);
        config.balance.spawning.waves[0].spawn_interval_ms = 600_000.0;

        let mut session = Session::new(config, MemoryStore::new());
        let first = session.play_run(0).expect("first run");
        assert_eq!(first.telemetry.run_result, RunResult::Victory);
        assert_eq!(first.growth.granted_traits, vec![TraitId::AdaptiveShield]);

        let second = session.play_run(1).expect("second run");
        assert_eq!(second.carried_traits, vec![TraitId::AdaptiveShield]);
    }

    #[test]
    fn test_history_capped() {
        let mut config = short_config();
        config.runs = 3;
        config.max_stored_runs = 2;
        config.balance.run_duration_secs = 2.0;

        let mut session = Session::new(config, MemoryStore::new());
        session.play_all().expect("play");
        let runs = session.recorder().all_runs();
        assert_eq!(runs.len(), 2);
    }
}
