//! Per-run behavioral telemetry.
//!
//! [`Telemetry`] accumulates counters while the run is live. Finalizing it
//! consumes the accumulator and yields an immutable [`TelemetryRecord`], which
//! is handed to the growth resolver and persisted with the run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::enemy::Archetype;
use crate::events::{Ability, CombatEvent};
use crate::strategy::Strategy;
use crate::timer::Countdown;

/// Health fraction at or below which the agent counts as in danger.
pub const DANGER_HEALTH_FRACTION: f32 = 0.3;

/// Default evade success window.
pub const DEFAULT_EVADE_SUCCESS_WINDOW_MS: f32 = 500.0;

/// How the run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    /// Survived until the timer ran out.
    #[default]
    Victory,
    /// The agent died.
    Defeat,
}

impl RunResult {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
        }
    }
}

/// Milliseconds spent in each strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyTimes {
    /// ENGAGE time
    pub engage_ms: f32,
    /// GUARD time
    pub guard_ms: f32,
    /// EVADE time
    pub evade_ms: f32,
    /// BURST time
    pub burst_ms: f32,
}

impl StrategyTimes {
    /// Time for one strategy.
    #[must_use]
    pub const fn get(&self, strategy: Strategy) -> f32 {
        match strategy {
            Strategy::Engage => self.engage_ms,
            Strategy::Guard => self.guard_ms,
            Strategy::Evade => self.evade_ms,
            Strategy::Burst => self.burst_ms,
        }
    }

    /// Adds time to one strategy.
    pub fn add(&mut self, strategy: Strategy, dt_ms: f32) {
        let slot = match strategy {
            Strategy::Engage => &mut self.engage_ms,
            Strategy::Guard => &mut self.guard_ms,
            Strategy::Evade => &mut self.evade_ms,
            Strategy::Burst => &mut self.burst_ms,
        };
        *slot += dt_ms.max(0.0);
    }

    /// Sum over all strategies.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.engage_ms + self.guard_ms + self.evade_ms + self.burst_ms
    }

    /// Share of total time for one strategy, in percent. Zero when no time was recorded.
    #[must_use]
    pub fn percent(&self, strategy: Strategy) -> f32 {
        let total = self.total();
        if total <= 0.0 {
            0.0
        } else {
            self.get(strategy) / total * 100.0
        }
    }
}

/// Kills bucketed by archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KillCounts {
    /// Rushers killed
    pub rusher: u32,
    /// Snipers killed
    pub sniper: u32,
    /// Elites killed
    pub elite: u32,
    /// Kills with a missing or unrecognised archetype
    pub unknown: u32,
}

impl KillCounts {
    /// Increments the bucket for `archetype`.
    pub fn record(&mut self, archetype: Option<Archetype>) {
        match archetype {
            Some(Archetype::Rusher) => self.rusher += 1,
            Some(Archetype::Sniper) => self.sniper += 1,
            Some(Archetype::Elite) => self.elite += 1,
            None => self.unknown += 1,
        }
    }

    /// Kills in one bucket.
    #[must_use]
    pub const fn get(&self, archetype: Option<Archetype>) -> u32 {
        match archetype {
            Some(Archetype::Rusher) => self.rusher,
            Some(Archetype::Sniper) => self.sniper,
            Some(Archetype::Elite) => self.elite,
            None => self.unknown,
        }
    }

    /// All kills.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.rusher + self.sniper + self.elite + self.unknown
    }
}

/// Counters and durations for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryRecord {
    /// Time per strategy
    pub strategy_time: StrategyTimes,
    /// Strategy switches
    pub strategy_switch_count: u32,
    /// Time spent at or below 30% health
    pub time_below_hp30_ms: f32,
    /// Hits taken
    pub hits_taken: u32,
    /// Total health lost
    pub damage_taken_total: f32,
    /// Evade dashes
    pub evade_count: u32,
    /// Evade dashes followed by no damage within the success window
    pub evade_success_count: u32,
    /// Total damage dealt
    pub damage_dealt_total: f32,
    /// Kills by archetype
    pub kills: KillCounts,
    /// BURST activations
    pub burst_activations: u32,
    /// Mean run time of sniper kills, in seconds
    pub sniper_kill_time_avg_secs: f32,
    /// Run length in seconds
    pub run_duration_secs: f32,
    /// Outcome
    pub run_result: RunResult,
}

impl TelemetryRecord {
    /// Percentage of evades that succeeded. Zero with no evades.
    #[must_use]
    pub fn evade_success_rate(&self) -> f32 {
        if self.evade_count == 0 {
            0.0
        } else {
            self.evade_success_count as f32 / self.evade_count as f32 * 100.0
        }
    }

    /// Share of time in `strategy`, in percent.
    #[must_use]
    pub fn strategy_percent(&self, strategy: Strategy) -> f32 {
        self.strategy_time.percent(strategy)
    }

    /// Run length in minutes.
    #[must_use]
    pub fn run_duration_minutes(&self) -> f32 {
        self.run_duration_secs / 60.0
    }

    /// `count` per minute of run time. Zero for a zero-length run.
    #[must_use]
    pub fn per_minute(&self, count: u32) -> f32 {
        let minutes = self.run_duration_minutes();
        if minutes <= 0.0 {
            0.0
        } else {
            count as f32 / minutes
        }
    }

    /// Percentage of the run spent at or below 30% health.
    #[must_use]
    pub fn danger_time_percent(&self) -> f32 {
        if self.run_duration_secs <= 0.0 {
            0.0
        } else {
            self.time_below_hp30_ms / (self.run_duration_secs * 1000.0) * 100.0
        }
    }
}

/// Live accumulator.
#[derive(Debug, Clone)]
pub struct Telemetry {
    record: TelemetryRecord,
    evade_probe: Countdown,
    evade_window_ms: f32,
    sniper_kill_times: Vec<f32>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    /// Empty accumulator with the default evade success window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_evade_window(DEFAULT_EVADE_SUCCESS_WINDOW_MS)
    }

    /// Empty accumulator with a custom evade success window.
    #[must_use]
    pub fn with_evade_window(evade_window_ms: f32) -> Self {
        Self {
            record: TelemetryRecord::default(),
            evade_probe: Countdown::idle(),
            evade_window_ms,
            sniper_kill_times: Vec::new(),
        }
    }

    /// Counters so far.
    #[must_use]
    pub const fn record(&self) -> &TelemetryRecord {
        &self.record
    }

    /// Whether an evade is waiting to be judged.
    #[must_use]
    pub const fn evade_pending(&self) -> bool {
        self.evade_probe.is_running()
    }

    /// Accumulates per-tick durations.
    pub fn record_tick(&mut self, strategy: Strategy, dt_ms: f32, health_fraction: f32) {
        self.record.strategy_time.add(strategy, dt_ms);
        if health_fraction <= DANGER_HEALTH_FRACTION {
            self.record.time_below_hp30_ms += dt_ms;
        }
        if self.evade_probe.tick(dt_ms) {
            self.record.evade_success_count += 1;
            debug!("Evade succeeded");
        }
    }

    /// Counts a strategy switch.
    pub fn record_strategy_change(&mut self, from: Strategy, to: Strategy) {
        self.record.strategy_switch_count += 1;
        debug!("Telemetry: {} -> {}", from, to);
    }

    /// Counts a hit on the agent. Fails any pending evade.
    pub fn record_damage_taken(&mut self, amount: f32) {
        self.record.hits_taken += 1;
        self.record.damage_taken_total += amount;
        if self.evade_probe.is_running() {
            self.evade_probe.cancel();
            debug!("Evade failed");
        }
    }

    /// Counts an evade dash and starts judging it.
    pub fn record_evade(&mut self) {
        self.record.evade_count += 1;
        self.evade_probe.start(self.evade_window_ms);
    }

    /// Adds dealt damage.
    pub fn record_damage_dealt(&mut self, amount: f32) {
        self.record.damage_dealt_total += amount;
    }

    /// Counts a kill. A missing archetype lands in the unknown bucket.
    pub fn record_kill(&mut self, archetype: Option<Archetype>, elapsed_secs: f32) {
        self.record.kills.record(archetype);
        if archetype == Some(Archetype::Sniper) {
            self.sniper_kill_times.push(elapsed_secs);
        }
    }

    /// Counts a BURST activation.
    pub fn record_burst_activation(&mut self) {
        self.record.burst_activations += 1;
    }

    /// Routes a combat event to the matching counter.
    pub fn apply_event(&mut self, event: &CombatEvent, elapsed_secs: f32) {
        match *event {
            CombatEvent::StrategyChanged { from, to } => self.record_strategy_change(from, to),
            CombatEvent::AbilityTriggered { ability } => match ability {
                Ability::EvadeDash => self.record_evade(),
                Ability::BurstActivated => self.record_burst_activation(),
                Ability::EngageDash => {}
            },
            CombatEvent::AgentDamaged { amount, .. } => self.record_damage_taken(amount),
            CombatEvent::EnemyDamaged { amount, .. } => self.record_damage_dealt(amount),
            CombatEvent::EnemyKilled { archetype, .. } => self.record_kill(archetype, elapsed_secs),
            CombatEvent::AgentDied
            | CombatEvent::AgentHealed { .. }
            | CombatEvent::EnemySpawned { .. } => {}
        }
    }

    /// Stamps duration and outcome and freezes the record.
    ///
    /// An evade still being judged at the end counts as successful.
    #[must_use]
    pub fn finalize_run(mut self, duration_secs: f32, result: RunResult) -> TelemetryRecord {
        if self.evade_probe.is_running() {
            self.record.evade_success_count += 1;
        }
        self.record.run_duration_secs = duration_secs.max(0.0);
        self.record.run_result = result;
        if !self.sniper_kill_times.is_empty() {
            self.record.sniper_kill_time_avg_secs =
                self.sniper_kill_times.iter().sum::<f32>() / self.sniper_kill_times.len() as f32;
        }
        self.record
    }
}
