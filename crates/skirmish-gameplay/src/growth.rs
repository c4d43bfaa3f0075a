//! Post-run growth resolution.
//!
//! A finalized [`TelemetryRecord`] is scored on three playstyle axes, named,
//! and turned into the trait grants carried into the next run.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::strategy::Strategy;
use crate::telemetry::TelemetryRecord;
use crate::traits::TraitId;

/// Axis score at which a playstyle counts as dominant.
pub const AXIS_THRESHOLD: f32 = 60.0;
/// Sniper deaths that earn the utility trait.
pub const SNIPER_DEATH_THRESHOLD: u32 = 3;

/// Scores are always within this range.
pub const SCORE_MIN: f32 = 0.0;
/// Upper score bound.
pub const SCORE_MAX: f32 = 100.0;

// ============================================================================
// Profile
// ============================================================================

/// Named playstyle classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileName {
    /// No dominant axis
    Balanced,
    /// Dodge only
    DodgeCounter,
    /// Aggression only
    AggroBurst,
    /// Defense only
    ShieldControl,
    /// Dodge and aggression
    Skirmisher,
    /// Dodge and defense
    Tactician,
    /// Aggression and defense
    Brawler,
    /// All three
    Master,
}

impl ProfileName {
    /// Classifies from which axes cleared the threshold.
    #[must_use]
    pub const fn classify(dodge: bool, aggression: bool, defense: bool) -> Self {
        match (dodge, aggression, defense) {
            (false, false, false) => Self::Balanced,
            (true, false, false) => Self::DodgeCounter,
            (false, true, false) => Self::AggroBurst,
            (false, false, true) => Self::ShieldControl,
            (true, true, false) => Self::Skirmisher,
            (true, false, true) => Self::Tactician,
            (false, true, true) => Self::Brawler,
            (true, true, true) => Self::Master,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::DodgeCounter => "Dodge-Counter",
            Self::AggroBurst => "Aggro-Burst",
            Self::ShieldControl => "Shield-Control",
            Self::Skirmisher => "Skirmisher",
            Self::Tactician => "Tactician",
            Self::Brawler => "Brawler",
            Self::Master => "Master",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three clamped axis scores plus the sniper death count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaystyleProfile {
    /// Evade frequency and quality
    pub dodge: f32,
    /// Burst usage and ENGAGE time
    pub aggression: f32,
    /// GUARD time minus time spent in danger
    pub defense: f32,
    /// Snipers killed during the run
    pub sniper_deaths: u32,
    /// Derived name
    pub name: ProfileName,
}

impl PlaystyleProfile {
    /// Whether dodge cleared the threshold.
    #[must_use]
    pub fn is_dodger(&self) -> bool {
        self.dodge >= AXIS_THRESHOLD
    }

    /// Whether aggression cleared the threshold.
    #[must_use]
    pub fn is_aggressive(&self) -> bool {
        self.aggression >= AXIS_THRESHOLD
    }

    /// Whether defense cleared the threshold.
    #[must_use]
    pub fn is_defensive(&self) -> bool {
        self.defense >= AXIS_THRESHOLD
    }
}

/// Outcome of growth resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    /// Scored profile
    pub profile: PlaystyleProfile,
    /// Traits granted for the next run, without duplicates
    pub granted_traits: Vec<TraitId>,
    /// One line per satisfied condition, for display only
    pub explanations: Vec<String>,
}

// ============================================================================
// Resolver
// ============================================================================

/// Turns run telemetry into a profile and trait grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthResolver;

impl GrowthResolver {
    /// Creates a resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Scores the three axes.
    #[must_use]
    pub fn profile(&self, record: &TelemetryRecord) -> PlaystyleProfile {
        let evades_per_minute = record.per_minute(record.evade_count);
        let dodge = 0.6 * record.evade_success_rate() + 0.4 * (evades_per_minute * 20.0);

        let bursts_per_minute = record.per_minute(record.burst_activations);
        let aggression =
            15.0 * bursts_per_minute + 0.5 * record.strategy_percent(Strategy::Engage);

        let defense = 0.7 * record.strategy_percent(Strategy::Guard)
            - 0.3 * record.danger_time_percent();

        let dodge = clamp_score(dodge);
        let aggression = clamp_score(aggression);
        let defense = clamp_score(defense);
        let name = ProfileName::classify(
            dodge >= AXIS_THRESHOLD,
            aggression >= AXIS_THRESHOLD,
            defense >= AXIS_THRESHOLD,
        );

        PlaystyleProfile {
            dodge,
            aggression,
            defense,
            sniper_deaths: record.kills.sniper,
            name,
        }
    }

    /// Scores, names and grants traits for a finished run.
    #[must_use]
    pub fn resolve(&self, record: &TelemetryRecord) -> GrowthResult {
        let profile = self.profile(record);
        let mut granted_traits = Vec::new();
        let mut explanations = Vec::new();

        if profile.is_dodger() {
            granted_traits.extend([TraitId::PhantomTrace, TraitId::ReflexBurst]);
            explanations.push(format!(
                "High dodge score ({:.0}): frequent, clean evades. Granted Phantom Trace and Reflex Burst.",
                profile.dodge
            ));
        }
        if profile.is_aggressive() {
            granted_traits.extend([TraitId::OverclockCharge, TraitId::BloodExchange]);
            explanations.push(format!(
                "High aggression score ({:.0}): relentless pressure. Granted Overclock Charge and Blood Exchange.",
                profile.aggression
            ));
        }
        if profile.is_defensive() {
            granted_traits.push(TraitId::AdaptiveShield);
            explanations.push(format!(
                "High defense score ({:.0}): steady guarding. Granted Adaptive Shield.",
                profile.defense
            ));
        }
        if profile.sniper_deaths >= SNIPER_DEATH_THRESHOLD {
            granted_traits.push(TraitId::ThreatRedirect);
            explanations.push(format!(
                "Eliminated {} snipers. Granted Threat Redirect.",
                profile.sniper_deaths
            ));
        }
        if explanations.is_empty() {
            explanations.push("No dominant playstyle this run. No traits granted.".to_string());
        }

        info!(
            "Growth: {} (dodge {:.0}, aggression {:.0}, defense {:.0}), {} trait(s)",
            profile.name,
            profile.dodge,
            profile.aggression,
            profile.defense,
            granted_traits.len()
        );

        GrowthResult {
            profile,
            granted_traits,
            explanations,
        }
    }
}

/// Rounds and clamps into `[0, 100]`. NaN maps to 0.
fn clamp_score(raw: f32) -> f32 {
    if raw.is_nan() {
        return SCORE_MIN;
    }
    raw.round().clamp(SCORE_MIN, SCORE_MAX)
}
