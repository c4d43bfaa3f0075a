//! Scripted strategy timeline.
//!
//! Stands in for the player's strategy buttons when running headless: each
//! step selects a strategy from its start time until the next step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_gameplay::{Strategy, UnknownStrategy};

/// Errors from parsing a compact script.
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    /// Step is not of the form `secs:STRATEGY`
    #[error("malformed script step '{0}', expected <secs>:<STRATEGY>")]
    Malformed(String),

    /// Start time is not a non-negative number
    #[error("invalid start time in step '{0}'")]
    InvalidTime(String),

    /// Strategy name not recognised
    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),
}

/// One timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Run time at which the strategy is selected
    pub at_secs: f32,
    /// Strategy to select
    pub strategy: Strategy,
}

/// Ordered strategy timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyScript {
    steps: Vec<ScriptStep>,
}

impl Default for StrategyScript {
    fn default() -> Self {
        Self::new(vec![
            ScriptStep {
                at_secs: 0.0,
                strategy: Strategy::Engage,
            },
            ScriptStep {
                at_secs: 30.0,
                strategy: Strategy::Evade,
            },
            ScriptStep {
                at_secs: 60.0,
                strategy: Strategy::Burst,
            },
            ScriptStep {
                at_secs: 90.0,
                strategy: Strategy::Guard,
            },
        ])
    }
}

impl StrategyScript {
    /// Builds a timeline, ordering steps by start time.
    #[must_use]
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        Self { steps }
    }

    /// A single strategy for the whole run.
    #[must_use]
    pub fn constant(strategy: Strategy) -> Self {
        Self::new(vec![ScriptStep {
            at_secs: 0.0,
            strategy,
        }])
    }

    /// Parses `"0:ENGAGE,30:GUARD"`.
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();
        for raw in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (secs, name) = raw
                .split_once(':')
                .ok_or_else(|| ScriptError::Malformed(raw.to_string()))?;
            let at_secs: f32 = secs
                .trim()
                .parse()
                .map_err(|_| ScriptError::InvalidTime(raw.to_string()))?;
            if !at_secs.is_finite() || at_secs < 0.0 {
                return Err(ScriptError::InvalidTime(raw.to_string()));
            }
            let strategy = name.trim().parse::<Strategy>()?;
            steps.push(ScriptStep { at_secs, strategy });
        }
        Ok(Self::new(steps))
    }

    /// Steps in time order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Strategy selected at `elapsed_secs`. ENGAGE before the first step.
    #[must_use]
    pub fn strategy_at(&self, elapsed_secs: f32) -> Strategy {
        self.steps
            .iter()
            .take_while(|s| s.at_secs <= elapsed_secs)
            .last()
            .map_or(Strategy::Engage, |s| s.strategy)
    }
}
