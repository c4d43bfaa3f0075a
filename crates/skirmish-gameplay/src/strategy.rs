//! Player-selectable combat strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four high-level combat modes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Close in on the primary threat and dash-attack it.
    #[default]
    Engage,
    /// Hold ground with damage reduction, retreat when crowded.
    Guard,
    /// Keep distance, dash away with i-frames, counter-attack afterwards.
    Evade,
    /// Short window of faster, stronger attacks followed by fatigue.
    Burst,
}

impl Strategy {
    /// All strategies in display order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Engage,
        Strategy::Guard,
        Strategy::Evade,
        Strategy::Burst,
    ];

    /// Upper-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Engage => "ENGAGE",
            Self::Guard => "GUARD",
            Self::Evade => "EVADE",
            Self::Burst => "BURST",
        }
    }

    /// Stable index into per-strategy arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Engage => 0,
            Self::Guard => 1,
            Self::Evade => 2,
            Self::Burst => 3,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENGAGE" => Ok(Self::Engage),
            "GUARD" => Ok(Self::Guard),
            "EVADE" => Ok(Self::Evade),
            "BURST" => Ok(Self::Burst),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_case_insensitive() {
        assert_eq!("guard".parse::<Strategy>(), Ok(Strategy::Guard));
        assert_eq!(" Burst ".parse::<Strategy>(), Ok(Strategy::Burst));
        assert!("dance".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_indices_unique() {
        let mut seen = [false; 4];
        for s in Strategy::ALL {
            assert!(!seen[s.index()]);
            seen[s.index()] = true;
        }
    }

    #[test]
    fn test_strategy_serde_uses_upper_case() {
        let json = serde_json::to_string(&Strategy::Evade).expect("serialize");
        assert_eq!(json, "\"EVADE\"");
    }
}
