//! Persistent traits and the modifiers they grant.
//!
//! Traits are carried from one run to the next. Each active trait contributes
//! to a [`TraitModifiers`] struct which is recomputed from the active set on
//! every change, so stacking order never matters.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Broad grouping used when describing a trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitCategory {
    /// Reduces incoming damage.
    Defensive,
    /// Increases outgoing damage or sustain.
    Offensive,
    /// Changes movement.
    Mobility,
    /// Changes targeting or other behavior.
    Utility,
}

/// Identifier of one catalogue trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraitId {
    /// Damage reduction during the post-evade window.
    #[serde(rename = "T1_PHANTOM_TRACE")]
    PhantomTrace,
    /// First attack in the post-evade window hits harder.
    #[serde(rename = "T2_REFLEX_BURST")]
    ReflexBurst,
    /// Longer ENGAGE dash.
    #[serde(rename = "T3_OVERCLOCK_CHARGE")]
    OverclockCharge,
    /// Lifesteal on connecting attacks.
    #[serde(rename = "T4_BLOOD_EXCHANGE")]
    BloodExchange,
    /// Stronger GUARD reduction.
    #[serde(rename = "T5_ADAPTIVE_SHIELD")]
    AdaptiveShield,
    /// Snipers rank higher in threat evaluation.
    #[serde(rename = "T6_THREAT_REDIRECT")]
    ThreatRedirect,
}

impl TraitId {
    /// Every trait in catalogue order.
    pub const ALL: [TraitId; 6] = [
        TraitId::PhantomTrace,
        TraitId::ReflexBurst,
        TraitId::OverclockCharge,
        TraitId::BloodExchange,
        TraitId::AdaptiveShield,
        TraitId::ThreatRedirect,
    ];

    /// Persisted identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhantomTrace => "T1_PHANTOM_TRACE",
            Self::ReflexBurst => "T2_REFLEX_BURST",
            Self::OverclockCharge => "T3_OVERCLOCK_CHARGE",
            Self::BloodExchange => "T4_BLOOD_EXCHANGE",
            Self::AdaptiveShield => "T5_ADAPTIVE_SHIELD",
            Self::ThreatRedirect => "T6_THREAT_REDIRECT",
        }
    }

    /// Catalogue entry for this trait.
    #[must_use]
    pub fn definition(self) -> &'static TraitDefinition {
        &CATALOGUE[self as usize]
    }
}

impl fmt::Display for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no catalogue trait.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trait id '{0}'")]
pub struct UnknownTrait(pub String);

impl FromStr for TraitId {
    type Err = UnknownTrait;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraitId::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTrait(s.to_string()))
    }
}

/// Immutable catalogue entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDefinition {
    /// Identifier
    pub id: TraitId,
    /// Display name
    pub name: &'static str,
    /// One-line effect description
    pub description: &'static str,
    /// Category
    pub category: TraitCategory,
}

/// The fixed six-entry catalogue, indexed by `TraitId as usize`.
pub static CATALOGUE: [TraitDefinition; 6] = [
    TraitDefinition {
        id: TraitId::PhantomTrace,
        name: "Phantom Trace",
        description: "Take 50% less damage for 0.8s after an evade",
        category: TraitCategory::Defensive,
    },
    TraitDefinition {
        id: TraitId::ReflexBurst,
        name: "Reflex Burst",
        description: "First attack within 0.8s after an evade deals +40% damage",
        category: TraitCategory::Offensive,
    },
    TraitDefinition {
        id: TraitId::OverclockCharge,
        name: "Overclock Charge",
        description: "Engage dash covers 25% more distance",
        category: TraitCategory::Offensive,
    },
    TraitDefinition {
        id: TraitId::BloodExchange,
        name: "Blood Exchange",
        description: "Heal for 3% of damage dealt",
        category: TraitCategory::Offensive,
    },
    TraitDefinition {
        id: TraitId::AdaptiveShield,
        name: "Adaptive Shield",
        description: "Guard reduces an additional 10% of incoming damage",
        category: TraitCategory::Defensive,
    },
    TraitDefinition {
        id: TraitId::ThreatRedirect,
        name: "Threat Redirect",
        description: "Snipers are prioritised as targets",
        category: TraitCategory::Utility,
    },
];

/// Catalogue entries in a category.
#[must_use]
pub fn traits_in_category(category: TraitCategory) -> Vec<&'static TraitDefinition> {
    CATALOGUE.iter().filter(|t| t.category == category).collect()
}

/// Parses persisted identifiers, skipping unknown ones with a warning.
#[must_use]
pub fn parse_trait_ids<S: AsRef<str>>(ids: &[S]) -> Vec<TraitId> {
    ids.iter()
        .filter_map(|raw| match raw.as_ref().parse::<TraitId>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Skipping stored trait: {}", e);
                None
            }
        })
        .collect()
}

// ============================================================================
// Modifiers
// ============================================================================

/// Numeric effect of the active trait set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitModifiers {
    /// Extra reduction while the post-evade window is open.
    pub post_evade_reduction: f32,
    /// Extra multiplier for the first connecting attack in the window.
    pub reflex_damage_bonus: f32,
    /// Fractional increase to the ENGAGE dash speed.
    pub dash_distance_bonus: f32,
    /// Fraction of applied damage healed on hit.
    pub lifesteal_fraction: f32,
    /// Extra GUARD reduction.
    pub guard_reduction_bonus: f32,
    /// Threat weight applied to snipers.
    pub sniper_threat_weight: f32,
}

impl Default for TraitModifiers {
    fn default() -> Self {
        Self {
            post_evade_reduction: 0.0,
            reflex_damage_bonus: 0.0,
            dash_distance_bonus: 0.0,
            lifesteal_fraction: 0.0,
            guard_reduction_bonus: 0.0,
            sniper_threat_weight: 1.0,
        }
    }
}

impl TraitModifiers {
    /// Accumulates the modifiers of every trait in `traits`.
    #[must_use]
    pub fn from_traits<'a>(traits: impl IntoIterator<Item = &'a TraitId>) -> Self {
        let mut m = Self::default();
        for t in traits {
            match t {
                TraitId::PhantomTrace => m.post_evade_reduction += 0.5,
                TraitId::ReflexBurst => m.reflex_damage_bonus += 0.4,
                TraitId::OverclockCharge => m.dash_distance_bonus += 0.25,
                TraitId::BloodExchange => m.lifesteal_fraction += 0.03,
                TraitId::AdaptiveShield => m.guard_reduction_bonus += 0.1,
                TraitId::ThreatRedirect => m.sniper_threat_weight *= 1.5,
            }
        }
        m
    }
}

/// Set of active traits with cached modifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitSet {
    active: BTreeSet<TraitId>,
    modifiers: TraitModifiers,
}

impl TraitSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seeded from carried-over traits.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = TraitId>) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.apply(id);
        }
        set
    }

    /// Activates a trait. Returns `false` if it was already active.
    pub fn apply(&mut self, id: TraitId) -> bool {
        if !self.active.insert(id) {
            debug!("Trait {} already active", id);
            return false;
        }
        self.modifiers = TraitModifiers::from_traits(&self.active);
        debug!("Trait {} applied", id);
        true
    }

    /// Deactivates a trait. Returns `false` if it was not active.
    pub fn remove(&mut self, id: TraitId) -> bool {
        if !self.active.remove(&id) {
            return false;
        }
        self.modifiers = TraitModifiers::from_traits(&self.active);
        debug!("Trait {} removed", id);
        true
    }

    /// Whether `id` is active.
    #[must_use]
    pub fn contains(&self, id: TraitId) -> bool {
        self.active.contains(&id)
    }

    /// Current modifiers.
    #[must_use]
    pub const fn modifiers(&self) -> &TraitModifiers {
        &self.modifiers
    }

    /// Active traits in catalogue order.
    pub fn iter(&self) -> impl Iterator<Item = TraitId> + '_ {
        self.active.iter().copied()
    }

    /// Number of active traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no trait is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
