//! Balance configuration.
//!
//! Every tunable number of an encounter lives here:
//! - Agent base stats
//! - Per-strategy ability parameters
//! - Enemy archetype stat blocks
//! - Wave schedule and spawn chances
//! - Environmental hazards
//!
//! All durations are milliseconds unless the field name says otherwise.
//! Distances are world units, speeds are units per second.

use serde::{Deserialize, Serialize};

use crate::enemy::Archetype;

// ============================================================================
// Agent
// ============================================================================

/// Base stats for the controllable agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentBalance {
    /// Maximum health.
    pub max_health: f32,
    /// Basic attack damage before multipliers.
    pub base_damage: f32,
    /// Baseline move speed.
    pub base_speed: f32,
    /// Basic attack cooldown at baseline.
    pub attack_cooldown_ms: f32,
    /// Basic attack reach (added to the target's radius).
    pub attack_range: f32,
    /// Body radius used for contact checks.
    pub radius: f32,
}

impl Default for AgentBalance {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            base_damage: 10.0,
            base_speed: 140.0,
            attack_cooldown_ms: 600.0,
            attack_range: 60.0,
            radius: 40.0,
        }
    }
}

// ============================================================================
// Abilities
// ============================================================================

/// ENGAGE dash attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngageBalance {
    /// Dash only triggers when the primary threat is closer than this.
    pub trigger_distance: f32,
    /// Dash speed.
    pub dash_speed: f32,
    /// Dash duration.
    pub dash_duration_ms: f32,
    /// Special cooldown after a dash.
    pub cooldown_ms: f32,
}

impl Default for EngageBalance {
    fn default() -> Self {
        Self {
            trigger_distance: 200.0,
            dash_speed: 420.0,
            dash_duration_ms: 180.0,
            cooldown_ms: 2000.0,
        }
    }
}

/// GUARD stance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardBalance {
    /// Damage reduction fraction while guarding.
    pub damage_reduction: f32,
    /// Radius used to count nearby enemies.
    pub crowd_radius: f32,
    /// Nearby enemy count that triggers a retreat.
    pub crowd_threshold: usize,
    /// Retreat speed as a fraction of move speed.
    pub retreat_speed_factor: f32,
    /// Counter-attacks only happen above this health fraction.
    pub counter_health_fraction: f32,
}

impl Default for GuardBalance {
    fn default() -> Self {
        Self {
            damage_reduction: 0.5,
            crowd_radius: 150.0,
            crowd_threshold: 3,
            retreat_speed_factor: 0.5,
            counter_health_fraction: 0.5,
        }
    }
}

/// EVADE dash and spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvadeBalance {
    /// Dash triggers when the nearest enemy is closer than this.
    pub trigger_distance: f32,
    /// Dash speed.
    pub dash_speed: f32,
    /// Dash duration; the agent is invulnerable for its whole length.
    pub dash_duration_ms: f32,
    /// Special cooldown after a dash.
    pub cooldown_ms: f32,
    /// Counter-attack window opened when the dash ends.
    pub post_evade_window_ms: f32,
    /// Flee below this distance.
    pub min_distance: f32,
    /// Seek above this distance.
    pub max_distance: f32,
    /// Orbit radius between the two bands.
    pub orbit_distance: f32,
    /// Flee speed factor.
    pub flee_speed_factor: f32,
    /// Seek speed factor.
    pub seek_speed_factor: f32,
    /// Orbit speed factor.
    pub orbit_speed_factor: f32,
    /// An evade counts as successful if no damage lands within this time.
    pub success_window_ms: f32,
}

impl Default for EvadeBalance {
    fn default() -> Self {
        Self {
            trigger_distance: 150.0,
            dash_speed: 520.0,
            dash_duration_ms: 120.0,
            cooldown_ms: 1000.0,
            post_evade_window_ms: 800.0,
            min_distance: 150.0,
            max_distance: 300.0,
            orbit_distance: 250.0,
            flee_speed_factor: 1.2,
            seek_speed_factor: 0.8,
            orbit_speed_factor: 0.6,
            success_window_ms: 500.0,
        }
    }
}

/// BURST window and fatigue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstBalance {
    /// Active burst duration.
    pub active_ms: f32,
    /// Fatigue duration following the burst.
    pub fatigue_ms: f32,
    /// Special cooldown covering the full cycle.
    pub cooldown_ms: f32,
    /// Damage multiplier while active.
    pub damage_multiplier: f32,
    /// Attack cooldown factor while active.
    pub active_cooldown_factor: f32,
    /// Attack cooldown factor while fatigued.
    pub fatigue_cooldown_factor: f32,
    /// Move speed factor while fatigued.
    pub fatigue_speed_factor: f32,
    /// Preferred distance to the primary threat.
    pub hold_distance: f32,
    /// Flee below this distance.
    pub min_distance: f32,
    /// Seek above this distance.
    pub max_distance: f32,
    /// Flee speed factor.
    pub flee_speed_factor: f32,
    /// Seek speed factor.
    pub seek_speed_factor: f32,
}

impl Default for BurstBalance {
    fn default() -> Self {
        Self {
            active_ms: 1500.0,
            fatigue_ms: 1000.0,
            cooldown_ms: 3000.0,
            damage_multiplier: 1.3,
            active_cooldown_factor: 0.5,
            fatigue_cooldown_factor: 1.5,
            fatigue_speed_factor: 0.6,
            hold_distance: 115.0,
            min_distance: 80.0,
            max_distance: 150.0,
            flee_speed_factor: 0.5,
            seek_speed_factor: 1.1,
        }
    }
}

/// Ability parameters for all four strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityBalance {
    /// ENGAGE parameters.
    pub engage: EngageBalance,
    /// GUARD parameters.
    pub guard: GuardBalance,
    /// EVADE parameters.
    pub evade: EvadeBalance,
    /// BURST parameters.
    pub burst: BurstBalance,
}

// ============================================================================
// Enemies
// ============================================================================

/// Stat block shared by every archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    /// Maximum health.
    pub max_health: f32,
    /// Move speed.
    pub speed: f32,
    /// Damage per attack.
    pub damage: f32,
    /// Attack reach (added to the agent's radius for melee).
    pub attack_range: f32,
    /// Cooldown between attacks.
    pub attack_cooldown_ms: f32,
    /// Body radius.
    pub radius: f32,
}

/// Sniper projectile and spacing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperBalance {
    /// Projectile speed.
    pub projectile_speed: f32,
    /// Maximum projectile travel distance.
    pub projectile_range: f32,
    /// Projectile radius.
    pub projectile_radius: f32,
    /// Flee below this distance.
    pub min_distance: f32,
    /// Approach above this distance.
    pub max_distance: f32,
    /// Orbit speed factor inside the band.
    pub orbit_speed_factor: f32,
}

impl Default for SniperBalance {
    fn default() -> Self {
        Self {
            projectile_speed: 300.0,
            projectile_range: 250.0,
            projectile_radius: 8.0,
            min_distance: 150.0,
            max_distance: 240.0,
            orbit_speed_factor: 0.5,
        }
    }
}

impl SniperBalance {
    /// Projectile lifetime derived from range and speed.
    #[must_use]
    pub fn projectile_lifetime_ms(&self) -> f32 {
        if self.projectile_speed <= 0.0 {
            0.0
        } else {
            self.projectile_range / self.projectile_speed * 1000.0
        }
    }
}

/// Elite charge parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliteBalance {
    /// Telegraph duration before the charge.
    pub telegraph_ms: f32,
    /// Charge speed.
    pub charge_speed: f32,
    /// Charge duration.
    pub charge_ms: f32,
    /// Charge only starts above this distance.
    pub charge_min_distance: f32,
    /// Charge only starts below this distance.
    pub charge_max_distance: f32,
}

impl Default for EliteBalance {
    fn default() -> Self {
        Self {
            telegraph_ms: 800.0,
            charge_speed: 520.0,
            charge_ms: 400.0,
            charge_min_distance: 50.0,
            charge_max_distance: 150.0,
        }
    }
}

/// Stat blocks for every archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyBalance {
    /// Rusher stats.
    pub rusher: ArchetypeStats,
    /// Sniper stats.
    pub sniper: ArchetypeStats,
    /// Elite stats.
    pub elite: ArchetypeStats,
    /// Sniper-specific parameters.
    pub sniper_behavior: SniperBalance,
    /// Elite-specific parameters.
    pub elite_behavior: EliteBalance,
}

impl Default for EnemyBalance {
    fn default() -> Self {
        Self {
            rusher: ArchetypeStats {
                max_health: 25.0,
                speed: 120.0,
                damage: 8.0,
                attack_range: 18.0,
                attack_cooldown_ms: 1000.0,
                radius: 20.0,
            },
            sniper: ArchetypeStats {
                max_health: 18.0,
                speed: 80.0,
                damage: 12.0,
                attack_range: 220.0,
                attack_cooldown_ms: 1500.0,
                radius: 18.0,
            },
            elite: ArchetypeStats {
                max_health: 120.0,
                speed: 90.0,
                damage: 18.0,
                attack_range: 30.0,
                attack_cooldown_ms: 2000.0,
                radius: 35.0,
            },
            sniper_behavior: SniperBalance::default(),
            elite_behavior: EliteBalance::default(),
        }
    }
}

impl EnemyBalance {
    /// Stat block for an archetype.
    #[must_use]
    pub fn stats(&self, archetype: Archetype) -> &ArchetypeStats {
        match archetype {
            Archetype::Rusher => &self.rusher,
            Archetype::Sniper => &self.sniper,
            Archetype::Elite => &self.elite,
        }
    }
}

// ============================================================================
// Spawning
// ============================================================================

/// One wave of the spawn schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveBalance {
    /// Wave length in seconds.
    pub duration_secs: f32,
    /// Time between spawns.
    pub spawn_interval_ms: f32,
    /// Chance that a spawn is a Sniper.
    pub sniper_chance: f32,
    /// Chance that a spawn is an Elite.
    pub elite_chance: f32,
}

impl WaveBalance {
    /// Picks an archetype from a uniform roll in [0, 1).
    #[must_use]
    pub fn pick_archetype(&self, roll: f32) -> Archetype {
        if roll < self.elite_chance {
            Archetype::Elite
        } else if roll < self.elite_chance + self.sniper_chance {
            Archetype::Sniper
        } else {
            Archetype::Rusher
        }
    }
}

/// Spawn schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnBalance {
    /// Waves in order; the last wave repeats until the run ends.
    pub waves: Vec<WaveBalance>,
    /// How far outside the arena edge enemies appear.
    pub edge_margin: f32,
}

impl Default for SpawnBalance {
    fn default() -> Self {
        Self {
            waves: vec![
                WaveBalance {
                    duration_secs: 30.0,
                    spawn_interval_ms: 3000.0,
                    sniper_chance: 0.0,
                    elite_chance: 0.0,
                },
                WaveBalance {
                    duration_secs: 40.0,
                    spawn_interval_ms: 2500.0,
                    sniper_chance: 0.4,
                    elite_chance: 0.0,
                },
                WaveBalance {
                    duration_secs: 50.0,
                    spawn_interval_ms: 2000.0,
                    sniper_chance: 0.3,
                    elite_chance: 0.2,
                },
            ],
            edge_margin: 50.0,
        }
    }
}

// ============================================================================
// Hazards and arena
// ============================================================================

/// A barrier segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierSegment {
    /// Start X.
    pub x1: f32,
    /// Start Y.
    pub y1: f32,
    /// End X.
    pub x2: f32,
    /// End Y.
    pub y2: f32,
}

/// Electric barrier hazards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardBalance {
    /// Damage per second while in contact.
    pub damage_per_second: f32,
    /// Width of the damage zone around each segment.
    pub width: f32,
    /// Barrier placements.
    pub barriers: Vec<BarrierSegment>,
}

impl Default for HazardBalance {
    fn default() -> Self {
        let seg = |x1, y1, x2, y2| BarrierSegment { x1, y1, x2, y2 };
        Self {
            damage_per_second: 20.0,
            width: 20.0,
            barriers: vec![
                seg(200.0, 200.0, 400.0, 400.0),
                seg(1720.0, 200.0, 1520.0, 400.0),
                seg(200.0, 880.0, 400.0, 680.0),
                seg(1720.0, 880.0, 1520.0, 680.0),
            ],
        }
    }
}

/// Arena bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBalance {
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

impl Default for ArenaBalance {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// All balance values for one encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Run length in seconds.
    pub run_duration_secs: f32,
    /// Arena bounds.
    pub arena: ArenaBalance,
    /// Agent stats.
    pub agent: AgentBalance,
    /// Strategy abilities.
    pub abilities: AbilityBalance,
    /// Enemy archetypes.
    pub enemies: EnemyBalance,
    /// Spawn schedule.
    pub spawning: SpawnBalance,
    /// Hazards.
    pub hazards: HazardBalance,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            run_duration_secs: 120.0,
            arena: ArenaBalance::default(),
            agent: AgentBalance::default(),
            abilities: AbilityBalance::default(),
            enemies: EnemyBalance::default(),
            spawning: SpawnBalance::default(),
            hazards: HazardBalance::default(),
        }
    }
}

impl BalanceConfig {
    /// Clamps values into ranges the simulation can handle.
    pub fn validate(&mut self) {
        self.run_duration_secs = self.run_duration_secs.max(1.0);
        self.arena.width = self.arena.width.max(100.0);
        self.arena.height = self.arena.height.max(100.0);
        self.agent.max_health = self.agent.max_health.max(1.0);
        self.agent.attack_cooldown_ms = self.agent.attack_cooldown_ms.max(0.0);
        self.abilities.guard.damage_reduction = self.abilities.guard.damage_reduction.clamp(0.0, 1.0);
        for wave in &mut self.spawning.waves {
            wave.spawn_interval_ms = wave.spawn_interval_ms.max(100.0);
            wave.sniper_chance = wave.sniper_chance.clamp(0.0, 1.0);
            wave.elite_chance = wave.elite_chance.clamp(0.0, 1.0 - wave.sniper_chance);
        }
    }
}
