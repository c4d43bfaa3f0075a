//! Enemy archetypes and their behavior.
//!
//! Each archetype runs a small state machine driven by distance bands:
//! - Rusher closes to melee range and attacks on cooldown.
//! - Sniper holds a firing band and shoots projectiles.
//! - Elite telegraphs a charge at mid range, otherwise acts as a slow rusher.
//!
//! All timed sub-states are [`Countdown`]s advanced by the tick.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use skirmish_common::{direction, EntityId, Vec2};

use crate::agent::{Agent, DamageOutcome};
use crate::balance::{ArchetypeStats, EnemyBalance};
use crate::events::{DamageSource, EventBus};
use crate::physics::{PhysicsWorld, Region};
use crate::steering;
use crate::timer::Countdown;

/// Enemy class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    /// Fast melee attacker.
    Rusher,
    /// Ranged attacker keeping its distance.
    Sniper,
    /// Tanky charger.
    Elite,
}

impl Archetype {
    /// Capitalised display name, also the telemetry bucket key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rusher => "Rusher",
            Self::Sniper => "Sniper",
            Self::Elite => "Elite",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rusher" => Ok(Self::Rusher),
            "sniper" => Ok(Self::Sniper),
            "elite" => Ok(Self::Elite),
            other => Err(format!("unknown archetype '{other}'")),
        }
    }
}

/// A sniper shot in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Current position
    pub position: Vec2,
    /// Velocity in units/s
    pub velocity: Vec2,
    /// Contact radius
    pub radius: f32,
    /// Damage on contact
    pub damage: f32,
    lifetime: Countdown,
}

impl Projectile {
    /// Remaining flight time.
    #[must_use]
    pub const fn remaining_ms(&self) -> f32 {
        self.lifetime.remaining_ms()
    }
}

/// Elite charge sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargePhase {
    /// Walking toward the agent.
    Approach,
    /// Standing still before the charge.
    Telegraph {
        /// Time until the charge starts
        timer: Countdown,
    },
    /// Dashing toward the agent's position at telegraph end.
    Charge {
        /// Time until the charge ends
        timer: Countdown,
        /// Fixed charge velocity
        velocity: Vec2,
        /// Whether this charge already hit
        hit: bool,
    },
}

/// Archetype-specific transient state.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchetypeState {
    /// Rushers carry nothing extra.
    Rusher,
    /// Projectiles in flight.
    Sniper {
        /// Live projectiles
        projectiles: Vec<Projectile>,
    },
    /// Charge progress.
    Elite {
        /// Current phase
        phase: ChargePhase,
    },
}

/// Everything an enemy needs from the world during its update.
pub struct EnemyContext<'a> {
    /// The agent (attack target)
    pub agent: &'a mut Agent,
    /// Motion and overlap services
    pub physics: &'a dyn PhysicsWorld,
    /// Archetype parameters
    pub balance: &'a EnemyBalance,
    /// Combat event sink
    pub events: &'a EventBus,
}

/// A hostile unit.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EntityId,
    archetype: Archetype,
    stats: ArchetypeStats,
    health: f32,
    position: Vec2,
    velocity: Vec2,
    attack_cooldown_ms: f32,
    active: bool,
    state: ArchetypeState,
}

impl Enemy {
    /// Creates an enemy of `archetype` at `position`.
    #[must_use]
    pub fn new(archetype: Archetype, position: Vec2, balance: &EnemyBalance) -> Self {
        let stats = balance.stats(archetype).clone();
        let state = match archetype {
            Archetype::Rusher => ArchetypeState::Rusher,
            Archetype::Sniper => ArchetypeState::Sniper {
                projectiles: Vec::new(),
            },
            Archetype::Elite => ArchetypeState::Elite {
                phase: ChargePhase::Approach,
            },
        };
        Self {
            id: EntityId::new(),
            archetype,
            health: stats.max_health,
            stats,
            position,
            velocity: Vec2::ZERO,
            attack_cooldown_ms: 0.0,
            active: true,
            state,
        }
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Stat block.
    #[must_use]
    pub const fn stats(&self) -> &ArchetypeStats {
        &self.stats
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.stats.max_health
    }

    /// Damage per attack.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.stats.damage
    }

    /// Body radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.stats.radius
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Teleports the enemy.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Remaining attack cooldown.
    #[must_use]
    pub const fn attack_cooldown_ms(&self) -> f32 {
        self.attack_cooldown_ms
    }

    /// Whether the enemy is alive and in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Archetype sub-state.
    #[must_use]
    pub const fn state(&self) -> &ArchetypeState {
        &self.state
    }

    /// Projectiles in flight (snipers only).
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        match &self.state {
            ArchetypeState::Sniper { projectiles } => projectiles,
            _ => &[],
        }
    }

    /// Whether an elite is telegraphing a charge.
    #[must_use]
    pub fn is_telegraphing(&self) -> bool {
        matches!(
            self.state,
            ArchetypeState::Elite {
                phase: ChargePhase::Telegraph { .. }
            }
        )
    }

    /// Whether an elite is mid-charge.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        matches!(
            self.state,
            ArchetypeState::Elite {
                phase: ChargePhase::Charge { .. }
            }
        )
    }

    /// Applies damage. Dead enemies ignore it.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.active || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        let lost = amount.min(self.health);
        self.health -= lost;
        let fatal = self.health <= 0.0;
        if fatal {
            self.health = 0.0;
            self.die();
        }
        DamageOutcome::Applied {
            amount: lost,
            fatal,
        }
    }

    fn die(&mut self) {
        self.active = false;
        self.velocity = Vec2::ZERO;
        match &mut self.state {
            ArchetypeState::Elite { phase } => *phase = ChargePhase::Approach,
            ArchetypeState::Sniper { projectiles } => projectiles.clear(),
            ArchetypeState::Rusher => {}
        }
        debug!("{} {} died", self.archetype, self.id);
    }

    /// Runs one tick of behavior, then integrates motion.
    pub fn update(&mut self, ctx: &mut EnemyContext<'_>, dt_ms: f32) {
        if !self.active || !ctx.agent.is_alive() {
            self.velocity = Vec2::ZERO;
            return;
        }

        if self.attack_cooldown_ms > 0.0 {
            self.attack_cooldown_ms -= dt_ms;
        }

        match self.archetype {
            Archetype::Rusher => self.update_rusher(ctx),
            Archetype::Sniper => self.update_sniper(ctx, dt_ms),
            Archetype::Elite => self.update_elite(ctx, dt_ms),
        }

        self.position = ctx
            .physics
            .apply_velocity(self.position, self.velocity, dt_ms, Some(self.radius()));
    }

    fn melee_reach(&self, agent: &Agent) -> f32 {
        self.stats.attack_range + agent.radius()
    }

    fn try_melee(&mut self, ctx: &mut EnemyContext<'_>, dist: f32) {
        if dist <= self.melee_reach(ctx.agent) && self.attack_cooldown_ms <= 0.0 {
            self.attack_cooldown_ms = self.stats.attack_cooldown_ms;
            let outcome = ctx.agent.take_damage(self.stats.damage);
            ctx.events.publish_agent_damage(
                outcome,
                ctx.agent.health_fraction(),
                DamageSource::Melee(self.archetype),
            );
        }
    }

    fn update_rusher(&mut self, ctx: &mut EnemyContext<'_>) {
        let target = ctx.agent.position();
        self.velocity = steering::seek(self.position, target, self.stats.speed);
        let dist = self.position.distance(target);
        self.try_melee(ctx, dist);
    }

    fn update_sniper(&mut self, ctx: &mut EnemyContext<'_>, dt_ms: f32) {
        let behavior = &ctx.balance.sniper_behavior;
        let target = ctx.agent.position();
        let dist = self.position.distance(target);
        let speed = self.stats.speed;

        self.velocity = if dist < behavior.min_distance {
            steering::flee(self.position, target, speed)
        } else if dist > behavior.max_distance {
            steering::seek(self.position, target, speed)
        } else {
            let hold = (behavior.min_distance + behavior.max_distance) / 2.0;
            steering::orbit(self.position, target, hold, speed * behavior.orbit_speed_factor)
        };

        let ArchetypeState::Sniper { projectiles } = &mut self.state else {
            return;
        };

        if dist <= self.stats.attack_range && self.attack_cooldown_ms <= 0.0 {
            self.attack_cooldown_ms = self.stats.attack_cooldown_ms;
            projectiles.push(Projectile {
                position: self.position,
                velocity: direction(self.position, target) * behavior.projectile_speed,
                radius: behavior.projectile_radius,
                damage: self.stats.damage,
                lifetime: Countdown::started(behavior.projectile_lifetime_ms()),
            });
            debug!("Sniper {} fired", self.id);
        }

        let agent_region = Region::circle(ctx.agent.position(), ctx.agent.radius());
        projectiles.retain_mut(|p| {
            p.position = ctx.physics.apply_velocity(p.position, p.velocity, dt_ms, None);
            if ctx
                .physics
                .overlaps(&Region::circle(p.position, p.radius), &agent_region)
            {
                let outcome = ctx.agent.take_damage(p.damage);
                ctx.events.publish_agent_damage(
                    outcome,
                    ctx.agent.health_fraction(),
                    DamageSource::Projectile,
                );
                return false;
            }
            !p.lifetime.tick(dt_ms)
        });
    }

    fn update_elite(&mut self, ctx: &mut EnemyContext<'_>, dt_ms: f32) {
        let behavior = &ctx.balance.elite_behavior;
        let target = ctx.agent.position();
        let dist = self.position.distance(target);

        let ArchetypeState::Elite { phase } = &mut self.state else {
            return;
        };

        match phase {
            ChargePhase::Approach => {
                let in_band =
                    dist >= behavior.charge_min_distance && dist <= behavior.charge_max_distance;
                if in_band && self.attack_cooldown_ms <= 0.0 {
                    *phase = ChargePhase::Telegraph {
                        timer: Countdown::started(behavior.telegraph_ms),
                    };
                    self.velocity = Vec2::ZERO;
                    debug!("Elite {} telegraphing charge", self.id);
                } else {
                    self.velocity = steering::seek(self.position, target, self.stats.speed);
                    self.try_melee(ctx, dist);
                }
            }
            ChargePhase::Telegraph { timer } => {
                self.velocity = Vec2::ZERO;
                if timer.tick(dt_ms) {
                    let velocity = direction(self.position, target) * behavior.charge_speed;
                    *phase = ChargePhase::Charge {
                        timer: Countdown::started(behavior.charge_ms),
                        velocity,
                        hit: false,
                    };
                    self.velocity = velocity;
                    self.attack_cooldown_ms = self.stats.attack_cooldown_ms;
                    debug!("Elite {} charging", self.id);
                }
            }
            ChargePhase::Charge {
                timer,
                velocity,
                hit,
            } => {
                self.velocity = *velocity;
                let contact = self.stats.radius + ctx.agent.radius();
                if !*hit && dist < contact {
                    *hit = true;
                    let outcome = ctx.agent.take_damage(self.stats.damage);
                    ctx.events.publish_agent_damage(
                        outcome,
                        ctx.agent.health_fraction(),
                        DamageSource::Melee(Archetype::Elite),
                    );
                }
                if timer.tick(dt_ms) {
                    *phase = ChargePhase::Approach;
                    self.velocity = Vec2::ZERO;
                }
            }
        }
    }
}
