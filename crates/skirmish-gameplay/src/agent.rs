//! The controllable agent and its combat resolution.
//!
//! Incoming damage:
//! `effective = raw * (1 - clamp(strategy_reduction + window_bonus, 0, 1))`
//! where `window_bonus` is the Phantom Trace reduction while the post-evade
//! window is open. Invulnerable and dead agents ignore damage entirely.
//!
//! Outgoing damage:
//! `applied = base * (multiplier + reflex_bonus)` against every live enemy
//! within `attack_range + enemy.radius`, with lifesteal on each connecting hit.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use skirmish_common::{EntityId, Vec2};

use crate::balance::AgentBalance;
use crate::enemy::{Archetype, Enemy};
use crate::timer::Countdown;
use crate::traits::{TraitId, TraitModifiers, TraitSet};

/// Result of applying damage to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Target was dead or invulnerable; nothing happened.
    Ignored,
    /// Health was reduced.
    Applied {
        /// Health actually lost
        amount: f32,
        /// Whether this hit brought health to zero
        fatal: bool,
    },
}

impl DamageOutcome {
    /// Health lost, zero when ignored.
    #[must_use]
    pub const fn amount(self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Applied { amount, .. } => amount,
        }
    }

    /// Whether this hit killed the target.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Applied { fatal: true, .. })
    }
}

/// One enemy hit by a basic attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    /// Enemy hit
    pub enemy_id: EntityId,
    /// Its archetype
    pub archetype: Archetype,
    /// Damage applied
    pub damage: f32,
    /// Whether the hit killed it
    pub fatal: bool,
}

/// Summary of one basic attack swing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackReport {
    /// Enemies that took damage
    pub hits: Vec<HitReport>,
    /// Health restored through lifesteal
    pub healed: f32,
    /// Whether the reflex bonus was spent on this swing
    pub reflex_consumed: bool,
}

impl AttackReport {
    /// Total damage dealt.
    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.hits.iter().map(|h| h.damage).sum()
    }
}

/// The controllable agent.
#[derive(Debug, Clone)]
pub struct Agent {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
    radius: f32,

    health: f32,
    max_health: f32,
    dead: bool,

    base_speed: f32,
    speed: f32,

    damage: f32,
    damage_multiplier: f32,
    attack_range: f32,
    attack_cooldown_ms: f32,
    base_attack_cooldown_ms: f32,
    attack_cooldown_max_ms: f32,

    damage_reduction: f32,
    invulnerable: bool,
    post_evade_window: Countdown,

    traits: TraitSet,
}

impl Agent {
    /// Creates an agent at `position` carrying `traits` over from the last run.
    #[must_use]
    pub fn new(balance: &AgentBalance, position: Vec2, traits: impl IntoIterator<Item = TraitId>) -> Self {
        let traits = TraitSet::from_ids(traits);
        if !traits.is_empty() {
            info!(
                "Agent starts with traits: {}",
                traits.iter().map(TraitId::as_str).collect::<Vec<_>>().join(", ")
            );
        }
        Self {
            id: EntityId::new(),
            position,
            velocity: Vec2::ZERO,
            radius: balance.radius,
            health: balance.max_health,
            max_health: balance.max_health,
            dead: false,
            base_speed: balance.base_speed,
            speed: balance.base_speed,
            damage: balance.base_damage,
            damage_multiplier: 1.0,
            attack_range: balance.attack_range,
            attack_cooldown_ms: 0.0,
            base_attack_cooldown_ms: balance.attack_cooldown_ms,
            attack_cooldown_max_ms: balance.attack_cooldown_ms,
            damage_reduction: 0.0,
            invulnerable: false,
            post_evade_window: Countdown::idle(),
            traits,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the agent. Used by the physics step.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Sets the velocity for the next physics step.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Body radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Health as a fraction of max.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Whether the agent is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Move speed after strategy modifiers.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Baseline move speed.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Base attack damage.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Strategy-driven damage multiplier.
    #[must_use]
    pub const fn damage_multiplier(&self) -> f32 {
        self.damage_multiplier
    }

    /// Attack reach.
    #[must_use]
    pub const fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// Remaining attack cooldown.
    #[must_use]
    pub const fn attack_cooldown_ms(&self) -> f32 {
        self.attack_cooldown_ms
    }

    /// Cooldown applied after each attack.
    #[must_use]
    pub const fn attack_cooldown_max_ms(&self) -> f32 {
        self.attack_cooldown_max_ms
    }

    /// Baseline attack cooldown.
    #[must_use]
    pub const fn base_attack_cooldown_ms(&self) -> f32 {
        self.base_attack_cooldown_ms
    }

    /// Strategy-granted damage reduction.
    #[must_use]
    pub const fn damage_reduction(&self) -> f32 {
        self.damage_reduction
    }

    /// Whether incoming damage is ignored.
    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// Whether the post-evade window is open.
    #[must_use]
    pub const fn is_post_evade_window_open(&self) -> bool {
        self.post_evade_window.is_running()
    }

    /// Time left in the post-evade window.
    #[must_use]
    pub const fn post_evade_window_ms(&self) -> f32 {
        self.post_evade_window.remaining_ms()
    }

    /// Active traits.
    #[must_use]
    pub const fn traits(&self) -> &TraitSet {
        &self.traits
    }

    /// Modifiers derived from the active traits.
    #[must_use]
    pub const fn modifiers(&self) -> &TraitModifiers {
        self.traits.modifiers()
    }

    // ========================================================================
    // Strategy-driven state
    // ========================================================================

    /// Sets the strategy reduction, clamped to `[0, 1]`.
    pub fn set_damage_reduction(&mut self, reduction: f32) {
        self.damage_reduction = reduction.clamp(0.0, 1.0);
    }

    /// Sets the strategy damage multiplier.
    pub fn set_damage_multiplier(&mut self, multiplier: f32) {
        self.damage_multiplier = multiplier.max(0.0);
    }

    /// Scales the attack cooldown applied after each swing.
    pub fn scale_attack_cooldown(&mut self, factor: f32) {
        self.attack_cooldown_max_ms = self.base_attack_cooldown_ms * factor.max(0.0);
    }

    /// Scales move speed relative to baseline.
    pub fn scale_speed(&mut self, factor: f32) {
        self.speed = self.base_speed * factor.max(0.0);
    }

    /// Restores multiplier, attack cooldown and speed to baseline.
    pub fn reset_burst_modifiers(&mut self) {
        self.damage_multiplier = 1.0;
        self.attack_cooldown_max_ms = self.base_attack_cooldown_ms;
        self.speed = self.base_speed;
    }

    /// Toggles i-frames.
    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    /// Opens the post-evade window.
    pub fn open_post_evade_window(&mut self, duration_ms: f32) {
        self.post_evade_window.start(duration_ms);
        debug!("Post-evade window open for {}ms", duration_ms);
    }

    /// Closes the post-evade window early.
    pub fn close_post_evade_window(&mut self) {
        self.post_evade_window.cancel();
    }

    // ========================================================================
    // Traits
    // ========================================================================

    /// Activates a trait. No-op if already active.
    pub fn apply_trait(&mut self, id: TraitId) -> bool {
        self.traits.apply(id)
    }

    /// Deactivates a trait. No-op if not active.
    pub fn remove_trait(&mut self, id: TraitId) -> bool {
        self.traits.remove(id)
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Advances the attack cooldown and the post-evade window.
    pub fn tick_timers(&mut self, dt_ms: f32) {
        if self.attack_cooldown_ms > 0.0 {
            self.attack_cooldown_ms -= dt_ms;
        }
        if self.post_evade_window.tick(dt_ms) {
            debug!("Post-evade window closed");
        }
    }

    /// Total reduction applied to the next hit.
    #[must_use]
    pub fn total_reduction(&self) -> f32 {
        let mut reduction = self.damage_reduction;
        if self.is_post_evade_window_open() {
            reduction += self.modifiers().post_evade_reduction;
        }
        reduction.clamp(0.0, 1.0)
    }

    /// Applies incoming damage.
    pub fn take_damage(&mut self, raw: f32) -> DamageOutcome {
        if self.dead || self.invulnerable || raw <= 0.0 {
            return DamageOutcome::Ignored;
        }
        let amount = raw * (1.0 - self.total_reduction());
        self.health = (self.health - amount).max(0.0);
        let fatal = self.health <= 0.0;
        if fatal {
            self.dead = true;
            self.velocity = Vec2::ZERO;
            info!("Agent died");
        }
        DamageOutcome::Applied { amount, fatal }
    }

    /// Restores health up to max. Returns the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.dead || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Swings at every enemy in reach.
    ///
    /// Returns `None` while the attack cooldown is running. A swing that hits
    /// nothing still starts the cooldown.
    pub fn basic_attack(&mut self, enemies: &mut [Enemy]) -> Option<AttackReport> {
        if self.dead || self.attack_cooldown_ms > 0.0 {
            return None;
        }
        self.attack_cooldown_ms = self.attack_cooldown_max_ms;

        let modifiers = *self.modifiers();
        let reflex_ready = modifiers.reflex_damage_bonus > 0.0 && self.is_post_evade_window_open();
        let mut multiplier = self.damage_multiplier;
        if reflex_ready {
            multiplier += modifiers.reflex_damage_bonus;
        }
        let applied = self.damage * multiplier;

        let mut report = AttackReport::default();
        for enemy in enemies.iter_mut().filter(|e| e.is_active()) {
            if self.position.distance(enemy.position()) > self.attack_range + enemy.radius() {
                continue;
            }
            let outcome = enemy.take_damage(applied);
            if let DamageOutcome::Applied { fatal, .. } = outcome {
                report.hits.push(HitReport {
                    enemy_id: enemy.id(),
                    archetype: enemy.archetype(),
                    damage: applied,
                    fatal,
                });
                if modifiers.lifesteal_fraction > 0.0 {
                    report.healed += self.heal(applied * modifiers.lifesteal_fraction);
                }
            }
        }

        if reflex_ready && !report.hits.is_empty() {
            report.reflex_consumed = true;
            self.post_evade_window.cancel();
            debug!("Reflex bonus consumed");
        }
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::EnemyBalance;

    fn agent() -> Agent {
        Agent::new(&AgentBalance::default(), Vec2::new(500.0, 500.0), [])
    }

    fn rusher_at(pos: Vec2) -> Enemy {
        Enemy::new(Archetype::Rusher, pos, &EnemyBalance::default())
    }

    #[test]
    fn test_guard_reduction_halves_damage() {
        let mut a = agent();
        a.set_damage_reduction(0.5);
        let outcome = a.take_damage(40.0);
        assert_eq!(outcome.amount(), 20.0);
        assert_eq!(a.health(), 80.0);
    }

    #[test]
    fn test_invulnerable_ignores_damage() {
        let mut a = agent();
        a.set_invulnerable(true);
        assert_eq!(a.take_damage(40.0), DamageOutcome::Ignored);
        assert_eq!(a.health(), 100.0);
    }

    #[test]
    fn test_death_fires_once_and_clamps() {
        let mut a = agent();
        let first = a.take_damage(150.0);
        assert!(first.is_fatal());
        assert_eq!(a.health(), 0.0);
        assert!(!a.is_alive());
        assert_eq!(a.take_damage(10.0), DamageOutcome::Ignored);
        assert_eq!(a.health(), 0.0);
    }

    #[test]
    fn test_phantom_trace_adds_reduction_in_window() {
        let mut a = Agent::new(&AgentBalance::default(), Vec2::ZERO, [TraitId::PhantomTrace]);
        a.set_damage_reduction(0.5);
        a.open_post_evade_window(800.0);
        assert_eq!(a.total_reduction(), 1.0);
        assert_eq!(a.take_damage(40.0).amount(), 0.0);

        a.close_post_evade_window();
        assert_eq!(a.take_damage(40.0).amount(), 20.0);
    }

    #[test]
    fn test_window_without_trait_adds_nothing() {
        let mut a = agent();
        a.open_post_evade_window(800.0);
        assert_eq!(a.total_reduction(), 0.0);
    }

    #[test]
    fn test_basic_attack_hits_in_reach_only() {
        let mut a = agent();
        let mut enemies = vec![
            rusher_at(Vec2::new(570.0, 500.0)),
            rusher_at(Vec2::new(590.0, 500.0)),
        ];
        let report = a.basic_attack(&mut enemies).expect("attack ready");
        assert_eq!(report.hits.len(), 1);
        assert_eq!(enemies[0].health(), 15.0);
        assert_eq!(enemies[1].health(), 25.0);
        assert_eq!(a.attack_cooldown_ms(), 600.0);
    }

    #[test]
    fn test_basic_attack_blocked_by_cooldown() {
        let mut a = agent();
        let mut enemies = vec![rusher_at(Vec2::new(510.0, 500.0))];
        assert!(a.basic_attack(&mut enemies).is_some());
        assert!(a.basic_attack(&mut enemies).is_none());
        a.tick_timers(600.0);
        assert!(a.basic_attack(&mut enemies).is_some());
    }

    #[test]
    fn test_reflex_bonus_consumed_on_hit() {
        let mut a = Agent::new(&AgentBalance::default(), Vec2::ZERO, [TraitId::ReflexBurst]);
        a.open_post_evade_window(800.0);

        // Whiff keeps the bonus.
        let mut far = vec![rusher_at(Vec2::new(500.0, 0.0))];
        let whiff = a.basic_attack(&mut far).expect("ready");
        assert!(!whiff.reflex_consumed);
        assert!(a.is_post_evade_window_open());

        a.tick_timers(600.0);
        let mut near = vec![rusher_at(Vec2::new(10.0, 0.0))];
        let hit = a.basic_attack(&mut near).expect("ready");
        assert!(hit.reflex_consumed);
        assert!((hit.hits[0].damage - 14.0).abs() < 1e-4);
        assert!(!a.is_post_evade_window_open());
    }

    #[test]
    fn test_lifesteal_heals_capped() {
        let mut a = Agent::new(&AgentBalance::default(), Vec2::ZERO, [TraitId::BloodExchange]);
        a.take_damage(50.0);
        let mut enemies = vec![rusher_at(Vec2::new(10.0, 0.0))];
        let report = a.basic_attack(&mut enemies).expect("ready");
        assert!((report.healed - 0.3).abs() < 1e-4);
        assert!((a.health() - 50.3).abs() < 1e-4);

        let mut full = agent();
        assert_eq!(full.heal(10.0), 0.0);
    }

    #[test]
    fn test_burst_modifiers_reset() {
        let mut a = agent();
        a.scale_attack_cooldown(0.5);
        a.set_damage_multiplier(1.3);
        a.scale_speed(0.6);
        assert_eq!(a.attack_cooldown_max_ms(), 300.0);
        a.reset_burst_modifiers();
        assert_eq!(a.attack_cooldown_max_ms(), 600.0);
        assert_eq!(a.damage_multiplier(), 1.0);
        assert_eq!(a.speed(), 140.0);
    }

    #[test]
    fn test_dead_enemies_are_skipped() {
        let mut a = agent();
        let mut enemies = vec![rusher_at(Vec2::new(510.0, 500.0))];
        enemies[0].take_damage(100.0);
        let report = a.basic_attack(&mut enemies).expect("ready");
        assert!(report.hits.is_empty());
    }
}
