//! Strategy state machine driving the agent.
//!
//! Each strategy owns only the sub-state it needs (see [`StrategyState`]), so
//! impossible combinations such as an active burst outside BURST cannot be
//! represented. Every tick runs in a fixed order:
//!
//! 1. The shared special cooldown is decremented.
//! 2. Strategy countdowns advance and fire their one-shot transitions.
//! 3. Strategy logic picks a velocity, may trigger the special ability, and
//!    may swing the basic attack.
//!
//! [`AgentAi::set_strategy`] is the only external transition. It tears down
//! the outgoing strategy immediately, so no stale countdown can affect the
//! agent afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use skirmish_common::{direction, Vec2};

use crate::agent::{Agent, AttackReport};
use crate::balance::AbilityBalance;
use crate::enemy::Enemy;
use crate::events::Ability;
use crate::steering;
use crate::strategy::Strategy;
use crate::threat::{count_within, nearest_enemy, ThreatModel};
use crate::timer::Countdown;

/// A dash in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    /// Time left
    pub timer: Countdown,
    /// Velocity held for the whole dash
    pub velocity: Vec2,
}

/// BURST cycle position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BurstPhase {
    /// Waiting for the special cooldown.
    Idle,
    /// Faster, stronger attacks.
    Active(Countdown),
    /// Slower attacks and movement, no attacking.
    Fatigue(Countdown),
}

/// Strategy-local state.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyState {
    /// ENGAGE with an optional dash attack in progress.
    Engage {
        /// Dash in progress
        dash: Option<Dash>,
    },
    /// GUARD has no timed state.
    Guard,
    /// EVADE with an optional evade dash in progress.
    Evade {
        /// Dash in progress
        dash: Option<Dash>,
    },
    /// BURST cycle.
    Burst(BurstPhase),
}

impl StrategyState {
    fn initial(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Engage => Self::Engage { dash: None },
            Strategy::Guard => Self::Guard,
            Strategy::Evade => Self::Evade { dash: None },
            Strategy::Burst => Self::Burst(BurstPhase::Idle),
        }
    }
}

/// What the AI did during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiTick {
    /// Special ability triggered this tick
    pub ability: Option<Ability>,
    /// Basic attack swung this tick
    pub attack: Option<AttackReport>,
}

/// Per-strategy behavior engine.
#[derive(Debug, Clone)]
pub struct AgentAi {
    strategy: Strategy,
    state: StrategyState,
    special_cooldown_ms: f32,
    abilities: AbilityBalance,
}

impl AgentAi {
    /// Creates an AI starting in ENGAGE.
    #[must_use]
    pub fn new(abilities: AbilityBalance) -> Self {
        Self {
            strategy: Strategy::Engage,
            state: StrategyState::initial(Strategy::Engage),
            special_cooldown_ms: 0.0,
            abilities,
        }
    }

    /// Active strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Strategy-local state.
    #[must_use]
    pub const fn state(&self) -> &StrategyState {
        &self.state
    }

    /// Shared special-ability cooldown.
    #[must_use]
    pub const fn special_cooldown_ms(&self) -> f32 {
        self.special_cooldown_ms
    }

    /// Whether a BURST window is running.
    #[must_use]
    pub fn is_burst_active(&self) -> bool {
        matches!(self.state, StrategyState::Burst(BurstPhase::Active(_)))
    }

    /// Whether BURST fatigue is running.
    #[must_use]
    pub fn is_fatigued(&self) -> bool {
        matches!(self.state, StrategyState::Burst(BurstPhase::Fatigue(_)))
    }

    /// Whether an ENGAGE or EVADE dash is running.
    #[must_use]
    pub fn is_dashing(&self) -> bool {
        matches!(
            self.state,
            StrategyState::Engage { dash: Some(_) } | StrategyState::Evade { dash: Some(_) }
        )
    }

    /// Switches strategy, tearing down the outgoing one.
    ///
    /// Returns `false` when `strategy` is already active.
    pub fn set_strategy(&mut self, strategy: Strategy, agent: &mut Agent) -> bool {
        if strategy == self.strategy {
            return false;
        }

        match self.state {
            StrategyState::Engage { dash } => {
                if dash.is_some() {
                    agent.set_velocity(Vec2::ZERO);
                }
            }
            StrategyState::Guard => agent.set_damage_reduction(0.0),
            StrategyState::Evade { dash } => {
                if dash.is_some() {
                    agent.set_invulnerable(false);
                    agent.set_velocity(Vec2::ZERO);
                }
                agent.close_post_evade_window();
            }
            StrategyState::Burst(_) => agent.reset_burst_modifiers(),
        }

        info!("Strategy changed: {} -> {}", self.strategy, strategy);
        self.strategy = strategy;
        self.state = StrategyState::initial(strategy);
        if strategy == Strategy::Guard {
            self.apply_guard_reduction(agent);
        }
        true
    }

    /// Runs one tick.
    pub fn update(&mut self, agent: &mut Agent, enemies: &mut [Enemy], dt_ms: f32) -> AiTick {
        if !agent.is_alive() {
            return AiTick::default();
        }

        if self.special_cooldown_ms > 0.0 {
            self.special_cooldown_ms -= dt_ms;
        }

        self.advance_timers(agent, dt_ms);

        match self.strategy {
            Strategy::Engage => self.update_engage(agent, enemies),
            Strategy::Guard => self.update_guard(agent, enemies),
            Strategy::Evade => self.update_evade(agent, enemies),
            Strategy::Burst => self.update_burst(agent, enemies),
        }
    }

    fn threat_model(agent: &Agent) -> ThreatModel {
        ThreatModel::new().with_sniper_weight(agent.modifiers().sniper_threat_weight)
    }

    fn apply_guard_reduction(&self, agent: &mut Agent) {
        agent.set_damage_reduction(
            self.abilities.guard.damage_reduction + agent.modifiers().guard_reduction_bonus,
        );
    }

    // ========================================================================
    // Timers
    // ========================================================================

    fn advance_timers(&mut self, agent: &mut Agent, dt_ms: f32) {
        let burst = &self.abilities.burst;
        match &mut self.state {
            StrategyState::Engage { dash } => {
                if let Some(d) = dash {
                    if d.timer.tick(dt_ms) {
                        agent.set_velocity(Vec2::ZERO);
                        *dash = None;
                    }
                }
            }
            StrategyState::Guard => {}
            StrategyState::Evade { dash } => {
                if let Some(d) = dash {
                    if d.timer.tick(dt_ms) {
                        agent.set_invulnerable(false);
                        agent.set_velocity(Vec2::ZERO);
                        agent.open_post_evade_window(self.abilities.evade.post_evade_window_ms);
                        *dash = None;
                    }
                }
            }
            StrategyState::Burst(phase) => match phase {
                BurstPhase::Idle => {}
                BurstPhase::Active(timer) => {
                    if timer.tick(dt_ms) {
                        agent.scale_attack_cooldown(burst.fatigue_cooldown_factor);
                        agent.scale_speed(burst.fatigue_speed_factor);
                        agent.set_damage_multiplier(1.0);
                        *phase = BurstPhase::Fatigue(Countdown::started(burst.fatigue_ms));
                        debug!("Burst fatigue");
                    }
                }
                BurstPhase::Fatigue(timer) => {
                    if timer.tick(dt_ms) {
                        agent.reset_burst_modifiers();
                        *phase = BurstPhase::Idle;
                        debug!("Burst fatigue over");
                    }
                }
            },
        }
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    fn update_engage(&mut self, agent: &mut Agent, enemies: &mut [Enemy]) -> AiTick {
        let mut tick = AiTick::default();

        if let StrategyState::Engage { dash: Some(d) } = &self.state {
            agent.set_velocity(d.velocity);
        } else {
            let target = Self::threat_model(agent)
                .primary_threat(agent.position(), enemies)
                .map(Enemy::position);
            match target {
                Some(target) => {
                    let from = agent.position();
                    agent.set_velocity(steering::seek(from, target, agent.speed()));
                    let engage = &self.abilities.engage;
                    if self.special_cooldown_ms <= 0.0 && from.distance(target) < engage.trigger_distance
                    {
                        let speed = engage.dash_speed * (1.0 + agent.modifiers().dash_distance_bonus);
                        let velocity = direction(from, target) * speed;
                        agent.set_velocity(velocity);
                        self.special_cooldown_ms = engage.cooldown_ms;
                        self.state = StrategyState::Engage {
                            dash: Some(Dash {
                                timer: Countdown::started(engage.dash_duration_ms),
                                velocity,
                            }),
                        };
                        tick.ability = Some(Ability::EngageDash);
                        debug!("Engage dash");
                    }
                }
                None => agent.set_velocity(steering::stop()),
            }
        }

        tick.attack = agent.basic_attack(enemies);
        tick
    }

    fn update_guard(&mut self, agent: &mut Agent, enemies: &mut [Enemy]) -> AiTick {
        let guard = &self.abilities.guard;
        self.apply_guard_reduction(agent);

        let from = agent.position();
        let target = Self::threat_model(agent)
            .primary_threat(from, enemies)
            .map(Enemy::position);
        let velocity = match target {
            Some(target) if count_within(from, enemies, guard.crowd_radius) >= guard.crowd_threshold => {
                steering::flee(from, target, agent.speed() * guard.retreat_speed_factor)
            }
            _ => steering::stop(),
        };
        agent.set_velocity(velocity);

        let attack = if agent.health() > agent.max_health() * guard.counter_health_fraction {
            agent.basic_attack(enemies)
        } else {
            None
        };
        AiTick {
            ability: None,
            attack,
        }
    }

    fn update_evade(&mut self, agent: &mut Agent, enemies: &mut [Enemy]) -> AiTick {
        if let StrategyState::Evade { dash: Some(d) } = &self.state {
            agent.set_velocity(d.velocity);
            return AiTick::default();
        }

        let evade = &self.abilities.evade;
        let from = agent.position();
        if let Some(nearest) = nearest_enemy(from, enemies).map(Enemy::position) {
            let dist = from.distance(nearest);
            if dist < evade.trigger_distance && self.special_cooldown_ms <= 0.0 {
                let velocity = steering::flee(from, nearest, evade.dash_speed);
                agent.set_velocity(velocity);
                agent.set_invulnerable(true);
                self.special_cooldown_ms = evade.cooldown_ms;
                self.state = StrategyState::Evade {
                    dash: Some(Dash {
                        timer: Countdown::started(evade.dash_duration_ms),
                        velocity,
                    }),
                };
                debug!("Evade dash");
                return AiTick {
                    ability: Some(Ability::EvadeDash),
                    attack: None,
                };
            }

            let speed = agent.speed();
            let velocity = if dist < evade.min_distance {
                steering::flee(from, nearest, speed * evade.flee_speed_factor)
            } else if dist > evade.max_distance {
                steering::seek(from, nearest, speed * evade.seek_speed_factor)
            } else {
                steering::orbit(from, nearest, evade.orbit_distance, speed * evade.orbit_speed_factor)
            };
            agent.set_velocity(velocity);
        } else {
            agent.set_velocity(steering::stop());
        }

        let attack = if agent.is_post_evade_window_open() {
            agent.basic_attack(enemies)
        } else {
            None
        };
        AiTick {
            ability: None,
            attack,
        }
    }

    fn update_burst(&mut self, agent: &mut Agent, enemies: &mut [Enemy]) -> AiTick {
        let burst = &self.abilities.burst;

        if matches!(self.state, StrategyState::Burst(BurstPhase::Idle))
            && self.special_cooldown_ms <= 0.0
        {
            agent.scale_attack_cooldown(burst.active_cooldown_factor);
            agent.set_damage_multiplier(burst.damage_multiplier);
            self.special_cooldown_ms = burst.cooldown_ms;
            self.state = StrategyState::Burst(BurstPhase::Active(Countdown::started(burst.active_ms)));
            info!("Burst activated");
            return AiTick {
                ability: Some(Ability::BurstActivated),
                attack: None,
            };
        }

        let from = agent.position();
        if let Some(target) = Self::threat_model(agent)
            .primary_threat(from, enemies)
            .map(Enemy::position)
        {
            let dist = from.distance(target);
            let speed = agent.speed();
            let velocity = if dist < burst.min_distance {
                steering::flee(from, target, speed * burst.flee_speed_factor)
            } else if dist > burst.max_distance {
                steering::seek(from, target, speed * burst.seek_speed_factor)
            } else {
                steering::orbit(from, target, burst.hold_distance, speed)
            };
            agent.set_velocity(velocity);
        }

        let attack = if self.is_burst_active() {
            agent.basic_attack(enemies)
        } else {
            None
        };
        AiTick {
            ability: None,
            attack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{AgentBalance, EnemyBalance};
    use crate::enemy::Archetype;
    use crate::traits::TraitId;
    use skirmish_common::approx_eq;

    const ORIGIN: Vec2 = Vec2::new(500.0, 500.0);

    fn setup(strategy: Strategy) -> (AgentAi, Agent) {
        let mut ai = AgentAi::new(AbilityBalance::default());
        let mut agent = Agent::new(&AgentBalance::default(), ORIGIN, []);
        ai.set_strategy(strategy, &mut agent);
        (ai, agent)
    }

    fn rusher(dx: f32, dy: f32) -> Enemy {
        Enemy::new(
            Archetype::Rusher,
            ORIGIN + Vec2::new(dx, dy),
            &EnemyBalance::default(),
        )
    }

    #[test]
    fn test_engage_dash_triggers_in_range() {
        let (mut ai, mut agent) = setup(Strategy::Engage);
        let mut enemies = vec![rusher(150.0, 0.0)];
        let tick = ai.update(&mut agent, &mut enemies, 16.0);
        assert_eq!(tick.ability, Some(Ability::EngageDash));
        assert_eq!(ai.special_cooldown_ms(), 2000.0);
        assert!(approx_eq(agent.velocity().length(), 420.0));
        assert!(ai.is_dashing());
    }

    #[test]
    fn test_engage_dash_not_triggered_out_of_range() {
        let (mut ai, mut agent) = setup(Strategy::Engage);
        let mut enemies = vec![rusher(250.0, 0.0)];
        let tick = ai.update(&mut agent, &mut enemies, 16.0);
        assert_eq!(tick.ability, None);
        assert_eq!(ai.special_cooldown_ms(), 0.0);
        assert!(approx_eq(agent.velocity().length(), 140.0));
    }

    #[test]
    fn test_engage_dash_stops_after_duration() {
        let (mut ai, mut agent) = setup(Strategy::Engage);
        let mut enemies = vec![rusher(150.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 16.0);
        for _ in 0..11 {
            ai.update(&mut agent, &mut enemies, 16.0);
            assert!(approx_eq(agent.velocity().length(), 420.0));
        }
        // 12th tick after the dash crosses 180ms.
        ai.update(&mut agent, &mut enemies, 16.0);
        assert!(!ai.is_dashing());
    }

    #[test]
    fn test_overclock_charge_extends_dash() {
        let mut ai = AgentAi::new(AbilityBalance::default());
        let mut agent = Agent::new(&AgentBalance::default(), ORIGIN, [TraitId::OverclockCharge]);
        let mut enemies = vec![rusher(150.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 16.0);
        assert!(approx_eq(agent.velocity().length(), 525.0));
    }

    #[test]
    fn test_guard_crowd_flees() {
        let (mut ai, mut agent) = setup(Strategy::Guard);
        let mut enemies = vec![rusher(100.0, 0.0), rusher(0.0, 120.0), rusher(-140.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 16.0);
        assert!(approx_eq(agent.velocity().length(), 70.0));
        assert_eq!(agent.damage_reduction(), 0.5);
    }

    #[test]
    fn test_guard_small_group_holds() {
        let (mut ai, mut agent) = setup(Strategy::Guard);
        let mut enemies = vec![rusher(100.0, 0.0), rusher(0.0, 120.0), rusher(-300.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 16.0);
        assert_eq!(agent.velocity(), Vec2::ZERO);
        assert_eq!(agent.damage_reduction(), 0.5);
    }

    #[test]
    fn test_guard_reduction_without_enemies() {
        let (mut ai, mut agent) = setup(Strategy::Guard);
        ai.update(&mut agent, &mut [], 16.0);
        assert_eq!(agent.damage_reduction(), 0.5);
    }

    #[test]
    fn test_guard_no_attack_at_low_health() {
        let (mut ai, mut agent) = setup(Strategy::Guard);
        agent.set_damage_reduction(0.0);
        agent.take_damage(60.0);
        let mut enemies = vec![rusher(30.0, 0.0)];
        let tick = ai.update(&mut agent, &mut enemies, 16.0);
        assert!(tick.attack.is_none());
    }

    #[test]
    fn test_adaptive_shield_raises_guard_reduction() {
        let mut ai = AgentAi::new(AbilityBalance::default());
        let mut agent = Agent::new(&AgentBalance::default(), ORIGIN, [TraitId::AdaptiveShield]);
        ai.set_strategy(Strategy::Guard, &mut agent);
        assert!(approx_eq(agent.damage_reduction(), 0.6));
    }

    #[test]
    fn test_leaving_guard_clears_reduction() {
        let (mut ai, mut agent) = setup(Strategy::Guard);
        assert!(ai.set_strategy(Strategy::Engage, &mut agent));
        assert_eq!(agent.damage_reduction(), 0.0);
    }

    #[test]
    fn test_evade_dash_and_window() {
        let (mut ai, mut agent) = setup(Strategy::Evade);
        let mut enemies = vec![rusher(100.0, 0.0)];
        let tick = ai.update(&mut agent, &mut enemies, 20.0);
        assert_eq!(tick.ability, Some(Ability::EvadeDash));
        assert!(agent.is_invulnerable());
        assert_eq!(ai.special_cooldown_ms(), 1000.0);
        assert!(agent.velocity().x < 0.0);
        assert!(approx_eq(agent.velocity().length(), 520.0));

        for _ in 0..5 {
            ai.update(&mut agent, &mut enemies, 20.0);
        }
        assert!(agent.is_invulnerable());
        // Sixth tick crosses 120ms.
        ai.update(&mut agent, &mut enemies, 20.0);
        assert!(!agent.is_invulnerable());
        assert!(agent.is_post_evade_window_open());
        assert!(!ai.is_dashing());
    }

    #[test]
    fn test_evade_distance_bands() {
        let (mut ai, mut agent) = setup(Strategy::Evade);
        let mut far = vec![rusher(400.0, 0.0)];
        ai.update(&mut agent, &mut far, 16.0);
        assert!(approx_eq(agent.velocity().length(), 112.0));
        assert!(agent.velocity().x > 0.0);

        let mut mid = vec![rusher(250.0, 0.0)];
        ai.update(&mut agent, &mut mid, 16.0);
        assert!(approx_eq(agent.velocity().length(), 84.0));
    }

    #[test]
    fn test_evade_flees_while_on_cooldown() {
        let (mut ai, mut agent) = setup(Strategy::Evade);
        let mut enemies = vec![rusher(100.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 20.0);
        for _ in 0..6 {
            ai.update(&mut agent, &mut enemies, 20.0);
        }
        ai.update(&mut agent, &mut enemies, 20.0);
        assert!(approx_eq(agent.velocity().length(), 168.0));
        assert!(agent.velocity().x < 0.0);
    }

    #[test]
    fn test_leaving_evade_cancels_dash() {
        let (mut ai, mut agent) = setup(Strategy::Evade);
        let mut enemies = vec![rusher(100.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 20.0);
        assert!(agent.is_invulnerable());
        ai.set_strategy(Strategy::Guard, &mut agent);
        assert!(!agent.is_invulnerable());
        assert_eq!(agent.velocity(), Vec2::ZERO);

        // The stale dash never opens a window.
        for _ in 0..10 {
            ai.update(&mut agent, &mut enemies, 20.0);
        }
        assert!(!agent.is_post_evade_window_open());
    }

    #[test]
    fn test_burst_cycle_timing() {
        let (mut ai, mut agent) = setup(Strategy::Burst);
        let mut enemies: Vec<Enemy> = Vec::new();
        let dt = 100.0;

        // t = 0
        let tick = ai.update(&mut agent, &mut enemies, dt);
        assert_eq!(tick.ability, Some(Ability::BurstActivated));
        let mut t = 0.0;
        while t < 3000.0 {
            if t < 1500.0 {
                assert!(ai.is_burst_active(), "active at {t}");
                assert_eq!(agent.damage_multiplier(), 1.3);
                assert_eq!(agent.attack_cooldown_max_ms(), 300.0);
            } else if t < 2500.0 {
                assert!(ai.is_fatigued(), "fatigued at {t}");
                assert_eq!(agent.attack_cooldown_max_ms(), 900.0);
                assert!(approx_eq(agent.speed(), 84.0));
            } else {
                assert!(!ai.is_burst_active() && !ai.is_fatigued());
                assert_eq!(agent.attack_cooldown_max_ms(), 600.0);
                assert_eq!(agent.speed(), 140.0);
                assert_eq!(agent.damage_multiplier(), 1.0);
            }
            t += dt;
            let tick = ai.update(&mut agent, &mut enemies, dt);
            if t < 3000.0 {
                assert_eq!(tick.ability, None, "not ready at {t}");
            } else {
                assert_eq!(tick.ability, Some(Ability::BurstActivated));
            }
        }
    }

    #[test]
    fn test_burst_no_attack_while_fatigued() {
        let (mut ai, mut agent) = setup(Strategy::Burst);
        let mut enemies = vec![rusher(100.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 1500.0);
        ai.update(&mut agent, &mut enemies, 1500.0);
        assert!(ai.is_fatigued());
        agent.tick_timers(1000.0);
        let tick = ai.update(&mut agent, &mut enemies, 10.0);
        assert!(tick.attack.is_none());
    }

    #[test]
    fn test_leaving_burst_resets_modifiers() {
        let (mut ai, mut agent) = setup(Strategy::Burst);
        ai.update(&mut agent, &mut [], 16.0);
        ai.update(&mut agent, &mut [], 1500.0);
        assert!(ai.is_fatigued());
        assert!(approx_eq(agent.speed(), 84.0));

        ai.set_strategy(Strategy::Engage, &mut agent);
        assert!(!ai.is_burst_active() && !ai.is_fatigued());
        assert_eq!(agent.speed(), 140.0);
        assert_eq!(agent.attack_cooldown_max_ms(), 600.0);
        assert_eq!(agent.damage_multiplier(), 1.0);
    }

    #[test]
    fn test_cooldown_shared_across_strategies() {
        let (mut ai, mut agent) = setup(Strategy::Engage);
        let mut enemies = vec![rusher(150.0, 0.0)];
        ai.update(&mut agent, &mut enemies, 16.0);
        assert_eq!(ai.special_cooldown_ms(), 2000.0);
        ai.set_strategy(Strategy::Burst, &mut agent);
        assert_eq!(ai.special_cooldown_ms(), 2000.0);
        let tick = ai.update(&mut agent, &mut enemies, 16.0);
        assert_eq!(tick.ability, None);
    }

    #[test]
    fn test_same_strategy_is_noop() {
        let (mut ai, mut agent) = setup(Strategy::Engage);
        assert!(!ai.set_strategy(Strategy::Engage, &mut agent));
    }
}
