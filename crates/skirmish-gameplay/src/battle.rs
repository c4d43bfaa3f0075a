//! One timed encounter.
//!
//! [`Battle`] owns every piece of a run and advances them in a fixed order
//! on each [`Battle::update`]:
//!
//! 1. Timers: run clock and agent countdowns.
//! 2. Strategy: the AI moves the agent, triggers abilities, attacks.
//! 3. Entities: spawning, enemy behavior, hazards.
//! 4. Bookkeeping: telemetry ticks, then drains the event bus.
//! 5. Removal of dead enemies.
//!
//! Kills land in telemetry during step 4, before the enemy is removed.

use std::fmt;

use tracing::{debug, info};

use skirmish_common::Vec2;

use crate::agent::{Agent, AttackReport};
use crate::agent_ai::AgentAi;
use crate::balance::BalanceConfig;
use crate::enemy::{Archetype, Enemy, EnemyContext};
use crate::events::{CombatEvent, EventBus};
use crate::hazard::HazardField;
use crate::physics::PhysicsWorld;
use crate::random::RandomSource;
use crate::spawn::WaveSpawner;
use crate::strategy::Strategy;
use crate::telemetry::{RunResult, Telemetry, TelemetryRecord};
use crate::timer::RunTimer;
use crate::traits::TraitId;

/// A running encounter.
pub struct Battle {
    balance: BalanceConfig,
    agent: Agent,
    ai: AgentAi,
    enemies: Vec<Enemy>,
    hazards: HazardField,
    spawner: WaveSpawner,
    telemetry: Telemetry,
    timer: RunTimer,
    events: EventBus,
    physics: Box<dyn PhysicsWorld>,
    rng: Box<dyn RandomSource>,
    last_events: Vec<CombatEvent>,
    outcome: Option<RunResult>,
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("strategy", &self.ai.strategy())
            .field("elapsed_secs", &self.timer.elapsed_secs())
            .field("agent_health", &self.agent.health())
            .field("enemies", &self.enemies.len())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Battle {
    /// Sets up a run. The agent starts at the arena centre with `carried_traits`.
    pub fn new(
        balance: BalanceConfig,
        carried_traits: impl IntoIterator<Item = TraitId>,
        physics: Box<dyn PhysicsWorld>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let centre = physics.bounds().center();
        let agent = Agent::new(&balance.agent, centre, carried_traits);
        let traits: Vec<&str> = agent.traits().iter().map(TraitId::as_str).collect();
        info!(
            "Battle starting: {:.0}s run, traits [{}]",
            balance.run_duration_secs,
            traits.join(", ")
        );

        Self {
            ai: AgentAi::new(balance.abilities.clone()),
            hazards: HazardField::from_balance(&balance.hazards),
            spawner: WaveSpawner::new(balance.spawning.clone(), balance.arena.clone()),
            telemetry: Telemetry::with_evade_window(balance.abilities.evade.success_window_ms),
            timer: RunTimer::new(balance.run_duration_secs),
            events: EventBus::default(),
            enemies: Vec::new(),
            last_events: Vec::new(),
            outcome: None,
            agent,
            balance,
            physics,
            rng,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The agent.
    #[must_use]
    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The strategy engine.
    #[must_use]
    pub const fn ai(&self) -> &AgentAi {
        &self.ai
    }

    /// Active strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.ai.strategy()
    }

    /// Live enemies.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Hazards, for toggling.
    pub fn hazards_mut(&mut self) -> &mut HazardField {
        &mut self.hazards
    }

    /// Telemetry so far.
    #[must_use]
    pub const fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Run clock.
    #[must_use]
    pub const fn timer(&self) -> &RunTimer {
        &self.timer
    }

    /// Balance in use.
    #[must_use]
    pub const fn balance(&self) -> &BalanceConfig {
        &self.balance
    }

    /// Events drained during the last update.
    #[must_use]
    pub fn last_events(&self) -> &[CombatEvent] {
        &self.last_events
    }

    /// How the run ended, once it has.
    #[must_use]
    pub const fn outcome(&self) -> Option<RunResult> {
        self.outcome
    }

    /// Whether the run has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Switches the agent's strategy. Returns `false` if it was already active
    /// or the run is over.
    pub fn set_strategy(&mut self, strategy: Strategy) -> bool {
        if self.is_over() {
            return false;
        }
        let from = self.ai.strategy();
        let changed = self.ai.set_strategy(strategy, &mut self.agent);
        if changed {
            self.events.publish(CombatEvent::StrategyChanged { from, to: strategy });
        }
        changed
    }

    /// Places an enemy directly, outside the wave schedule.
    pub fn spawn_enemy(&mut self, archetype: Archetype, position: Vec2) {
        let enemy = Enemy::new(archetype, position, &self.balance.enemies);
        self.add_enemy(enemy);
    }

    fn add_enemy(&mut self, enemy: Enemy) {
        self.events.publish(CombatEvent::EnemySpawned {
            enemy_id: enemy.id(),
            archetype: enemy.archetype(),
        });
        self.enemies.push(enemy);
    }

    /// Advances the run by `dt_ms`. Returns the outcome on the tick the run ends.
    pub fn update(&mut self, dt_ms: f32) -> Option<RunResult> {
        if self.is_over() || dt_ms <= 0.0 {
            return None;
        }

        // Timers
        let time_up = self.timer.tick(dt_ms);
        self.agent.tick_timers(dt_ms);

        // Strategy
        let tick = self.ai.update(&mut self.agent, &mut self.enemies, dt_ms);
        if let Some(ability) = tick.ability {
            self.events.publish(CombatEvent::AbilityTriggered { ability });
        }
        if let Some(report) = &tick.attack {
            self.publish_attack(report);
        }
        let moved = self.physics.apply_velocity(
            self.agent.position(),
            self.agent.velocity(),
            dt_ms,
            Some(self.agent.radius()),
        );
        self.agent.set_position(moved);

        // Entities
        let elapsed = self.timer.elapsed_secs();
        if let Some(enemy) = self
            .spawner
            .update(elapsed, self.rng.as_mut(), &self.balance.enemies)
        {
            self.add_enemy(enemy);
        }
        let mut ctx = EnemyContext {
            agent: &mut self.agent,
            physics: self.physics.as_ref(),
            balance: &self.balance.enemies,
            events: &self.events,
        };
        for enemy in &mut self.enemies {
            enemy.update(&mut ctx, dt_ms);
        }
        self.hazards
            .update(&mut self.agent, self.physics.as_ref(), &self.events, dt_ms);

        // Bookkeeping
        self.telemetry
            .record_tick(self.ai.strategy(), dt_ms, self.agent.health_fraction());
        self.last_events = self.events.drain();
        for event in &self.last_events {
            self.telemetry.apply_event(event, elapsed);
        }

        // Removal
        self.enemies.retain(Enemy::is_active);

        let outcome = if !self.agent.is_alive() {
            Some(RunResult::Defeat)
        } else if time_up {
            Some(RunResult::Victory)
        } else {
            None
        };
        if let Some(result) = outcome {
            info!(
                "Run over: {} after {:.1}s ({} kills)",
                result.as_str(),
                elapsed,
                self.telemetry.record().kills.total()
            );
            self.outcome = Some(result);
        }
        outcome
    }

    fn publish_attack(&self, report: &AttackReport) {
        for hit in &report.hits {
            self.events.publish(CombatEvent::EnemyDamaged {
                enemy_id: hit.enemy_id,
                amount: hit.damage,
            });
            if hit.fatal {
                debug!("Agent killed {} {}", hit.archetype, hit.enemy_id);
                self.events.publish(CombatEvent::EnemyKilled {
                    enemy_id: hit.enemy_id,
                    archetype: Some(hit.archetype),
                });
            }
        }
        if report.healed > 0.0 {
            self.events.publish(CombatEvent::AgentHealed {
                amount: report.healed,
            });
        }
    }

    /// Ends the run and returns its frozen telemetry.
    ///
    /// A run abandoned before it ended counts as a defeat.
    #[must_use]
    pub fn finish(mut self) -> TelemetryRecord {
        // Events published after the last update, e.g. a final strategy switch.
        let elapsed = self.timer.elapsed_secs();
        for event in self.events.drain() {
            self.telemetry.apply_event(&event, elapsed);
        }
        let result = self.outcome.unwrap_or(RunResult::Defeat);
        self.telemetry.finalize_run(elapsed, result)
    }
}
