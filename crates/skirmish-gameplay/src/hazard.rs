//! Electric barrier hazards.

use tracing::debug;

use skirmish_common::Vec2;

use crate::agent::{Agent, DamageOutcome};
use crate::balance::{BarrierSegment, HazardBalance};
use crate::events::{DamageSource, EventBus};
use crate::physics::{PhysicsWorld, Region};

/// A barrier dealing continuous damage to the agent while in contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricBarrier {
    start: Vec2,
    end: Vec2,
    width: f32,
    damage_per_second: f32,
    active: bool,
}

impl ElectricBarrier {
    /// Creates an active barrier between two points.
    #[must_use]
    pub fn new(start: Vec2, end: Vec2, width: f32, damage_per_second: f32) -> Self {
        Self {
            start,
            end,
            width,
            damage_per_second,
            active: true,
        }
    }

    /// Damage zone.
    #[must_use]
    pub fn region(&self) -> Region {
        Region::segment(self.start, self.end, self.width)
    }

    /// Whether the barrier deals damage.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Turns the barrier on or off.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Damages the agent if it touches the barrier this tick.
    pub fn update(&self, agent: &mut Agent, physics: &dyn PhysicsWorld, dt_ms: f32) -> DamageOutcome {
        if !self.active || agent.is_invulnerable() || !agent.is_alive() {
            return DamageOutcome::Ignored;
        }
        let body = Region::circle(agent.position(), agent.radius());
        if !physics.overlaps(&body, &self.region()) {
            return DamageOutcome::Ignored;
        }
        agent.take_damage(self.damage_per_second * (dt_ms / 1000.0))
    }
}

/// All barriers in the arena.
#[derive(Debug, Clone, Default)]
pub struct HazardField {
    barriers: Vec<ElectricBarrier>,
}

impl HazardField {
    /// Builds the configured barriers.
    #[must_use]
    pub fn from_balance(balance: &HazardBalance) -> Self {
        let barriers = balance
            .barriers
            .iter()
            .map(|&BarrierSegment { x1, y1, x2, y2 }| {
                ElectricBarrier::new(
                    Vec2::new(x1, y1),
                    Vec2::new(x2, y2),
                    balance.width,
                    balance.damage_per_second,
                )
            })
            .collect();
        Self { barriers }
    }

    /// Barriers in placement order.
    #[must_use]
    pub fn barriers(&self) -> &[ElectricBarrier] {
        &self.barriers
    }

    /// Turns every barrier on or off.
    pub fn set_active(&mut self, active: bool) {
        for barrier in &mut self.barriers {
            barrier.set_active(active);
        }
        debug!("Hazards {}", if active { "enabled" } else { "disabled" });
    }

    /// Applies contact damage from every barrier and publishes the hits.
    pub fn update(&self, agent: &mut Agent, physics: &dyn PhysicsWorld, events: &EventBus, dt_ms: f32) {
        for barrier in &self.barriers {
            let outcome = barrier.update(agent, physics, dt_ms);
            events.publish_agent_damage(outcome, agent.health_fraction(), DamageSource::Hazard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::AgentBalance;
    use crate::physics::ArenaPhysics;

    fn physics() -> ArenaPhysics {
        ArenaPhysics::new(1920.0, 1080.0)
    }

    #[test]
    fn test_barrier_damage_scales_with_dt() {
        let barrier = ElectricBarrier::new(Vec2::new(200.0, 200.0), Vec2::new(400.0, 400.0), 20.0, 20.0);
        let mut agent = Agent::new(&AgentBalance::default(), Vec2::new(300.0, 300.0), []);
        let outcome = barrier.update(&mut agent, &physics(), 500.0);
        assert!((outcome.amount() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_barrier_skips_invulnerable_and_inactive() {
        let mut barrier =
            ElectricBarrier::new(Vec2::new(200.0, 200.0), Vec2::new(400.0, 400.0), 20.0, 20.0);
        let mut agent = Agent::new(&AgentBalance::default(), Vec2::new(300.0, 300.0), []);
        agent.set_invulnerable(true);
        assert_eq!(barrier.update(&mut agent, &physics(), 1000.0), DamageOutcome::Ignored);

        agent.set_invulnerable(false);
        barrier.set_active(false);
        assert_eq!(barrier.update(&mut agent, &physics(), 1000.0), DamageOutcome::Ignored);
        assert_eq!(agent.health(), 100.0);
    }

    #[test]
    fn test_no_damage_away_from_barrier() {
        let field = HazardField::from_balance(&HazardBalance::default());
        let mut agent = Agent::new(&AgentBalance::default(), Vec2::new(960.0, 540.0), []);
        let events = EventBus::default();
        field.update(&mut agent, &physics(), &events, 1000.0);
        assert_eq!(agent.health(), 100.0);
        assert_eq!(events.pending_count(), 0);
    }

    #[test]
    fn test_field_toggle() {
        let mut field = HazardField::from_balance(&HazardBalance::default());
        assert_eq!(field.barriers().len(), 4);
        field.set_active(false);
        assert!(field.barriers().iter().all(|b| !b.is_active()));
    }
}
