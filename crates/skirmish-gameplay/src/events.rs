//! Event bus for combat bookkeeping.
//!
//! Entities publish what happened during a tick; the battle drains the bus
//! into telemetry before dead entities are removed, so every kill is counted
//! in the tick it happened.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use skirmish_common::EntityId;

use crate::agent::DamageOutcome;
use crate::enemy::Archetype;
use crate::strategy::Strategy;

/// Where damage to the agent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    /// Melee or charge contact from an enemy.
    Melee(Archetype),
    /// A sniper projectile.
    Projectile,
    /// An environmental hazard.
    Hazard,
}

/// A strategy special ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    /// ENGAGE dash attack.
    EngageDash,
    /// EVADE dash with i-frames.
    EvadeDash,
    /// BURST activation.
    BurstActivated,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Player switched strategy
    StrategyChanged {
        /// Previous strategy
        from: Strategy,
        /// New strategy
        to: Strategy,
    },
    /// A strategy ability fired
    AbilityTriggered {
        /// Which ability
        ability: Ability,
    },
    /// Agent lost health
    AgentDamaged {
        /// Health lost after reduction
        amount: f32,
        /// Health fraction after the hit
        health_fraction: f32,
        /// Origin
        source: DamageSource,
    },
    /// Agent health reached zero
    AgentDied,
    /// Agent healed through lifesteal
    AgentHealed {
        /// Health restored
        amount: f32,
    },
    /// Agent hit an enemy
    EnemyDamaged {
        /// Enemy hit
        enemy_id: EntityId,
        /// Damage dealt
        amount: f32,
    },
    /// An enemy's health reached zero
    EnemyKilled {
        /// Enemy killed
        enemy_id: EntityId,
        /// Archetype, if known
        archetype: Option<Archetype>,
    },
    /// A new enemy entered the arena
    EnemySpawned {
        /// Enemy spawned
        enemy_id: EntityId,
        /// Archetype
        archetype: Archetype,
    },
}

/// Unbounded channel carrying [`CombatEvent`]s.
///
/// Nothing published is ever dropped; the battle drains the bus every tick.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<CombatEvent>,
    receiver: Receiver<CombatEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Publishes an event.
    pub fn publish(&self, event: CombatEvent) {
        // The bus owns a receiver, so the channel cannot be disconnected.
        let _ = self.sender.send(event);
    }

    /// Publishes the events implied by a hit on the agent.
    pub fn publish_agent_damage(
        &self,
        outcome: DamageOutcome,
        health_fraction: f32,
        source: DamageSource,
    ) {
        if let DamageOutcome::Applied { amount, fatal } = outcome {
            self.publish(CombatEvent::AgentDamaged {
                amount,
                health_fraction,
                source,
            });
            if fatal {
                self.publish(CombatEvent::AgentDied);
            }
        }
    }

    /// Drains all pending events in publish order.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of undrained events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Extra publishing handle.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let bus = EventBus::new();
        bus.publish(CombatEvent::AgentDied);
        bus.publish(CombatEvent::AgentHealed { amount: 1.0 });
        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events[0], CombatEvent::AgentDied);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_large_burst_keeps_every_kill() {
        let bus = EventBus::new();
        for _ in 0..5000 {
            bus.publish(CombatEvent::EnemyKilled {
                enemy_id: EntityId::NULL,
                archetype: Some(Archetype::Rusher),
            });
        }
        let events = bus.drain();
        assert_eq!(events.len(), 5000);
        assert!(events
            .iter()
            .all(|e| matches!(e, CombatEvent::EnemyKilled { .. })));
    }

    #[test]
    fn test_ignored_damage_publishes_nothing() {
        let bus = EventBus::default();
        bus.publish_agent_damage(DamageOutcome::Ignored, 1.0, DamageSource::Hazard);
        assert_eq!(bus.pending_count(), 0);

        bus.publish_agent_damage(
            DamageOutcome::Applied {
                amount: 5.0,
                fatal: true,
            },
            0.0,
            DamageSource::Projectile,
        );
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], CombatEvent::AgentDied);
    }

    #[test]
    fn test_sender_handle_publishes() {
        let bus = EventBus::new();
        let tx = bus.sender();
        tx.send(CombatEvent::AgentDied).expect("send");
        assert_eq!(bus.pending_count(), 1);
    }
}
