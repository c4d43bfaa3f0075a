//! # Skirmish Gameplay
//!
//! Combat and progression core for Skirmish.
//!
//! This crate provides the headless simulation of one timed encounter and
//! the progression that carries between encounters:
//! - Strategy state machine driving the agent (ENGAGE, GUARD, EVADE, BURST)
//! - Steering and threat scoring
//! - Combat resolution with strategy, window and trait modifiers
//! - Enemy archetypes (Rusher, Sniper, Elite), wave spawning, hazards
//! - Per-run telemetry, growth resolution and trait grants
//! - Capped run history behind a key/value store
//! - Event bus for inter-system communication

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod agent_ai;
pub mod balance;
pub mod battle;
pub mod enemy;
pub mod events;
pub mod growth;
pub mod hazard;
pub mod physics;
pub mod random;
pub mod run_record;
pub mod spawn;
pub mod steering;
pub mod strategy;
pub mod telemetry;
pub mod threat;
pub mod timer;
pub mod traits;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::agent_ai::*;
    pub use crate::balance::*;
    pub use crate::battle::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::growth::*;
    pub use crate::hazard::*;
    pub use crate::physics::*;
    pub use crate::random::*;
    pub use crate::run_record::*;
    pub use crate::spawn::*;
    pub use crate::strategy::*;
    pub use crate::telemetry::*;
    pub use crate::threat::*;
    pub use crate::timer::*;
    pub use crate::traits::*;
}

pub use prelude::*;
