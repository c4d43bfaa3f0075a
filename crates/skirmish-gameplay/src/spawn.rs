//! Wave-based enemy spawning.
//!
//! The run is split into consecutive waves, each with its own spawn interval
//! and archetype chances. Enemies appear just outside a random arena edge.

use serde::{Deserialize, Serialize};
use tracing::debug;

use skirmish_common::Vec2;

use crate::balance::{ArenaBalance, EnemyBalance, SpawnBalance, WaveBalance};
use crate::enemy::Enemy;
use crate::random::RandomSource;

/// Arena edge an enemy enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    /// Above the arena
    Top,
    /// Right of the arena
    Right,
    /// Below the arena
    Bottom,
    /// Left of the arena
    Left,
}

impl SpawnEdge {
    /// Edges in selection order.
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Right,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
    ];
}

/// Emits enemies on the wave schedule.
#[derive(Debug, Clone)]
pub struct WaveSpawner {
    schedule: SpawnBalance,
    arena: ArenaBalance,
    last_spawn_secs: f32,
    spawned: u32,
}

impl WaveSpawner {
    /// Creates a spawner for the given schedule and arena.
    #[must_use]
    pub fn new(schedule: SpawnBalance, arena: ArenaBalance) -> Self {
        Self {
            schedule,
            arena,
            last_spawn_secs: 0.0,
            spawned: 0,
        }
    }

    /// Index and parameters of the wave active at `elapsed_secs`.
    ///
    /// The last wave stays active once the schedule is exhausted.
    #[must_use]
    pub fn wave_at(&self, elapsed_secs: f32) -> Option<(usize, &WaveBalance)> {
        let mut end = 0.0;
        for (index, wave) in self.schedule.waves.iter().enumerate() {
            end += wave.duration_secs;
            if elapsed_secs < end {
                return Some((index, wave));
            }
        }
        self.schedule
            .waves
            .last()
            .map(|w| (self.schedule.waves.len() - 1, w))
    }

    /// Total enemies spawned so far.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Spawns whatever is due at `elapsed_secs`.
    pub fn update(
        &mut self,
        elapsed_secs: f32,
        rng: &mut dyn RandomSource,
        enemies: &EnemyBalance,
    ) -> Option<Enemy> {
        let (index, wave) = self.wave_at(elapsed_secs)?;
        let interval_secs = wave.spawn_interval_ms / 1000.0;
        if elapsed_secs - self.last_spawn_secs < interval_secs {
            return None;
        }
        let archetype = wave.pick_archetype(rng.next_f32());
        let position = self.spawn_position(rng);

        self.last_spawn_secs = elapsed_secs;
        self.spawned += 1;
        debug!(
            "Wave {} spawned {} at ({:.0}, {:.0})",
            index + 1,
            archetype,
            position.x,
            position.y
        );
        Some(Enemy::new(archetype, position, enemies))
    }

    /// Point just outside a random edge.
    pub fn spawn_position(&self, rng: &mut dyn RandomSource) -> Vec2 {
        let margin = self.schedule.edge_margin;
        let (w, h) = (self.arena.width, self.arena.height);
        match SpawnEdge::ALL[rng.next_index(SpawnEdge::ALL.len())] {
            SpawnEdge::Top => Vec2::new(rng.next_f32() * w, -margin),
            SpawnEdge::Right => Vec2::new(w + margin, rng.next_f32() * h),
            SpawnEdge::Bottom => Vec2::new(rng.next_f32() * w, h + margin),
            SpawnEdge::Left => Vec2::new(-margin, rng.next_f32() * h),
        }
    }
}
