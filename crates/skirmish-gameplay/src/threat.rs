//! Threat scoring.
//!
//! `score = (1000 / (distance + 1)) * 2 + damage * 1.5`, halved for enemies
//! below 30% health, then scaled by the sniper weight for snipers. Scores are
//! recomputed on every call since positions and health change every tick.

use skirmish_common::{EntityId, Vec2};

use crate::enemy::{Archetype, Enemy};

/// Proximity numerator.
pub const PROXIMITY_SCALE: f32 = 1000.0;
/// Weight of the proximity term.
pub const PROXIMITY_WEIGHT: f32 = 2.0;
/// Weight of the damage term.
pub const DAMAGE_WEIGHT: f32 = 1.5;
/// Health fraction below which an enemy counts as wounded.
pub const WOUNDED_FRACTION: f32 = 0.3;
/// Score factor for wounded enemies.
pub const WOUNDED_FACTOR: f32 = 0.5;

/// One enemy's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatScore {
    /// Index into the evaluated slice
    pub index: usize,
    /// Enemy id
    pub enemy_id: EntityId,
    /// Score
    pub score: f32,
}

/// Scores live enemies relative to the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatModel {
    sniper_weight: f32,
}

impl Default for ThreatModel {
    fn default() -> Self {
        Self { sniper_weight: 1.0 }
    }
}

impl ThreatModel {
    /// Model with neutral weights.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Model scaling sniper scores by `weight`.
    #[must_use]
    pub fn with_sniper_weight(mut self, weight: f32) -> Self {
        self.sniper_weight = weight.max(0.0);
        self
    }

    /// Sniper weight in use.
    #[must_use]
    pub const fn sniper_weight(&self) -> f32 {
        self.sniper_weight
    }

    /// Score of one enemy seen from `agent_pos`.
    #[must_use]
    pub fn score(&self, agent_pos: Vec2, enemy: &Enemy) -> f32 {
        let distance = agent_pos.distance(enemy.position());
        let mut score =
            (PROXIMITY_SCALE / (distance + 1.0)) * PROXIMITY_WEIGHT + enemy.damage() * DAMAGE_WEIGHT;

        if enemy.health() < enemy.max_health() * WOUNDED_FRACTION {
            score *= WOUNDED_FACTOR;
        }
        if enemy.archetype() == Archetype::Sniper {
            score *= self.sniper_weight;
        }
        score
    }

    /// Scores of every live enemy, in slice order.
    #[must_use]
    pub fn evaluate(&self, agent_pos: Vec2, enemies: &[Enemy]) -> Vec<ThreatScore> {
        enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_active())
            .map(|(index, e)| ThreatScore {
                index,
                enemy_id: e.id(),
                score: self.score(agent_pos, e),
            })
            .collect()
    }

    /// Highest-scoring live enemy. The first maximal score wins ties.
    #[must_use]
    pub fn primary_threat<'a>(&self, agent_pos: Vec2, enemies: &'a [Enemy]) -> Option<&'a Enemy> {
        let mut best: Option<(f32, &Enemy)> = None;
        for enemy in enemies.iter().filter(|e| e.is_active()) {
            let score = self.score(agent_pos, enemy);
            match best {
                Some((top, _)) if score <= top => {}
                _ => best = Some((score, enemy)),
            }
        }
        best.map(|(_, e)| e)
    }

    /// Up to `n` live enemies by descending score. Equal scores keep slice order.
    #[must_use]
    pub fn top_threats(&self, agent_pos: Vec2, enemies: &[Enemy], n: usize) -> Vec<ThreatScore> {
        let mut scores = self.evaluate(agent_pos, enemies);
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores.truncate(n);
        scores
    }
}

/// Nearest live enemy to `pos`.
#[must_use]
pub fn nearest_enemy(pos: Vec2, enemies: &[Enemy]) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_active())
        .min_by(|a, b| {
            pos.distance_squared(a.position())
                .total_cmp(&pos.distance_squared(b.position()))
        })
}

/// Number of live enemies within `radius` of `pos`.
#[must_use]
pub fn count_within(pos: Vec2, enemies: &[Enemy], radius: f32) -> usize {
    enemies
        .iter()
        .filter(|e| e.is_active() && pos.distance(e.position()) <= radius)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::EnemyBalance;

    fn enemy(archetype: Archetype, x: f32) -> Enemy {
        Enemy::new(archetype, Vec2::new(x, 0.0), &EnemyBalance::default())
    }

    #[test]
    fn test_score_formula() {
        let model = ThreatModel::new();
        let rusher = enemy(Archetype::Rusher, 99.0);
        // 1000/100*2 + 8*1.5
        assert!((model.score(Vec2::ZERO, &rusher) - 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_wounded_enemies_deprioritised() {
        let model = ThreatModel::new();
        let mut rusher = enemy(Archetype::Rusher, 99.0);
        rusher.take_damage(20.0);
        assert!((model.score(Vec2::ZERO, &rusher) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_primary_threat_first_max_wins() {
        let model = ThreatModel::new();
        let enemies = vec![
            enemy(Archetype::Rusher, 100.0),
            enemy(Archetype::Rusher, -100.0),
        ];
        let primary = model.primary_threat(Vec2::ZERO, &enemies).expect("threat");
        assert_eq!(primary.id(), enemies[0].id());
    }

    #[test]
    fn test_primary_threat_skips_dead() {
        let model = ThreatModel::new();
        let mut enemies = vec![enemy(Archetype::Rusher, 10.0), enemy(Archetype::Rusher, 300.0)];
        enemies[0].take_damage(100.0);
        let primary = model.primary_threat(Vec2::ZERO, &enemies).expect("threat");
        assert_eq!(primary.id(), enemies[1].id());
        assert!(model.primary_threat(Vec2::ZERO, &[]).is_none());
    }

    #[test]
    fn test_sniper_weight_reorders() {
        let enemies = vec![enemy(Archetype::Rusher, 100.0), enemy(Archetype::Sniper, 200.0)];
        let neutral = ThreatModel::new();
        assert_eq!(
            neutral.primary_threat(Vec2::ZERO, &enemies).map(Enemy::archetype),
            Some(Archetype::Rusher)
        );
        let redirected = ThreatModel::new().with_sniper_weight(1.5);
        assert_eq!(
            redirected.primary_threat(Vec2::ZERO, &enemies).map(Enemy::archetype),
            Some(Archetype::Sniper)
        );
    }

    #[test]
    fn test_top_threats_sorted_and_truncated() {
        let model = ThreatModel::new();
        let enemies = vec![
            enemy(Archetype::Rusher, 400.0),
            enemy(Archetype::Rusher, 50.0),
            enemy(Archetype::Elite, 200.0),
        ];
        let top = model.top_threats(Vec2::ZERO, &enemies, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].index, 1);
        assert_eq!(top[1].index, 2);
        assert!(top[0].score >= top[1].score);
    }

    #[test]
    fn test_nearest_and_count() {
        let enemies = vec![
            enemy(Archetype::Rusher, 140.0),
            enemy(Archetype::Rusher, -60.0),
            enemy(Archetype::Rusher, 151.0),
        ];
        assert_eq!(
            nearest_enemy(Vec2::ZERO, &enemies).map(Enemy::id),
            Some(enemies[1].id())
        );
        assert_eq!(count_within(Vec2::ZERO, &enemies, 150.0), 2);
    }
}
