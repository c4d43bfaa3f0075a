//! End-to-end battles driven with deterministic random sources.

use skirmish_common::Vec2;
use skirmish_gameplay::*;

const TICK_MS: f32 = 16.0;

fn battle_with(balance: BalanceConfig, rng: Box<dyn RandomSource>, traits: Vec<TraitId>) -> Battle {
    let physics = ArenaPhysics::new(balance.arena.width, balance.arena.height);
    Battle::new(balance, traits, Box::new(physics), rng)
}

/// Plays a full run, rotating strategies every ten seconds.
fn play_rotation(seed: u64) -> (TelemetryRecord, Vec<CombatEvent>) {
    let mut battle = battle_with(
        BalanceConfig::default(),
        Box::new(SpawnRng::new(seed)),
        Vec::new(),
    );
    let mut seen = Vec::new();
    let mut ticks: u32 = 0;
    while !battle.is_over() {
        let slot = (ticks as f32 * TICK_MS / 10_000.0) as usize;
        battle.set_strategy(Strategy::ALL[slot % Strategy::ALL.len()]);
        battle.update(TICK_MS);
        seen.extend_from_slice(battle.last_events());
        ticks += 1;
        assert!(ticks < 10_000, "run never ended");
    }
    (battle.finish(), seen)
}

#[test]
fn test_full_run_ends_and_accounts_for_time() {
    let (record, events) = play_rotation(42);
    assert!(record.run_duration_secs > 0.0);
    assert!(record.run_duration_secs <= 120.0);

    let total_ms = record.strategy_time.total();
    assert!((total_ms - record.run_duration_secs * 1000.0).abs() < 100.0);

    let kills = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::EnemyKilled { .. }))
        .count();
    assert_eq!(record.kills.total() as usize, kills);
    assert_eq!(record.kills.unknown, 0);

    let switches = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::StrategyChanged { .. }))
        .count();
    assert_eq!(record.strategy_switch_count as usize, switches);
}

#[test]
fn test_same_seed_same_run() {
    let (a, _) = play_rotation(7);
    let (b, _) = play_rotation(7);
    assert_eq!(a, b);
}

#[test]
fn test_victory_run_is_full_length() {
    let mut balance = BalanceConfig::default();
    balance.run_duration_secs = 5.0;
    balance.spawning.waves[0].spawn_interval_ms = 60_000.0;
    let mut battle = battle_with(balance, Box::new(ScriptedRandom::constant(0.5)), Vec::new());

    let mut outcome = None;
    while outcome.is_none() {
        outcome = battle.update(TICK_MS);
    }
    assert_eq!(outcome, Some(RunResult::Victory));
    let record = battle.finish();
    assert_eq!(record.run_result, RunResult::Victory);
    assert!((record.run_duration_secs - 5.0).abs() < 1e-3);
    assert_eq!(record.hits_taken, 0);
}

#[test]
fn test_evade_dash_succeeds_without_damage() {
    let mut battle = battle_with(
        BalanceConfig::default(),
        Box::new(ScriptedRandom::constant(0.5)),
        Vec::new(),
    );
    let start = battle.agent().position();
    battle.spawn_enemy(Archetype::Rusher, start + Vec2::new(100.0, 0.0));
    battle.set_strategy(Strategy::Evade);

    battle.update(TICK_MS);
    assert!(battle.last_events().iter().any(|e| matches!(
        e,
        CombatEvent::AbilityTriggered {
            ability: Ability::EvadeDash
        }
    )));
    assert!(battle.agent().is_invulnerable());

    for _ in 0..40 {
        battle.update(TICK_MS);
    }
    let record = battle.telemetry().record();
    assert_eq!(record.evade_count, 1);
    assert_eq!(record.evade_success_count, 1);
    assert!(battle.agent().position().x < start.x);
}

#[test]
fn test_burst_cycle_counted_once() {
    let mut battle = battle_with(
        BalanceConfig::default(),
        Box::new(ScriptedRandom::constant(0.5)),
        Vec::new(),
    );
    battle.set_strategy(Strategy::Burst);
    for _ in 0..(2900.0 / TICK_MS) as usize {
        battle.update(TICK_MS);
    }
    assert_eq!(battle.telemetry().record().burst_activations, 1);
    assert!(!battle.ai().is_burst_active());
    assert!(!battle.ai().is_fatigued());
}

#[test]
fn test_carried_traits_reach_the_agent() {
    let battle = battle_with(
        BalanceConfig::default(),
        Box::new(ScriptedRandom::constant(0.5)),
        vec![TraitId::BloodExchange, TraitId::ThreatRedirect],
    );
    let traits = battle.agent().traits();
    assert!(traits.contains(TraitId::BloodExchange));
    assert!(traits.contains(TraitId::ThreatRedirect));
    assert!((battle.agent().modifiers().lifesteal_fraction - 0.03).abs() < 1e-6);
}

#[test]
fn test_hazard_damage_is_telemetry_hit() {
    let mut balance = BalanceConfig::default();
    balance.hazards.barriers = vec![BarrierSegment {
        x1: 900.0,
        y1: 540.0,
        x2: 1020.0,
        y2: 540.0,
    }];
    let mut battle = battle_with(balance, Box::new(ScriptedRandom::constant(0.5)), Vec::new());
    battle.set_strategy(Strategy::Guard);
    for _ in 0..10 {
        battle.update(TICK_MS);
    }
    let record = battle.telemetry().record();
    assert_eq!(record.hits_taken, 10);
    assert!(battle.agent().health() < battle.agent().max_health());

    battle.hazards_mut().set_active(false);
    battle.update(TICK_MS);
    assert_eq!(battle.telemetry().record().hits_taken, 10);
}
