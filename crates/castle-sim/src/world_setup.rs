//! Entity spawn factories for monsters and bosses.
//!
//! Monsters spawn along the top edge at a random X and march toward the
//! castle. Wave scaling multiplies regular monster health and damage;
//! bosses and all base speeds come straight from the catalog.

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use castle_core::catalog;
use castle_core::components::*;
use castle_core::constants::*;
use castle_core::enums::*;

use crate::castle::Castle;

/// Health and damage multiplier for monsters spawned on `wave_number`.
/// Grows stepwise every five waves.
pub fn wave_scale(wave_number: u32) -> f64 {
    1.2f64.powi((wave_number / 5) as i32)
}

/// Spawn a regular monster for the given wave.
pub fn spawn_monster(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    kind: MonsterKind,
    wave_number: u32,
) -> hecs::Entity {
    let spec = catalog::monster_spec(kind);
    let scale = wave_scale(wave_number);
    // Scaled stats are truncated to whole numbers.
    let health = (spec.max_health * scale).trunc();
    let damage = (spec.damage * scale).trunc();
    let position = spawn_position(rng);

    world.spawn((
        Monster {
            kind: UnitKind::Monster(kind),
            phase: MonsterPhase::Advancing,
            damage,
            flying: spec.flying,
            attack_interval: spec.attack_interval,
            attack_timer: spec.attack_interval,
        },
        Position(position),
        Motion {
            direction: direction_to_castle(position),
            speed: spec.speed,
        },
        Health {
            current: health,
            max: health,
        },
        StuckTracker {
            last_position: position,
            stalled_secs: 0.0,
        },
    ))
}

/// Spawn a boss. Bosses use their catalog stats unscaled and carry an
/// ability state on top of the regular monster bundle.
pub fn spawn_boss(world: &mut World, rng: &mut ChaCha8Rng, kind: BossKind) -> hecs::Entity {
    let spec = catalog::boss_spec(kind);
    let position = spawn_position(rng);

    world.spawn((
        Monster {
            kind: UnitKind::Boss(kind),
            phase: MonsterPhase::Advancing,
            damage: spec.damage,
            flying: false,
            attack_interval: BOSS_ATTACK_INTERVAL,
            attack_timer: BOSS_ATTACK_INTERVAL,
        },
        Position(position),
        Motion {
            direction: direction_to_castle(position),
            speed: spec.speed,
        },
        Health {
            current: spec.max_health,
            max: spec.max_health,
        },
        StuckTracker {
            last_position: position,
            stalled_secs: 0.0,
        },
        BossAbilityState {
            ability: spec.ability,
            cooldown_remaining: BOSS_ABILITY_COOLDOWN,
        },
    ))
}

fn spawn_position(rng: &mut ChaCha8Rng) -> DVec2 {
    DVec2::new(rng.gen_range(SPAWN_X_MIN..=SPAWN_X_MAX), SPAWN_Y)
}

/// Unit direction toward the castle center. Fixed at spawn; monsters
/// march in a straight line and trip the boundary test on arrival.
pub fn direction_to_castle(from: DVec2) -> DVec2 {
    (Castle::footprint().center - from).normalize_or_zero()
}
