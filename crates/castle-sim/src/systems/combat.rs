//! Tower combat: target acquisition, damage resolution, item effects,
//! and kill credit.
//!
//! Towers fire in tower-number order, and candidate lists are sorted by
//! distance with entity id as the tiebreak, so a given world state and
//! RNG state always resolves identically.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use castle_core::components::{Health, Monster, Position, SlowStatus};
use castle_core::constants::*;
use castle_core::enums::{DamageOutcome, DeathCause, MonsterPhase, TowerItem, UnitKind};
use castle_core::events::GameEvent;
use castle_core::ledger::Ledger;

use crate::castle::Castle;
use crate::loot;
use crate::tower::Tower;

/// Run one tick of tower fire.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    towers: &mut BTreeMap<u32, Tower>,
    castle: &mut Castle,
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<hecs::Entity>,
    dt: f64,
) {
    for tower in towers.values_mut() {
        tower.cooldown_remaining -= dt;
        while tower.cooldown_remaining <= 0.0 {
            let candidates = acquire_candidates(
                world,
                tower.position,
                tower.stats().range,
                tower.targets_flying(),
            );
            let Some(&(target, target_pos, _)) = candidates.first() else {
                // No target: hold fire without banking shots.
                tower.cooldown_remaining = 0.0;
                break;
            };
            fire(
                world,
                rng,
                tower,
                target,
                target_pos,
                &candidates,
                castle,
                ledger,
                events,
                despawn_buffer,
            );
            tower.cooldown_remaining += 1.0 / tower.stats().attacks_per_second;
        }
    }
}

/// Resolve a single shot from `tower` at `target`.
#[allow(clippy::too_many_arguments)]
fn fire(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    tower: &Tower,
    target: Entity,
    target_pos: DVec2,
    candidates: &[(Entity, DVec2, f64)],
    castle: &mut Castle,
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<hecs::Entity>,
) {
    let stats = *tower.stats();
    let mut kills = Vec::new();
    let mut damage_dealt = 0.0;

    if stats.area_radius > 0.0 {
        // Intrinsic splash: full damage to every candidate near the
        // primary target, each hit exactly once.
        for &(entity, pos, _) in candidates {
            if pos.distance(target_pos) <= stats.area_radius {
                damage_dealt += apply_damage(world, entity, stats.damage, &mut kills);
            }
        }
    } else if stats.slow_duration > 0.0 {
        // Slowing towers chill everything in range.
        for &(entity, _, _) in candidates {
            damage_dealt += apply_damage(world, entity, stats.damage, &mut kills);
            apply_slow(world, entity, stats.slow_factor, stats.slow_duration);
        }
    } else {
        // Single-target shot: only these can crit.
        let mut damage = stats.damage;
        if stats.crit_chance > 0.0 && rng.gen::<f64>() < stats.crit_chance {
            damage *= CRIT_MULTIPLIER;
        }
        damage_dealt += apply_damage(world, target, damage, &mut kills);

        if tower.has_item(TowerItem::UnstoppableForce) {
            // Item-granted splash: reduced damage around the target.
            let splash = damage * ITEM_SPLASH_DAMAGE_FRACTION;
            for &(entity, pos, _) in candidates {
                if entity != target && pos.distance(target_pos) <= ITEM_SPLASH_RADIUS {
                    damage_dealt += apply_damage(world, entity, splash, &mut kills);
                }
            }
        }

        if tower.has_item(TowerItem::MultitudationVortex) && rng.gen::<f64>() < ITEM_BOUNCE_CHANCE {
            let others: Vec<Entity> = candidates
                .iter()
                .map(|&(entity, _, _)| entity)
                .filter(|&entity| entity != target)
                .collect();
            if !others.is_empty() {
                let bounce = others[rng.gen_range(0..others.len())];
                damage_dealt += apply_damage(world, bounce, damage, &mut kills);
            }
        }
    }

    if tower.has_item(TowerItem::SereneSpirit) && damage_dealt > 0.0 {
        castle.heal(damage_dealt * ITEM_LIFESTEAL_FRACTION);
    }

    for (entity, kind, position) in kills {
        loot::resolve_kill(
            ledger,
            events,
            despawn_buffer,
            entity,
            kind,
            position,
            DeathCause::TowerDamage,
            Some(tower.tower_number),
        );
    }
}

/// Alive units in range, nearest first, entity id as the tiebreak.
fn acquire_candidates(
    world: &World,
    origin: DVec2,
    range: f64,
    targets_flying: bool,
) -> Vec<(Entity, DVec2, f64)> {
    let mut candidates: Vec<(Entity, DVec2, f64)> = world
        .query::<(&Monster, &Position)>()
        .iter()
        .filter(|(_, (monster, _))| monster.phase != MonsterPhase::Dead)
        .filter(|(_, (monster, _))| targets_flying || !monster.flying)
        .filter_map(|(entity, (_, position))| {
            let dist = origin.distance(position.0);
            (dist <= range).then_some((entity, position.0, dist))
        })
        .collect();
    candidates.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.id().cmp(&b.0.id())));
    candidates
}

/// Apply `amount` damage to a unit. Returns the damage actually dealt;
/// a unit that dies from the hit is appended to `kills` exactly once.
fn apply_damage(
    world: &mut World,
    entity: Entity,
    amount: f64,
    kills: &mut Vec<(Entity, UnitKind, DVec2)>,
) -> f64 {
    let Ok((monster, health, position)) =
        world.query_one_mut::<(&mut Monster, &mut Health, &Position)>(entity)
    else {
        return 0.0;
    };
    match damage_outcome(monster, health, amount) {
        DamageOutcome::AlreadyDead => 0.0,
        DamageOutcome::Absorbed => amount,
        DamageOutcome::Defeated => {
            kills.push((entity, monster.kind, position.0));
            amount
        }
    }
}

/// Pure damage transition. `Defeated` is returned only on the hit that
/// crosses from alive to dead.
pub fn damage_outcome(monster: &mut Monster, health: &mut Health, amount: f64) -> DamageOutcome {
    if monster.phase == MonsterPhase::Dead {
        return DamageOutcome::AlreadyDead;
    }
    health.current -= amount;
    if health.current <= 0.0 {
        health.current = 0.0;
        monster.phase = MonsterPhase::Dead;
        DamageOutcome::Defeated
    } else {
        DamageOutcome::Absorbed
    }
}

/// Apply or merge a slow on `target`: the strongest factor wins and the
/// longest remaining duration is kept. Slows never stack multiplicatively.
fn apply_slow(world: &mut World, target: Entity, factor: f64, duration: f64) {
    if let Ok(existing) = world.query_one_mut::<&mut SlowStatus>(target) {
        existing.factor = existing.factor.min(factor);
        existing.remaining_secs = existing.remaining_secs.max(duration);
        return;
    }
    let _ = world.insert_one(
        target,
        SlowStatus {
            factor,
            remaining_secs: duration,
        },
    );
}
