//! Monster lifecycle: slow decay, boss abilities, advance/attack
//! behavior, and the out-of-bounds and stuck failsafes.

use hecs::World;
use tracing::debug;

use castle_core::components::*;
use castle_core::constants::*;
use castle_core::enums::*;
use castle_core::events::GameEvent;
use castle_core::ledger::Ledger;

use crate::castle::Castle;
use crate::loot;

/// Run one tick of monster behavior.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    castle: &mut Castle,
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<hecs::Entity>,
    dt: f64,
) {
    decay_slows(world, dt);
    run_boss_abilities(world, dt);

    let footprint = Castle::footprint();
    let mut failsafe_kills: Vec<(hecs::Entity, UnitKind, glam::DVec2, DeathCause)> = Vec::new();

    for (entity, (monster, position, motion, tracker, slow)) in world.query_mut::<(
        &mut Monster,
        &mut Position,
        &Motion,
        &mut StuckTracker,
        Option<&SlowStatus>,
    )>() {
        match monster.phase {
            MonsterPhase::Advancing => {
                let slow_factor = slow.map_or(1.0, |s| s.factor);
                position.0 += motion.direction * motion.speed * slow_factor * dt;

                if footprint.on_boundary(position.0, CASTLE_BOUNDARY_THRESHOLD) {
                    monster.phase = MonsterPhase::AttackingCastle;
                    monster.attack_timer = monster.attack_interval;
                    tracker.stalled_secs = 0.0;
                } else {
                    // Progress watchdog: a monster that stops short of
                    // the castle for too long is removed.
                    let progress = position.0.distance(tracker.last_position);
                    if progress < STUCK_PROGRESS_EPSILON * dt {
                        tracker.stalled_secs += dt;
                    } else {
                        tracker.stalled_secs = 0.0;
                    }
                    tracker.last_position = position.0;
                    if tracker.stalled_secs > STUCK_TIMEOUT_SECS {
                        monster.phase = MonsterPhase::Dead;
                        failsafe_kills.push((entity, monster.kind, position.0, DeathCause::Stuck));
                        continue;
                    }
                }
            }
            MonsterPhase::AttackingCastle => {
                monster.attack_timer -= dt;
                while monster.attack_timer <= 0.0 {
                    monster.attack_timer += monster.attack_interval;
                    if !castle.take_damage(monster.damage) {
                        break;
                    }
                }
            }
            MonsterPhase::Dead => continue,
        }

        if out_of_bounds(position.0) {
            monster.phase = MonsterPhase::Dead;
            failsafe_kills.push((entity, monster.kind, position.0, DeathCause::OutOfBounds));
        }
    }

    for (entity, kind, position, cause) in failsafe_kills {
        loot::resolve_kill(
            ledger,
            events,
            despawn_buffer,
            entity,
            kind,
            position,
            cause,
            None,
        );
    }
}

/// Count down active slows and drop the expired ones.
fn decay_slows(world: &mut World, dt: f64) {
    let mut expired = Vec::new();
    for (entity, slow) in world.query_mut::<&mut SlowStatus>() {
        slow.remaining_secs -= dt;
        if slow.remaining_secs <= 0.0 {
            expired.push(entity);
        }
    }
    for entity in expired {
        let _ = world.remove_one::<SlowStatus>(entity);
    }
}

/// Tick boss ability cooldowns. The cooldown is suspended while the boss
/// is attacking the castle, so abilities only fire on the march.
fn run_boss_abilities(world: &mut World, dt: f64) {
    for (_entity, (monster, ability, health)) in
        world.query_mut::<(&Monster, &mut BossAbilityState, &mut Health)>()
    {
        if monster.phase != MonsterPhase::Advancing {
            continue;
        }
        ability.cooldown_remaining -= dt;
        if ability.cooldown_remaining > 0.0 {
            continue;
        }
        ability.cooldown_remaining += BOSS_ABILITY_COOLDOWN;
        match ability.ability {
            BossAbility::Heal => {
                let amount = health.max * BOSS_HEAL_FRACTION;
                health.current = (health.current + amount).min(health.max);
                debug!(kind = ?monster.kind, amount, "boss heal");
            }
            // The remaining abilities are flavor only; the cooldown
            // still cycles so a future effect slots in cleanly.
            BossAbility::Knockback | BossAbility::Teleport | BossAbility::SpawnMinions => {}
        }
    }
}

fn out_of_bounds(p: glam::DVec2) -> bool {
    p.x < -OUT_OF_BOUNDS_MARGIN
        || p.x > AREA_WIDTH + OUT_OF_BOUNDS_MARGIN
        || p.y < -OUT_OF_BOUNDS_MARGIN
        || p.y > AREA_HEIGHT + OUT_OF_BOUNDS_MARGIN
}
