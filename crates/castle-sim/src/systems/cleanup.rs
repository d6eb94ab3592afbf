//! Cleanup: numeric sanity sweep and deferred despawn.

use hecs::{Entity, World};
use tracing::warn;

use castle_core::components::{Health, Monster, Position};
use castle_core::enums::{DeathCause, MonsterPhase};
use castle_core::events::GameEvent;
use castle_core::ledger::Ledger;

use crate::loot;

/// Remove any monster whose position or health has gone non-finite.
/// This should never fire; it exists so one corrupted unit cannot poison
/// the rest of the simulation.
pub fn sanity_sweep(
    world: &mut World,
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    let mut faulted = Vec::new();
    for (entity, (monster, position, health)) in
        world.query_mut::<(&mut Monster, &Position, &Health)>()
    {
        if monster.phase == MonsterPhase::Dead {
            continue;
        }
        let finite = position.0.is_finite() && health.current.is_finite() && health.max.is_finite();
        if !finite {
            warn!(kind = ?monster.kind, "non-finite monster state, removing");
            monster.phase = MonsterPhase::Dead;
            faulted.push((entity, monster.kind, position.0));
        }
    }
    for (entity, kind, position) in faulted {
        // A non-finite position still identifies the unit in the event.
        loot::resolve_kill(
            ledger,
            events,
            despawn_buffer,
            entity,
            kind,
            position,
            DeathCause::NumericFault,
            None,
        );
    }
}

/// Despawn everything queued during this tick.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
