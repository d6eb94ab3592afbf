//! Kill resolution: the single exit path for every monster death.
//!
//! All deaths, whatever the cause, pass through [`resolve_kill`]. It
//! emits the death event, grants loot for tower kills, and queues the
//! entity for despawn. Callers mark the monster's phase `Dead` before
//! calling, so a unit can never be resolved twice.

use glam::DVec2;
use tracing::warn;

use castle_core::catalog;
use castle_core::constants::{BOSS_COIN_BONUS, KILL_COIN_REWARD};
use castle_core::enums::{DeathCause, UnitKind};
use castle_core::events::GameEvent;
use castle_core::ledger::{Ledger, Resource};

/// Resolve one monster death. `killer` is the tower that landed the
/// final hit, present only for [`DeathCause::TowerDamage`].
#[allow(clippy::too_many_arguments)]
pub fn resolve_kill(
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<hecs::Entity>,
    entity: hecs::Entity,
    kind: UnitKind,
    position: DVec2,
    cause: DeathCause,
    killer: Option<u32>,
) {
    despawn_buffer.push(entity);
    events.push(GameEvent::DeathAnimation {
        kind,
        position,
        cause,
    });

    if !cause.awards_loot() {
        // Failsafe deaths are reported but never rewarded.
        warn!(?kind, ?cause, x = position.x, y = position.y, "environment kill");
        return;
    }

    if let Some(tower_number) = killer {
        events.push(GameEvent::KillRecorded { kind, tower_number });
    }

    let mut grant = |resource: Resource, amount: u64| {
        ledger.deposit(resource, amount);
        events.push(GameEvent::LootDropped { resource, amount });
    };

    grant(Resource::MonsterCoins, KILL_COIN_REWARD);
    if let UnitKind::Boss(boss) = kind {
        grant(Resource::MonsterCoins, BOSS_COIN_BONUS);
        grant(catalog::boss_core(boss), 1);
    }
}
