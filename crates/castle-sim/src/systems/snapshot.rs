//! Snapshot assembly: the complete visible state for one tick.
//!
//! Views are sorted (towers by number, monsters by entity id) so the
//! serialized snapshot is deterministic for a given world state.

use std::collections::BTreeMap;

use hecs::World;

use castle_core::components::{Health, Monster, Position, SlowStatus};
use castle_core::enums::GamePhase;
use castle_core::events::GameEvent;
use castle_core::ledger::Ledger;
use castle_core::state::{ChallengeView, GameStateSnapshot, MonsterView, WaveView};
use castle_core::types::SimTime;

use crate::castle::Castle;
use crate::systems::wave::WaveProgress;
use crate::tower::Tower;

#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    progress: &WaveProgress,
    castle: &Castle,
    towers: &BTreeMap<u32, Tower>,
    ledger: &Ledger,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    let mut monsters: Vec<MonsterView> = world
        .query::<(&Monster, &Position, &Health)>()
        .iter()
        .map(|(entity, (monster, position, health))| MonsterView {
            id: entity.id() as u64,
            kind: monster.kind,
            phase: monster.phase,
            position: position.0,
            health: health.current,
            max_health: health.max,
            flying: monster.flying,
            slowed: world.get::<&SlowStatus>(entity).is_ok(),
        })
        .collect();
    monsters.sort_by_key(|view| view.id);

    let alive = monsters.len() as u32;
    let wave = match &progress.active {
        Some(active) => WaveView {
            wave_number: active.wave_number,
            remaining_to_spawn: active.remaining_to_spawn,
            alive,
            elapsed_secs: active.elapsed_secs,
            challenge: challenge_view(progress),
        },
        None => WaveView {
            wave_number: progress.wave_number,
            remaining_to_spawn: 0,
            alive,
            elapsed_secs: 0.0,
            challenge: challenge_view(progress),
        },
    };

    GameStateSnapshot {
        time: *time,
        phase,
        wave,
        castle: castle.view(),
        towers: towers.values().map(Tower::view).collect(),
        monsters,
        resources: ledger.iter().collect(),
        events,
    }
}

fn challenge_view(progress: &WaveProgress) -> Option<ChallengeView> {
    progress.challenge.as_ref().map(|challenge| ChallengeView {
        kind: challenge.kind,
        tier: challenge.tier,
        wave_number: challenge.wave_number,
    })
}
