//! Events emitted by the simulation for the frontend and progression sinks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::ledger::Resource;

/// Events produced during a tick, drained by the embedding layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A wave began spawning.
    WaveStarted {
        wave_number: u32,
        monster_count: u32,
        is_boss_wave: bool,
    },
    /// Every monster of the active wave is resolved.
    WaveCompleted { wave_number: u32 },
    /// Talent points earned by clearing a wave. Consumed by the external
    /// progression layer; the simulation only reports the award.
    TalentPointsAwarded { wave_number: u32, points: u32 },
    /// A challenge run cleared its final wave.
    ChallengeCompleted { tier: ChallengeTier },
    /// A unit died. Frontends key death effects off this.
    DeathAnimation {
        kind: UnitKind,
        position: DVec2,
        cause: DeathCause,
    },
    /// Kill credit for a tower-damage death.
    KillRecorded { kind: UnitKind, tower_number: u32 },
    /// Loot granted for a kill.
    LootDropped { resource: Resource, amount: u64 },
    /// Castle health reached zero.
    CastleDestroyed { wave_number: u32 },
}
