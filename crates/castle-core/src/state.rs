//! Game state snapshot and save records.
//!
//! The snapshot is the complete visible state sent to the frontend each
//! tick. Save records carry only authoritative inputs (levels, items,
//! ledger); every derived stat is recomputed on restore.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::ledger::{Ledger, Resource};
use crate::types::SimTime;

/// Complete game state broadcast to the frontend after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub wave: WaveView,
    pub castle: CastleView,
    /// Sorted by tower number.
    pub towers: Vec<TowerView>,
    /// Sorted by entity id.
    pub monsters: Vec<MonsterView>,
    /// Non-zero ledger balances in deterministic order.
    pub resources: Vec<(Resource, u64)>,
    pub events: Vec<GameEvent>,
}

/// Wave progression status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    pub wave_number: u32,
    /// Monsters still to spawn in the active wave.
    pub remaining_to_spawn: u32,
    /// Monsters currently alive on the field.
    pub alive: u32,
    /// Seconds the active wave has been running.
    pub elapsed_secs: f64,
    pub challenge: Option<ChallengeView>,
}

/// Active challenge run status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChallengeView {
    pub kind: MonsterKind,
    pub tier: ChallengeTier,
    pub wave_number: u32,
}

/// Castle status for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastleView {
    pub health: f64,
    pub max_health: f64,
    pub damage_reduction: f64,
    pub regen_per_sec: f64,
    pub health_level: u32,
    pub reduction_level: u32,
    pub regen_level: u32,
}

/// A placed tower for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub tower_number: u32,
    pub archetype: TowerArchetype,
    pub position: DVec2,
    pub damage: f64,
    pub attacks_per_second: f64,
    pub range: f64,
    pub area_radius: f64,
    pub slow_factor: f64,
    pub slow_duration: f64,
    pub items: [Option<TowerItem>; 2],
}

/// A live monster for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterView {
    /// hecs entity id bits, stable within a run.
    pub id: u64,
    pub kind: UnitKind,
    pub phase: MonsterPhase,
    pub position: DVec2,
    pub health: f64,
    pub max_health: f64,
    pub flying: bool,
    pub slowed: bool,
}

/// Persistent save record. Holds only authoritative inputs; derived
/// stats are rebuilt from the catalog on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub wave_number: u32,
    /// Campaign wave suspended by an active challenge, if any.
    pub challenge: Option<ChallengeSave>,
    pub castle: CastleSave,
    pub towers: Vec<TowerSave>,
    pub ledger: Ledger,
}

/// Suspended-campaign bookkeeping for a challenge run in progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChallengeSave {
    pub kind: MonsterKind,
    pub tier: ChallengeTier,
    pub wave_number: u32,
    /// Campaign wave to restore when the challenge ends.
    pub saved_wave_number: u32,
}

/// Castle save record: levels plus current health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastleSave {
    pub health_level: u32,
    pub reduction_level: u32,
    pub regen_level: u32,
    pub health: f64,
}

/// Tower save record: placement, levels, and items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerSave {
    pub tower_number: u32,
    pub archetype: TowerArchetype,
    pub position: DVec2,
    pub damage_level: u32,
    pub attack_speed_level: u32,
    pub range_level: u32,
    pub area_level: u32,
    pub slow_effect_level: u32,
    pub slow_duration_level: u32,
    pub items: [Option<TowerItem>; 2],
}
