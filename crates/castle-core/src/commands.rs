//! Player commands sent from the frontend to the simulation.
//!
//! Commands are validated and queued for processing at the next tick
//! boundary. Invalid commands (unknown tower, unaffordable cost, wrong
//! phase) are discarded without effect.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::StatMultipliers;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Wave control ---
    /// Start the next wave. Ignored while a wave is already active.
    StartWave,
    /// Pause the simulation.
    Pause,
    /// Resume from pause.
    Resume,
    /// Acknowledge defeat and keep playing with a restored castle.
    ContinueAfterDefeat,

    // --- Towers ---
    /// Build a tower, deducting its cost from the ledger.
    PlaceTower {
        archetype: TowerArchetype,
        position: DVec2,
    },
    /// Demolish a tower. No refund.
    RemoveTower { tower_number: u32 },
    /// Raise one upgrade track on a tower by one level.
    UpgradeTower {
        tower_number: u32,
        track: UpgradeTrack,
    },

    // --- Castle ---
    /// Raise one castle track by one level.
    UpgradeCastle { track: CastleTrack },

    // --- Items ---
    /// Equip an item into a tower slot, replacing whatever was there.
    EquipItem {
        tower_number: u32,
        slot: ItemSlot,
        item: TowerItem,
    },
    /// Clear a tower item slot.
    UnequipItem { tower_number: u32, slot: ItemSlot },

    // --- Progression ---
    /// Broadcast externally computed stat multipliers onto all towers.
    SetGlobalMultipliers { multipliers: StatMultipliers },

    // --- Challenge mode ---
    /// Enter a challenge run against a single monster kind at the given
    /// tier, suspending campaign waves.
    EnterChallenge {
        kind: MonsterKind,
        tier: ChallengeTier,
    },
    /// Abandon or finish a challenge run and restore the campaign wave.
    ExitChallenge,
}
