//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Regular monster archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Baseline attacker, always available.
    #[default]
    Grunt,
    /// Fast, fragile, rapid weak attacks.
    Runner,
    /// Slow, heavily armored, hard hits.
    Tank,
    /// Airborne; only anti-air towers can target it.
    Flyer,
}

/// Boss archetype. Bosses appear on every tenth wave in a fixed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossKind {
    Force,
    Spirit,
    Magic,
    Void,
}

/// Unit kind: either one of the regular monster archetypes or a boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Monster(MonsterKind),
    Boss(BossKind),
}

/// Monster lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterPhase {
    /// Marching toward the castle.
    #[default]
    Advancing,
    /// Stationary at the castle boundary, attacking on an interval.
    AttackingCastle,
    /// Defeated; despawned after kill resolution.
    Dead,
}

/// Boss active-ability kind. Only `Heal` has a battlefield effect; the
/// others are cosmetic placeholders carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAbility {
    Knockback,
    Heal,
    Teleport,
    SpawnMinions,
}

/// Tower archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerArchetype {
    /// Cheap single-target tower with anti-air capability.
    Archer,
    /// Slow, long-range, high-damage single-target tower with anti-air.
    Sniper,
    /// Area-of-effect tower; ground targets only.
    Splash,
    /// Slowing tower; ground targets only.
    Frozen,
}

/// Per-tower upgrade track. Which tracks exist depends on the archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeTrack {
    Damage,
    AttackSpeed,
    Range,
    AreaRadius,
    SlowEffect,
    SlowDuration,
}

/// Castle upgrade track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleTrack {
    Health,
    DamageReduction,
    Regeneration,
}

/// Equippable tower item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerItem {
    /// Boosts the tower's signature stat; grants single-target towers a
    /// small splash on hit.
    UnstoppableForce,
    /// Converts a fraction of damage dealt into castle healing.
    SereneSpirit,
    /// Grants single-target towers a chance to bounce to a second target.
    MultitudationVortex,
}

/// One of the two item slots on a tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSlot {
    First,
    Second,
}

/// Challenge difficulty tier. Scales monster counts in challenge mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ChallengeTier {
    /// Monster count multiplier for this tier.
    pub fn count_multiplier(&self) -> f64 {
        match self {
            ChallengeTier::Bronze => 1.0,
            ChallengeTier::Silver => 1.5,
            ChallengeTier::Gold => 2.0,
            ChallengeTier::Platinum => 3.0,
        }
    }
}

/// Cause of a monster's death, reported through kill resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Killed by tower damage. Awards loot.
    TowerDamage,
    /// Walked outside the play area margin. No loot.
    OutOfBounds,
    /// Made no progress for too long. No loot.
    Stuck,
    /// Force-killed by the wave timeout failsafe. Unlike the other
    /// failsafes this still runs the loot pipeline, so a timed-out wave
    /// pays out what the player would have earned.
    WaveTimeout,
    /// Position or health became non-finite. No loot.
    NumericFault,
}

impl DeathCause {
    /// Whether this death awards loot.
    pub fn awards_loot(&self) -> bool {
        matches!(self, DeathCause::TowerDamage | DeathCause::WaveTimeout)
    }
}

/// Result of applying damage to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Unit survived the hit.
    Absorbed,
    /// This hit moved the unit from alive to dead. Reported exactly once
    /// per unit lifetime.
    Defeated,
    /// Unit was already dead; the hit had no effect.
    AlreadyDead,
}

/// Top-level game phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Between waves, simulation idle.
    #[default]
    Idle,
    /// A wave is in progress.
    WaveActive,
    /// Simulation paused by command.
    Paused,
    /// Castle destroyed; awaiting a continue command.
    Defeat,
}
