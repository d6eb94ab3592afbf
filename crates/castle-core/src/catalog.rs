//! Static data tables: unit stats, tower specs, build and upgrade costs.
//!
//! Everything here is a pure function of the archetype and level. Derived
//! stats are recomputed from these tables on every change, never mutated
//! in place, so stacked upgrades and items cannot drift.

use crate::constants::*;
use crate::enums::*;
use crate::ledger::{CostMap, Resource};

/// Base stats for a regular monster archetype, before wave scaling.
#[derive(Debug, Clone, Copy)]
pub struct MonsterSpec {
    pub max_health: f64,
    pub speed: f64,
    pub damage: f64,
    /// Seconds between attacks while at the castle boundary.
    pub attack_interval: f64,
    pub flying: bool,
}

/// Stats for a boss archetype. Bosses do not wave-scale.
#[derive(Debug, Clone, Copy)]
pub struct BossSpec {
    pub max_health: f64,
    pub speed: f64,
    pub damage: f64,
    pub ability: BossAbility,
}

/// Base stats and build cost for a tower archetype at level 1.
#[derive(Debug, Clone, Copy)]
pub struct TowerSpec {
    pub damage: f64,
    pub attacks_per_second: f64,
    pub range: f64,
    /// Splash radius; zero for single-target towers.
    pub area_radius: f64,
    /// Speed multiplier applied to slowed targets; 1.0 for non-slowing towers.
    pub slow_factor: f64,
    /// Slow duration in seconds; zero for non-slowing towers.
    pub slow_duration: f64,
    pub targets_flying: bool,
}

/// Base stats for a regular monster archetype.
pub fn monster_spec(kind: MonsterKind) -> MonsterSpec {
    match kind {
        MonsterKind::Grunt => MonsterSpec {
            max_health: 40.0,
            speed: 50.0,
            damage: 8.0,
            attack_interval: MONSTER_ATTACK_INTERVAL,
            flying: false,
        },
        MonsterKind::Runner => MonsterSpec {
            max_health: 15.0,
            speed: 100.0,
            damage: 3.0,
            attack_interval: 0.8,
            flying: false,
        },
        MonsterKind::Tank => MonsterSpec {
            max_health: 190.0,
            speed: 30.0,
            damage: 18.0,
            attack_interval: 1.5,
            flying: false,
        },
        MonsterKind::Flyer => MonsterSpec {
            max_health: 30.0,
            speed: 70.0,
            damage: 13.0,
            attack_interval: MONSTER_ATTACK_INTERVAL,
            flying: true,
        },
    }
}

/// Base stats for a boss archetype. Bosses never fly.
pub fn boss_spec(kind: BossKind) -> BossSpec {
    match kind {
        BossKind::Force => BossSpec {
            max_health: 500.0,
            speed: 40.0,
            damage: 50.0,
            ability: BossAbility::Knockback,
        },
        BossKind::Spirit => BossSpec {
            max_health: 400.0,
            speed: 50.0,
            damage: 40.0,
            ability: BossAbility::Heal,
        },
        BossKind::Magic => BossSpec {
            max_health: 450.0,
            speed: 45.0,
            damage: 45.0,
            ability: BossAbility::Teleport,
        },
        BossKind::Void => BossSpec {
            max_health: 600.0,
            speed: 35.0,
            damage: 60.0,
            ability: BossAbility::SpawnMinions,
        },
    }
}

/// Level-1 stats for a tower archetype.
pub fn tower_spec(archetype: TowerArchetype) -> TowerSpec {
    match archetype {
        TowerArchetype::Archer => TowerSpec {
            damage: 10.0,
            attacks_per_second: 1.5,
            range: 150.0,
            area_radius: 0.0,
            slow_factor: 1.0,
            slow_duration: 0.0,
            targets_flying: true,
        },
        TowerArchetype::Sniper => TowerSpec {
            damage: 50.0,
            attacks_per_second: 0.5,
            range: 300.0,
            area_radius: 0.0,
            slow_factor: 1.0,
            slow_duration: 0.0,
            targets_flying: true,
        },
        TowerArchetype::Splash => TowerSpec {
            damage: 20.0,
            attacks_per_second: 0.8,
            range: 200.0,
            area_radius: 50.0,
            slow_factor: 1.0,
            slow_duration: 0.0,
            targets_flying: false,
        },
        TowerArchetype::Frozen => TowerSpec {
            damage: 5.0,
            attacks_per_second: 1.0,
            range: 180.0,
            area_radius: 0.0,
            slow_factor: 0.5,
            slow_duration: 3.0,
            targets_flying: false,
        },
    }
}

/// Resource cost to build a tower.
pub fn tower_build_cost(archetype: TowerArchetype) -> CostMap {
    match archetype {
        TowerArchetype::Archer => CostMap::from([
            (Resource::Stone, 20),
            (Resource::MonsterCoins, 15),
        ]),
        TowerArchetype::Sniper => CostMap::from([
            (Resource::Stone, 40),
            (Resource::MonsterCoins, 75),
        ]),
        TowerArchetype::Splash => CostMap::from([
            (Resource::Stone, 30),
            (Resource::Iron, 5),
            (Resource::Copper, 2),
            (Resource::MonsterCoins, 65),
        ]),
        TowerArchetype::Frozen => CostMap::from([
            (Resource::Stone, 25),
            (Resource::Iron, 5),
            (Resource::Copper, 3),
            (Resource::MonsterCoins, 65),
        ]),
    }
}

/// Upgrade tracks available on a tower archetype.
pub fn tower_upgrade_tracks(archetype: TowerArchetype) -> &'static [UpgradeTrack] {
    match archetype {
        TowerArchetype::Archer | TowerArchetype::Sniper => &[
            UpgradeTrack::Damage,
            UpgradeTrack::AttackSpeed,
            UpgradeTrack::Range,
        ],
        TowerArchetype::Splash => &[
            UpgradeTrack::Damage,
            UpgradeTrack::AttackSpeed,
            UpgradeTrack::Range,
            UpgradeTrack::AreaRadius,
        ],
        TowerArchetype::Frozen => &[
            UpgradeTrack::Damage,
            UpgradeTrack::AttackSpeed,
            UpgradeTrack::Range,
            UpgradeTrack::SlowEffect,
            UpgradeTrack::SlowDuration,
        ],
    }
}

/// Whether an item may be mounted on a given archetype.
///
/// Multitudation Vortex bounces single-target shots, so it only fits
/// the single-target towers; the other items fit anywhere.
pub fn item_allowed(archetype: TowerArchetype, item: TowerItem) -> bool {
    match item {
        TowerItem::SereneSpirit | TowerItem::UnstoppableForce => true,
        TowerItem::MultitudationVortex => {
            matches!(archetype, TowerArchetype::Archer | TowerArchetype::Sniper)
        }
    }
}

/// Cost to raise one tower upgrade track from `level` to `level + 1`.
///
/// Scales the build cost: ordinary resources grow by
/// [`UPGRADE_COST_GROWTH`] per level, monster coins by the gentler
/// [`UPGRADE_COIN_COST_GROWTH`].
pub fn tower_upgrade_cost(archetype: TowerArchetype, level: u32) -> CostMap {
    scale_cost(&tower_build_cost(archetype), level)
}

/// Base cost of a castle upgrade track at level 1.
pub fn castle_upgrade_base_cost(track: CastleTrack) -> CostMap {
    match track {
        CastleTrack::Health => CostMap::from([
            (Resource::Stone, 75),
            (Resource::MonsterCoins, 1),
        ]),
        CastleTrack::DamageReduction => CostMap::from([
            (Resource::Stone, 40),
            (Resource::Iron, 15),
            (Resource::MonsterCoins, 2),
        ]),
        CastleTrack::Regeneration => CostMap::from([
            (Resource::Stone, 30),
            (Resource::Iron, 10),
            (Resource::Copper, 5),
            (Resource::MonsterCoins, 3),
        ]),
    }
}

/// Cost to raise a castle track from `level` to `level + 1`.
pub fn castle_upgrade_cost(track: CastleTrack, level: u32) -> CostMap {
    let growth = match track {
        CastleTrack::Health => 1.2,
        CastleTrack::DamageReduction => 1.3,
        CastleTrack::Regeneration => 1.4,
    };
    let factor = growth * level as f64;
    castle_upgrade_base_cost(track)
        .into_iter()
        .map(|(resource, amount)| (resource, ((amount as f64) * factor).ceil() as u64))
        .collect()
}

/// Ledger resource backing a tower item. Equipping spends one; removing
/// an item returns it.
pub fn item_resource(item: TowerItem) -> Resource {
    match item {
        TowerItem::UnstoppableForce => Resource::UnstoppableForceItem,
        TowerItem::SereneSpirit => Resource::SereneSpiritItem,
        TowerItem::MultitudationVortex => Resource::MultitudationVortexItem,
    }
}

/// Resource core dropped by a defeated boss.
pub fn boss_core(kind: BossKind) -> Resource {
    match kind {
        BossKind::Force => Resource::ForceCore,
        BossKind::Spirit => Resource::SpiritCore,
        BossKind::Magic => Resource::MagicCore,
        BossKind::Void => Resource::VoidCore,
    }
}

/// Talent points awarded for clearing `wave_number`: one per wave plus a
/// milestone bonus on landmark waves.
pub fn talent_points_for_wave(wave_number: u32) -> u32 {
    let bonus = match wave_number {
        5 => 2,
        10 => 3,
        25 => 5,
        50 => 10,
        100 => 20,
        _ => 0,
    };
    1 + bonus
}

fn scale_cost(base: &CostMap, level: u32) -> CostMap {
    let steps = level.saturating_sub(1);
    base.iter()
        .map(|(&resource, &amount)| {
            let growth = if resource == Resource::MonsterCoins {
                UPGRADE_COIN_COST_GROWTH
            } else {
                UPGRADE_COST_GROWTH
            };
            let scaled = (amount as f64) * growth.powi(steps as i32);
            (resource, scaled.floor() as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flying_monsters_only_targeted_by_anti_air() {
        assert!(tower_spec(TowerArchetype::Archer).targets_flying);
        assert!(tower_spec(TowerArchetype::Sniper).targets_flying);
        assert!(!tower_spec(TowerArchetype::Splash).targets_flying);
        assert!(!tower_spec(TowerArchetype::Frozen).targets_flying);
    }

    #[test]
    fn upgrade_cost_grows_per_level() {
        let l1 = tower_upgrade_cost(TowerArchetype::Archer, 1);
        let l2 = tower_upgrade_cost(TowerArchetype::Archer, 2);
        assert_eq!(l1[&Resource::Stone], 20);
        assert_eq!(l2[&Resource::Stone], 30);
        // Monster coin costs scale at 1.3, not 1.5.
        assert_eq!(l1[&Resource::MonsterCoins], 15);
        assert_eq!(l2[&Resource::MonsterCoins], 19);
    }

    #[test]
    fn milestone_waves_award_bonus_talent_points() {
        assert_eq!(talent_points_for_wave(1), 1);
        assert_eq!(talent_points_for_wave(5), 3);
        assert_eq!(talent_points_for_wave(10), 4);
        assert_eq!(talent_points_for_wave(25), 6);
        assert_eq!(talent_points_for_wave(50), 11);
        assert_eq!(talent_points_for_wave(100), 21);
    }

    #[test]
    fn vortex_restricted_to_single_target_towers() {
        assert!(item_allowed(TowerArchetype::Archer, TowerItem::MultitudationVortex));
        assert!(!item_allowed(TowerArchetype::Splash, TowerItem::MultitudationVortex));
        assert!(item_allowed(TowerArchetype::Frozen, TowerItem::SereneSpirit));
    }
}
