//! Placed towers and their stat derivation.
//!
//! A tower's effective stats are a pure function of its archetype,
//! upgrade levels, equipped items, and the global multipliers. They are
//! recomputed from the catalog after every change rather than scaled in
//! place, so no sequence of upgrades, equips, and loads can accumulate
//! rounding drift.

use glam::DVec2;

use castle_core::catalog::{self, TowerSpec};
use castle_core::constants::*;
use castle_core::enums::{ItemSlot, TowerArchetype, TowerItem, UpgradeTrack};
use castle_core::ledger::Ledger;
use castle_core::state::{TowerSave, TowerView};
use castle_core::types::StatMultipliers;

/// Effective combat stats, cached on the tower.
#[derive(Debug, Clone, Copy)]
pub struct TowerStats {
    pub damage: f64,
    pub attacks_per_second: f64,
    pub range: f64,
    /// Splash radius; zero for single-target towers.
    pub area_radius: f64,
    /// Speed multiplier applied to slowed targets; 1.0 if non-slowing.
    pub slow_factor: f64,
    pub slow_duration: f64,
    /// Chance for a single-target hit to crit for double damage.
    pub crit_chance: f64,
}

/// A placed tower. Identified by `tower_number`, unique within a run.
#[derive(Debug, Clone)]
pub struct Tower {
    pub tower_number: u32,
    pub archetype: TowerArchetype,
    pub position: DVec2,
    levels: Levels,
    items: [Option<TowerItem>; 2],
    stats: TowerStats,
    /// Seconds until the tower may fire again. Not persisted.
    pub cooldown_remaining: f64,
}

#[derive(Debug, Clone, Copy)]
struct Levels {
    damage: u32,
    attack_speed: u32,
    range: u32,
    area: u32,
    slow_effect: u32,
    slow_duration: u32,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            damage: 1,
            attack_speed: 1,
            range: 1,
            area: 1,
            slow_effect: 1,
            slow_duration: 1,
        }
    }
}

impl Levels {
    fn get(&self, track: UpgradeTrack) -> u32 {
        match track {
            UpgradeTrack::Damage => self.damage,
            UpgradeTrack::AttackSpeed => self.attack_speed,
            UpgradeTrack::Range => self.range,
            UpgradeTrack::AreaRadius => self.area,
            UpgradeTrack::SlowEffect => self.slow_effect,
            UpgradeTrack::SlowDuration => self.slow_duration,
        }
    }

    fn bump(&mut self, track: UpgradeTrack) {
        match track {
            UpgradeTrack::Damage => self.damage += 1,
            UpgradeTrack::AttackSpeed => self.attack_speed += 1,
            UpgradeTrack::Range => self.range += 1,
            UpgradeTrack::AreaRadius => self.area += 1,
            UpgradeTrack::SlowEffect => self.slow_effect += 1,
            UpgradeTrack::SlowDuration => self.slow_duration += 1,
        }
    }
}

impl Tower {
    /// Build a fresh level-1 tower. Stats are derived immediately.
    pub fn new(
        tower_number: u32,
        archetype: TowerArchetype,
        position: DVec2,
        multipliers: &StatMultipliers,
    ) -> Self {
        let levels = Levels::default();
        Self {
            tower_number,
            archetype,
            position,
            levels,
            items: [None, None],
            stats: derive_stats(archetype, &levels, &[None, None], multipliers),
            cooldown_remaining: 0.0,
        }
    }

    pub fn stats(&self) -> &TowerStats {
        &self.stats
    }

    pub fn items(&self) -> [Option<TowerItem>; 2] {
        self.items
    }

    pub fn has_item(&self, item: TowerItem) -> bool {
        self.items.contains(&Some(item))
    }

    /// Whether this tower can engage a flying target.
    pub fn targets_flying(&self) -> bool {
        catalog::tower_spec(self.archetype).targets_flying
    }

    /// Attempt to raise one upgrade track by a level, spending from the
    /// ledger. Fails without effect if the track does not exist on this
    /// archetype or the cost is unaffordable.
    pub fn upgrade(
        &mut self,
        track: UpgradeTrack,
        ledger: &mut Ledger,
        multipliers: &StatMultipliers,
    ) -> bool {
        if !catalog::tower_upgrade_tracks(self.archetype).contains(&track) {
            return false;
        }
        let cost = catalog::tower_upgrade_cost(self.archetype, self.levels.get(track));
        if !ledger.spend(&cost) {
            return false;
        }
        self.levels.bump(track);
        self.rederive(multipliers);
        true
    }

    /// Equip an item into a slot, returning whatever it displaces.
    /// Callers validate archetype fit (and ownership) beforehand via
    /// [`catalog::item_allowed`].
    pub fn equip(
        &mut self,
        slot: ItemSlot,
        item: TowerItem,
        multipliers: &StatMultipliers,
    ) -> Option<TowerItem> {
        let previous = self.items[slot_index(slot)].replace(item);
        self.rederive(multipliers);
        previous
    }

    /// Clear a slot, returning the removed item.
    pub fn unequip(&mut self, slot: ItemSlot, multipliers: &StatMultipliers) -> Option<TowerItem> {
        let removed = self.items[slot_index(slot)].take();
        self.rederive(multipliers);
        removed
    }

    /// Recompute cached stats from scratch.
    pub fn rederive(&mut self, multipliers: &StatMultipliers) {
        self.stats = derive_stats(self.archetype, &self.levels, &self.items, multipliers);
    }

    pub fn view(&self) -> TowerView {
        TowerView {
            tower_number: self.tower_number,
            archetype: self.archetype,
            position: self.position,
            damage: self.stats.damage,
            attacks_per_second: self.stats.attacks_per_second,
            range: self.stats.range,
            area_radius: self.stats.area_radius,
            slow_factor: self.stats.slow_factor,
            slow_duration: self.stats.slow_duration,
            items: self.items,
        }
    }

    pub fn save(&self) -> TowerSave {
        TowerSave {
            tower_number: self.tower_number,
            archetype: self.archetype,
            position: self.position,
            damage_level: self.levels.damage,
            attack_speed_level: self.levels.attack_speed,
            range_level: self.levels.range,
            area_level: self.levels.area,
            slow_effect_level: self.levels.slow_effect,
            slow_duration_level: self.levels.slow_duration,
            items: self.items,
        }
    }

    /// Rebuild from a save record, re-deriving all stats.
    pub fn restore(save: &TowerSave, multipliers: &StatMultipliers) -> Self {
        let levels = Levels {
            damage: save.damage_level.max(1),
            attack_speed: save.attack_speed_level.max(1),
            range: save.range_level.max(1),
            area: save.area_level.max(1),
            slow_effect: save.slow_effect_level.max(1),
            slow_duration: save.slow_duration_level.max(1),
        };
        let mut items = save.items;
        // Drop illegal items rather than carrying them silently.
        for slot in items.iter_mut() {
            if let Some(item) = *slot {
                if !catalog::item_allowed(save.archetype, item) {
                    *slot = None;
                }
            }
        }
        Self {
            tower_number: save.tower_number,
            archetype: save.archetype,
            position: save.position,
            levels,
            items,
            stats: derive_stats(save.archetype, &levels, &items, multipliers),
            cooldown_remaining: 0.0,
        }
    }
}

fn slot_index(slot: ItemSlot) -> usize {
    match slot {
        ItemSlot::First => 0,
        ItemSlot::Second => 1,
    }
}

fn derive_stats(
    archetype: TowerArchetype,
    levels: &Levels,
    items: &[Option<TowerItem>; 2],
    multipliers: &StatMultipliers,
) -> TowerStats {
    let spec: TowerSpec = catalog::tower_spec(archetype);
    let has_force = items.contains(&Some(TowerItem::UnstoppableForce));

    let damage = spec.damage
        * UPGRADE_DAMAGE_GROWTH.powi(levels.damage as i32 - 1)
        * (1.0 + multipliers.talent_damage + multipliers.research_damage);

    let attacks_per_second =
        spec.attacks_per_second * UPGRADE_ATTACK_SPEED_GROWTH.powi(levels.attack_speed as i32 - 1);

    let mut range = spec.range
        * UPGRADE_RANGE_GROWTH.powi(levels.range as i32 - 1)
        * (1.0 + multipliers.talent_range);
    if has_force && archetype == TowerArchetype::Frozen {
        range *= ITEM_FORCE_MULTIPLIER;
    }

    let mut area_radius = spec.area_radius * UPGRADE_AREA_GROWTH.powi(levels.area as i32 - 1);
    if has_force && archetype == TowerArchetype::Splash {
        area_radius *= ITEM_FORCE_MULTIPLIER;
    }

    // Slow strength upgrades scale the *reduction* (1 - factor), capped
    // so a target always keeps some speed.
    let slow_factor = if spec.slow_factor < 1.0 {
        let reduction = (1.0 - spec.slow_factor)
            * UPGRADE_SLOW_EFFECT_GROWTH.powi(levels.slow_effect as i32 - 1);
        1.0 - reduction.min(SLOW_EFFECT_CAP)
    } else {
        1.0
    };

    let slow_duration =
        spec.slow_duration * UPGRADE_SLOW_DURATION_GROWTH.powi(levels.slow_duration as i32 - 1);

    TowerStats {
        damage,
        attacks_per_second,
        range,
        area_radius,
        slow_factor,
        slow_duration,
        crit_chance: multipliers.talent_crit_chance,
    }
}
