//! The castle: the defended structure monsters march on.
//!
//! Stats are derived from upgrade levels on every change, never mutated
//! incrementally, so save/load and repeated upgrades cannot drift.

use glam::DVec2;

use castle_core::catalog;
use castle_core::constants::*;
use castle_core::enums::CastleTrack;
use castle_core::ledger::Ledger;
use castle_core::state::{CastleSave, CastleView};
use castle_core::types::Rect;

/// Castle state: upgrade levels plus current health.
#[derive(Debug, Clone)]
pub struct Castle {
    health_level: u32,
    reduction_level: u32,
    regen_level: u32,
    health: f64,
}

impl Default for Castle {
    fn default() -> Self {
        let mut castle = Self {
            health_level: 1,
            reduction_level: 1,
            regen_level: 1,
            health: 0.0,
        };
        castle.health = castle.max_health();
        castle
    }
}

impl Castle {
    /// The castle footprint in world space.
    pub fn footprint() -> Rect {
        Rect::new(
            DVec2::new(CASTLE_CENTER_X, CASTLE_CENTER_Y),
            DVec2::new(CASTLE_WIDTH, CASTLE_HEIGHT),
        )
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn max_health(&self) -> f64 {
        CASTLE_BASE_HEALTH * CASTLE_HEALTH_GROWTH.powi(self.health_level as i32 - 1)
    }

    /// Fraction of incoming damage absorbed, capped below 1.0.
    pub fn damage_reduction(&self) -> f64 {
        let raw = CASTLE_BASE_REDUCTION * CASTLE_REDUCTION_GROWTH.powi(self.reduction_level as i32 - 1);
        raw.min(CASTLE_REDUCTION_CAP)
    }

    pub fn regen_per_sec(&self) -> f64 {
        CASTLE_BASE_REGEN * CASTLE_REGEN_GROWTH.powi(self.regen_level as i32 - 1)
    }

    /// Apply one attack's worth of damage. Returns whether the castle
    /// still stands.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        let effective = amount * (1.0 - self.damage_reduction());
        self.health = (self.health - effective).max(0.0);
        self.is_alive()
    }

    /// Heal by `amount`, clamped to max health.
    pub fn heal(&mut self, amount: f64) {
        self.health = (self.health + amount).min(self.max_health());
    }

    /// Regenerate health over `dt` seconds. A destroyed castle does not
    /// regenerate.
    pub fn update(&mut self, dt: f64) {
        if self.is_alive() {
            self.heal(self.regen_per_sec() * dt);
        }
    }

    /// Restore to full health (after a defeat continue).
    pub fn restore_full(&mut self) {
        self.health = self.max_health();
    }

    /// Attempt to raise one upgrade track by a level, spending from the
    /// ledger. Returns false and changes nothing if unaffordable.
    /// A health upgrade also restores the castle to its new full health.
    pub fn upgrade(&mut self, track: CastleTrack, ledger: &mut Ledger) -> bool {
        let level = match track {
            CastleTrack::Health => self.health_level,
            CastleTrack::DamageReduction => self.reduction_level,
            CastleTrack::Regeneration => self.regen_level,
        };
        let cost = catalog::castle_upgrade_cost(track, level);
        if !ledger.spend(&cost) {
            return false;
        }
        match track {
            CastleTrack::Health => {
                self.health_level += 1;
                self.health = self.max_health();
            }
            CastleTrack::DamageReduction => self.reduction_level += 1,
            CastleTrack::Regeneration => self.regen_level += 1,
        }
        true
    }

    pub fn view(&self) -> CastleView {
        CastleView {
            health: self.health,
            max_health: self.max_health(),
            damage_reduction: self.damage_reduction(),
            regen_per_sec: self.regen_per_sec(),
            health_level: self.health_level,
            reduction_level: self.reduction_level,
            regen_level: self.regen_level,
        }
    }

    pub fn save(&self) -> CastleSave {
        CastleSave {
            health_level: self.health_level,
            reduction_level: self.reduction_level,
            regen_level: self.regen_level,
            health: self.health,
        }
    }

    /// Rebuild from a save record. Health is clamped to the max implied
    /// by the saved level, so a tampered or stale record cannot overheal.
    pub fn restore(save: &CastleSave) -> Self {
        let mut castle = Self {
            health_level: save.health_level.max(1),
            reduction_level: save.reduction_level.max(1),
            regen_level: save.regen_level.max(1),
            health: 0.0,
        };
        castle.health = save.health.clamp(0.0, castle.max_health());
        castle
    }
}
