//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Axis-aligned rectangle used for the castle footprint and the play area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: DVec2,
    /// Half extents along each axis.
    pub half: DVec2,
}

impl Rect {
    pub fn new(center: DVec2, size: DVec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.half.x
    }

    pub fn right(&self) -> f64 {
        self.center.x + self.half.x
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.half.y
    }

    pub fn bottom(&self) -> f64 {
        self.center.y + self.half.y
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// True if `p` is inside the rectangle or within `threshold` of its
    /// boundary. A point already inside always counts, so a fast entity
    /// that overshoots into the rectangle never misses the trigger.
    pub fn on_boundary(&self, p: DVec2, threshold: f64) -> bool {
        p.x >= self.left() - threshold
            && p.x <= self.right() + threshold
            && p.y >= self.top() - threshold
            && p.y <= self.bottom() + threshold
    }
}

/// Externally computed stat multipliers broadcast onto towers.
///
/// These are *read* by the core during stat derivation; they are never
/// computed here. Fields are additive fractions (0.25 = +25%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatMultipliers {
    pub talent_damage: f64,
    pub talent_range: f64,
    pub talent_crit_chance: f64,
    pub research_damage: f64,
}
