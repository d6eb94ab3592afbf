//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// World-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// Movement state: a unit normalized direction plus a base speed.
/// The effective speed each update is `speed` scaled by any active slow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Motion {
    pub direction: DVec2,
    /// Base speed in units per second, after wave scaling.
    pub speed: f64,
}

/// Hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// Core monster state shared by regular monsters and bosses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub kind: UnitKind,
    pub phase: MonsterPhase,
    /// Damage per attack on the castle, after wave scaling.
    pub damage: f64,
    pub flying: bool,
    /// Seconds between castle attacks.
    pub attack_interval: f64,
    /// Counts down to the next castle attack while at the boundary.
    pub attack_timer: f64,
}

/// Active slow effect. At most one per monster; a stronger or refreshed
/// slow overwrites this, it never stacks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlowStatus {
    /// Speed multiplier in (0, 1]; the strongest (lowest) applied wins.
    pub factor: f64,
    pub remaining_secs: f64,
}

/// Progress watchdog. Kills monsters that stop moving without reaching
/// the castle, so a wave can never hang on a wedged unit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StuckTracker {
    pub last_position: DVec2,
    /// Seconds of near-zero progress accumulated so far.
    pub stalled_secs: f64,
}

/// Boss ability bookkeeping. Only present on boss entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossAbilityState {
    pub ability: BossAbility,
    /// Seconds until the ability may fire again.
    pub cooldown_remaining: f64,
}
