//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Play area ---

/// Reference play area width.
pub const AREA_WIDTH: f64 = 800.0;

/// Reference play area height.
pub const AREA_HEIGHT: f64 = 600.0;

/// Margin beyond the play area before a unit is considered out of bounds.
pub const OUT_OF_BOUNDS_MARGIN: f64 = 50.0;

// --- Castle ---

/// Castle footprint center X.
pub const CASTLE_CENTER_X: f64 = 400.0;

/// Castle footprint center Y.
pub const CASTLE_CENTER_Y: f64 = 525.0;

/// Castle footprint width.
pub const CASTLE_WIDTH: f64 = 350.0;

/// Castle footprint height.
pub const CASTLE_HEIGHT: f64 = 150.0;

/// Distance from the castle boundary at which a monster stops and attacks.
pub const CASTLE_BOUNDARY_THRESHOLD: f64 = 5.0;

/// Base castle health at level 1.
pub const CASTLE_BASE_HEALTH: f64 = 1000.0;

/// Base castle damage reduction fraction at level 1.
pub const CASTLE_BASE_REDUCTION: f64 = 0.1;

/// Hard cap on castle damage reduction.
pub const CASTLE_REDUCTION_CAP: f64 = 0.9;

/// Base castle regeneration in health per second at level 1.
pub const CASTLE_BASE_REGEN: f64 = 1.0;

/// Castle health multiplier per upgrade level.
pub const CASTLE_HEALTH_GROWTH: f64 = 1.5;

/// Castle damage reduction multiplier per upgrade level.
pub const CASTLE_REDUCTION_GROWTH: f64 = 1.2;

/// Castle regeneration multiplier per upgrade level.
pub const CASTLE_REGEN_GROWTH: f64 = 1.3;

// --- Monsters ---

/// Default seconds between monster attacks on the castle.
pub const MONSTER_ATTACK_INTERVAL: f64 = 1.0;

/// Seconds between boss attacks on the castle.
pub const BOSS_ATTACK_INTERVAL: f64 = 1.5;

/// Seconds between boss ability activations.
pub const BOSS_ABILITY_COOLDOWN: f64 = 10.0;

/// Fraction of max health restored by the boss heal ability.
pub const BOSS_HEAL_FRACTION: f64 = 0.1;

/// Forward progress rate (units per second) below which a monster
/// counts as stuck.
pub const STUCK_PROGRESS_EPSILON: f64 = 1.0;

/// Seconds of no progress before the stuck failsafe kills a monster.
pub const STUCK_TIMEOUT_SECS: f64 = 3.0;

// --- Waves ---

/// Seconds between consecutive monster spawns within a wave.
pub const SPAWN_INTERVAL_SECS: f64 = 1.5;

/// Seconds after which an unfinished wave is force-completed.
pub const WAVE_TIMEOUT_SECS: f64 = 120.0;

/// Minimum spawn X coordinate.
pub const SPAWN_X_MIN: f64 = 50.0;

/// Maximum spawn X coordinate.
pub const SPAWN_X_MAX: f64 = 750.0;

/// Spawn Y coordinate (top edge of the play area).
pub const SPAWN_Y: f64 = 50.0;

/// Every Nth wave is a boss wave.
pub const BOSS_WAVE_PERIOD: u32 = 10;

/// Every Nth challenge wave ends with a boss.
pub const CHALLENGE_BOSS_PERIOD: u32 = 5;

/// Number of waves in a challenge run.
pub const CHALLENGE_WAVE_COUNT: u32 = 20;

// --- Combat ---

/// Critical hits deal this multiple of base damage.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Radius of the splash granted to single-target towers by the
/// Unstoppable Force item.
pub const ITEM_SPLASH_RADIUS: f64 = 30.0;

/// Damage fraction dealt by the item-granted splash.
pub const ITEM_SPLASH_DAMAGE_FRACTION: f64 = 0.5;

/// Chance for the Multitudation Vortex item to bounce a hit.
pub const ITEM_BOUNCE_CHANCE: f64 = 0.1;

/// Fraction of damage dealt converted to castle healing by Serene Spirit.
pub const ITEM_LIFESTEAL_FRACTION: f64 = 0.05;

/// Stat multiplier granted by Unstoppable Force to the boosted stat.
pub const ITEM_FORCE_MULTIPLIER: f64 = 1.3;

/// Hard cap on the slow factor after upgrades (at most 90% reduction).
pub const SLOW_EFFECT_CAP: f64 = 0.9;

// --- Upgrades ---

/// Tower upgrade cost multiplier per level.
pub const UPGRADE_COST_GROWTH: f64 = 1.5;

/// Monster coin upgrade cost multiplier per level.
pub const UPGRADE_COIN_COST_GROWTH: f64 = 1.3;

/// Damage multiplier per upgrade level.
pub const UPGRADE_DAMAGE_GROWTH: f64 = 1.3;

/// Attack speed multiplier per upgrade level.
pub const UPGRADE_ATTACK_SPEED_GROWTH: f64 = 1.2;

/// Range multiplier per upgrade level.
pub const UPGRADE_RANGE_GROWTH: f64 = 1.2;

/// Area radius multiplier per upgrade level.
pub const UPGRADE_AREA_GROWTH: f64 = 1.2;

/// Slow factor multiplier per upgrade level (capped by [`SLOW_EFFECT_CAP`]).
pub const UPGRADE_SLOW_EFFECT_GROWTH: f64 = 1.2;

/// Slow duration multiplier per upgrade level.
pub const UPGRADE_SLOW_DURATION_GROWTH: f64 = 1.3;

// --- Loot ---

/// Monster coins awarded for any tower kill.
pub const KILL_COIN_REWARD: u64 = 1;

/// Extra monster coins awarded for a boss kill.
pub const BOSS_COIN_BONUS: u64 = 10;

// --- Starting resources ---

/// Initial stone in a fresh ledger.
pub const STARTING_STONE: u64 = 100;

/// Initial monster coins in a fresh ledger.
pub const STARTING_MONSTER_COINS: u64 = 50;
