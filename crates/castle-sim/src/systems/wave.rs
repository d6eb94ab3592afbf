//! Wave progression: composition, timed spawning, timeout failsafe, and
//! completion detection.
//!
//! A wave spawns its monsters on a fixed interval, then stays active
//! until every spawned monster is resolved. A hard timeout force-kills
//! stragglers so progression can never hang on a wedged unit.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use castle_core::catalog;
use castle_core::components::{Monster, Position};
use castle_core::constants::*;
use castle_core::enums::*;
use castle_core::events::GameEvent;
use castle_core::ledger::Ledger;

use crate::loot;
use crate::world_setup;

/// Fixed boss rotation for campaign waves 10, 20, 30, 40, then repeating.
const BOSS_ROTATION: [BossKind; 4] = [
    BossKind::Force,
    BossKind::Spirit,
    BossKind::Magic,
    BossKind::Void,
];

/// Wave progression state owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct WaveProgress {
    /// Next campaign wave to start (1-based).
    pub wave_number: u32,
    pub active: Option<ActiveWave>,
    pub challenge: Option<ChallengeState>,
}

/// A wave currently spawning or being fought.
#[derive(Debug, Clone)]
pub struct ActiveWave {
    /// The wave being fought: campaign number, or challenge wave number
    /// while a challenge is running.
    pub wave_number: u32,
    pub remaining_to_spawn: u32,
    /// Seconds until the next spawn.
    pub spawn_timer: f64,
    pub elapsed_secs: f64,
    pub is_boss_wave: bool,
    /// Set when the timeout failsafe ended the wave; the completion
    /// pass then withholds the talent award.
    pub timed_out: bool,
}

/// An in-progress challenge run.
#[derive(Debug, Clone, Copy)]
pub struct ChallengeState {
    /// The single monster kind this run spawns.
    pub kind: MonsterKind,
    pub tier: ChallengeTier,
    /// Current challenge wave (1-based, up to [`CHALLENGE_WAVE_COUNT`]).
    pub wave_number: u32,
    /// Campaign wave to restore when the challenge ends.
    pub saved_wave_number: u32,
}

impl WaveProgress {
    pub fn new() -> Self {
        Self {
            wave_number: 1,
            active: None,
            challenge: None,
        }
    }

    /// Begin the next wave (campaign or challenge). No-op if a wave is
    /// already active.
    pub fn begin_wave(&mut self, events: &mut Vec<GameEvent>) {
        if self.active.is_some() {
            return;
        }
        let (wave_number, count, is_boss_wave) = match &self.challenge {
            Some(challenge) => {
                let mut count = challenge_monster_count(challenge.wave_number, challenge.tier);
                let boss = challenge.wave_number % CHALLENGE_BOSS_PERIOD == 0;
                if boss {
                    // The boss joins the regular roster rather than
                    // replacing part of it.
                    count += 1;
                }
                (challenge.wave_number, count, boss)
            }
            None => {
                if self.wave_number % BOSS_WAVE_PERIOD == 0 {
                    (self.wave_number, 1, true)
                } else {
                    (self.wave_number, campaign_monster_count(self.wave_number), false)
                }
            }
        };
        info!(wave_number, count, is_boss_wave, "wave started");
        events.push(GameEvent::WaveStarted {
            wave_number,
            monster_count: count,
            is_boss_wave,
        });
        self.active = Some(ActiveWave {
            wave_number,
            remaining_to_spawn: count,
            // First monster appears immediately.
            spawn_timer: 0.0,
            elapsed_secs: 0.0,
            is_boss_wave,
            timed_out: false,
        });
    }
}

/// Advance spawn timers, enforce the wave timeout, and spawn due monsters.
pub fn run_spawning(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    progress: &mut WaveProgress,
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<hecs::Entity>,
    dt: f64,
) {
    let Some(active) = progress.active.as_mut() else {
        return;
    };
    active.elapsed_secs += dt;

    if active.elapsed_secs >= WAVE_TIMEOUT_SECS {
        warn!(
            wave_number = active.wave_number,
            "wave timeout, force-killing stragglers"
        );
        active.remaining_to_spawn = 0;
        active.timed_out = true;
        force_kill_all(world, ledger, events, despawn_buffer);
        return;
    }

    active.spawn_timer -= dt;
    while active.spawn_timer <= 0.0 && active.remaining_to_spawn > 0 {
        let wave_number = active.wave_number;
        if active.is_boss_wave && boss_spawns_now(active, progress.challenge.as_ref()) {
            let kind = match &progress.challenge {
                Some(challenge) => challenge_boss_kind(challenge.kind),
                None => campaign_boss_kind(wave_number),
            };
            world_setup::spawn_boss(world, rng, kind);
        } else {
            let (kind, scale_wave) = match &progress.challenge {
                Some(challenge) => (challenge.kind, challenge_scale_wave(wave_number)),
                None => (pick_monster_kind(rng, wave_number), wave_number),
            };
            world_setup::spawn_monster(world, rng, kind, scale_wave);
        }
        active.remaining_to_spawn -= 1;
        active.spawn_timer += SPAWN_INTERVAL_SECS;
    }
    if active.remaining_to_spawn == 0 {
        active.spawn_timer = 0.0;
    }
}

/// Complete the active wave once the field is clear, advancing campaign
/// or challenge progression. Runs after cleanup, so any monster still in
/// the world is alive.
pub fn run_completion(world: &World, progress: &mut WaveProgress, events: &mut Vec<GameEvent>) {
    let Some(active) = progress.active.as_ref() else {
        return;
    };
    if active.remaining_to_spawn > 0 {
        return;
    }
    let alive = world.query::<&Monster>().iter().count();
    if alive > 0 {
        return;
    }
    let wave_number = active.wave_number;
    let timed_out = active.timed_out;
    info!(wave_number, "wave completed");
    events.push(GameEvent::WaveCompleted { wave_number });
    progress.active = None;

    match progress.challenge.as_mut() {
        Some(challenge) => {
            if challenge.wave_number >= CHALLENGE_WAVE_COUNT {
                events.push(GameEvent::ChallengeCompleted {
                    tier: challenge.tier,
                });
                progress.wave_number = challenge.saved_wave_number;
                progress.challenge = None;
            } else {
                challenge.wave_number += 1;
            }
        }
        None => {
            // A wave the timeout had to end still advances, but the
            // talent award is reserved for waves the player cleared.
            if !timed_out {
                events.push(GameEvent::TalentPointsAwarded {
                    wave_number,
                    points: catalog::talent_points_for_wave(wave_number),
                });
            }
            progress.wave_number += 1;
        }
    }
}

/// Non-boss campaign wave size, growing linearly with a compounding
/// bump every ten waves.
pub fn campaign_monster_count(wave_number: u32) -> u32 {
    let bump = 1.2f64.powi((wave_number / 10) as i32);
    (5.0 + wave_number as f64 * 0.5 * bump).floor() as u32
}

/// Challenge wave size, scaled by the tier multiplier.
pub fn challenge_monster_count(wave_number: u32, tier: ChallengeTier) -> u32 {
    ((5 + wave_number) as f64 * tier.count_multiplier()).floor() as u32
}

/// Boss kind for campaign wave `wave_number` (a multiple of ten).
pub fn campaign_boss_kind(wave_number: u32) -> BossKind {
    BOSS_ROTATION[((wave_number / BOSS_WAVE_PERIOD).saturating_sub(1) % 4) as usize]
}

/// Each challenge run pits the player against one monster kind, and its
/// boss waves promote that same kind to the matching boss.
fn challenge_boss_kind(kind: MonsterKind) -> BossKind {
    match kind {
        MonsterKind::Grunt => BossKind::Force,
        MonsterKind::Flyer => BossKind::Spirit,
        MonsterKind::Runner => BossKind::Magic,
        MonsterKind::Tank => BossKind::Void,
    }
}

/// Challenge monsters scale as if fighting a few waves ahead of the
/// campaign, capped at wave twenty strength.
fn challenge_scale_wave(wave_number: u32) -> u32 {
    (wave_number + 5).min(20)
}

/// In a challenge boss wave the boss is held back until the final spawn.
/// Campaign boss waves contain only the boss, so it spawns right away.
fn boss_spawns_now(active: &ActiveWave, challenge: Option<&ChallengeState>) -> bool {
    match challenge {
        Some(_) => active.remaining_to_spawn == 1,
        None => true,
    }
}

/// Weighted monster kind for `wave_number`. Stronger archetypes unlock
/// as waves progress and gradually displace grunts.
pub fn pick_monster_kind(rng: &mut ChaCha8Rng, wave_number: u32) -> MonsterKind {
    let weights = kind_weights(wave_number);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return MonsterKind::Grunt;
    }
    let mut roll = rng.gen_range(0.0..total);
    for (kind, weight) in weights {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    MonsterKind::Grunt
}

fn kind_weights(wave_number: u32) -> [(MonsterKind, f64); 4] {
    let w = wave_number as f64;
    [
        (MonsterKind::Grunt, 100.0 - (2.0 * w).min(80.0)),
        (
            MonsterKind::Runner,
            if wave_number >= 3 {
                (3.0 * w).clamp(10.0, 60.0)
            } else {
                0.0
            },
        ),
        (
            MonsterKind::Tank,
            if wave_number >= 5 {
                (2.0 * w).clamp(10.0, 50.0)
            } else {
                0.0
            },
        ),
        (
            MonsterKind::Flyer,
            if wave_number >= 8 {
                (1.5 * w).clamp(10.0, 40.0)
            } else {
                0.0
            },
        ),
    ]
}

/// Kill every monster still alive, through the normal kill pipeline so
/// death events fire and the timed-out wave still pays its loot.
fn force_kill_all(
    world: &mut World,
    ledger: &mut Ledger,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<hecs::Entity>,
) {
    let mut doomed = Vec::new();
    for (entity, (monster, position)) in world.query_mut::<(&mut Monster, &Position)>() {
        if monster.phase != MonsterPhase::Dead {
            monster.phase = MonsterPhase::Dead;
            doomed.push((entity, monster.kind, position.0));
        }
    }
    for (entity, kind, position) in doomed {
        loot::resolve_kill(
            ledger,
            events,
            despawn_buffer,
            entity,
            kind,
            position,
            DeathCause::WaveTimeout,
            None,
        );
    }
}
