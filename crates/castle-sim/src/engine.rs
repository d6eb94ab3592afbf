//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! runs all systems, and produces `GameStateSnapshot`s. Completely
//! headless, enabling deterministic testing: the same seed and command
//! sequence always produces the same run.

use std::collections::{BTreeMap, VecDeque};

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use castle_core::commands::PlayerCommand;
use castle_core::components::Monster;
use castle_core::constants::{AREA_HEIGHT, AREA_WIDTH, DT};
use castle_core::catalog;
use castle_core::enums::GamePhase;
use castle_core::events::GameEvent;
use castle_core::ledger::{CostMap, Ledger};
use castle_core::state::{ChallengeSave, GameStateSnapshot, SaveState};
use castle_core::types::{SimTime, StatMultipliers};

use crate::castle::Castle;
use crate::systems;
use crate::systems::wave::{ChallengeState, WaveProgress};
use crate::tower::Tower;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    castle: Castle,
    towers: BTreeMap<u32, Tower>,
    next_tower_number: u32,
    multipliers: StatMultipliers,
    ledger: Ledger,
    wave: WaveProgress,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<GameEvent>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            castle: Castle::default(),
            towers: BTreeMap::new(),
            next_tower_number: 1,
            multipliers: StatMultipliers::default(),
            ledger: Ledger::default(),
            wave: WaveProgress::new(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Rebuild an engine from a save record. Derived stats come from the
    /// catalog, not the record, so a loaded game matches a live one.
    pub fn restore(config: SimConfig, save: &SaveState) -> Self {
        let mut engine = Self::new(config);
        engine.castle = Castle::restore(&save.castle);
        engine.ledger = save.ledger.clone();
        engine.wave.wave_number = save.wave_number.max(1);
        engine.wave.challenge = save.challenge.map(|c| ChallengeState {
            kind: c.kind,
            tier: c.tier,
            wave_number: c.wave_number.max(1),
            saved_wave_number: c.saved_wave_number.max(1),
        });
        for record in &save.towers {
            let tower = Tower::restore(record, &engine.multipliers);
            engine.next_tower_number = engine.next_tower_number.max(tower.tower_number + 1);
            engine.towers.insert(tower.tower_number, tower);
        }
        engine
    }

    /// Produce a save record of the persistent state.
    pub fn save(&self) -> SaveState {
        SaveState {
            wave_number: self.wave.wave_number,
            challenge: self.wave.challenge.map(|c| ChallengeSave {
                kind: c.kind,
                tier: c.tier,
                wave_number: c.wave_number,
                saved_wave_number: c.saved_wave_number,
            }),
            castle: self.castle.save(),
            towers: self.towers.values().map(Tower::save).collect(),
            ledger: self.ledger.clone(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::WaveActive {
            self.run_systems();
            self.time.advance(DT);
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.wave,
            &self.castle,
            &self.towers,
            &self.ledger,
            events,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn castle(&self) -> &Castle {
        &self.castle
    }

    pub fn towers(&self) -> &BTreeMap<u32, Tower> {
        &self.towers
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Deposit resources directly (for tests).
    #[cfg(test)]
    pub fn grant_resources(&mut self, resource: castle_core::ledger::Resource, amount: u64) {
        self.ledger.deposit(resource, amount);
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command. Invalid commands are discarded
    /// without effect.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartWave => {
                if self.phase == GamePhase::Idle {
                    self.wave.begin_wave(&mut self.events);
                    self.phase = GamePhase::WaveActive;
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::WaveActive {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::WaveActive;
                }
            }
            PlayerCommand::ContinueAfterDefeat => {
                if self.phase == GamePhase::Defeat {
                    self.clear_field();
                    self.wave.active = None;
                    self.castle.restore_full();
                    self.phase = GamePhase::Idle;
                }
            }
            PlayerCommand::PlaceTower {
                archetype,
                position,
            } => {
                let in_area = position.x >= 0.0
                    && position.x <= AREA_WIDTH
                    && position.y >= 0.0
                    && position.y <= AREA_HEIGHT;
                let on_castle = Castle::footprint().contains(position);
                if in_area && !on_castle && self.ledger.spend(&catalog::tower_build_cost(archetype))
                {
                    let number = self.next_tower_number;
                    self.next_tower_number += 1;
                    self.towers
                        .insert(number, Tower::new(number, archetype, position, &self.multipliers));
                }
            }
            PlayerCommand::RemoveTower { tower_number } => {
                // Equipped items go back to the ledger; the build cost
                // does not.
                if let Some(tower) = self.towers.remove(&tower_number) {
                    for item in tower.items().into_iter().flatten() {
                        self.ledger.deposit(catalog::item_resource(item), 1);
                    }
                }
            }
            PlayerCommand::UpgradeTower {
                tower_number,
                track,
            } => {
                if let Some(tower) = self.towers.get_mut(&tower_number) {
                    tower.upgrade(track, &mut self.ledger, &self.multipliers);
                }
            }
            PlayerCommand::UpgradeCastle { track } => {
                self.castle.upgrade(track, &mut self.ledger);
            }
            PlayerCommand::EquipItem {
                tower_number,
                slot,
                item,
            } => {
                let Some(tower) = self.towers.get_mut(&tower_number) else {
                    return;
                };
                let cost = CostMap::from([(catalog::item_resource(item), 1)]);
                if catalog::item_allowed(tower.archetype, item) && self.ledger.spend(&cost) {
                    if let Some(displaced) = tower.equip(slot, item, &self.multipliers) {
                        self.ledger.deposit(catalog::item_resource(displaced), 1);
                    }
                }
            }
            PlayerCommand::UnequipItem { tower_number, slot } => {
                if let Some(tower) = self.towers.get_mut(&tower_number) {
                    if let Some(removed) = tower.unequip(slot, &self.multipliers) {
                        self.ledger.deposit(catalog::item_resource(removed), 1);
                    }
                }
            }
            PlayerCommand::SetGlobalMultipliers { multipliers } => {
                self.multipliers = multipliers;
                for tower in self.towers.values_mut() {
                    tower.rederive(&self.multipliers);
                }
            }
            PlayerCommand::EnterChallenge { kind, tier } => {
                if self.phase == GamePhase::Idle && self.wave.challenge.is_none() {
                    self.wave.challenge = Some(ChallengeState {
                        kind,
                        tier,
                        wave_number: 1,
                        saved_wave_number: self.wave.wave_number,
                    });
                }
            }
            PlayerCommand::ExitChallenge => {
                if self.phase == GamePhase::Idle {
                    if let Some(challenge) = self.wave.challenge.take() {
                        self.wave.wave_number = challenge.saved_wave_number;
                    }
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Wave spawning (interval spawns + timeout failsafe)
        systems::wave::run_spawning(
            &mut self.world,
            &mut self.rng,
            &mut self.wave,
            &mut self.ledger,
            &mut self.events,
            &mut self.despawn_buffer,
            DT,
        );
        // 2. Monster behavior (slows, boss abilities, march, castle attacks)
        systems::monster::run(
            &mut self.world,
            &mut self.castle,
            &mut self.ledger,
            &mut self.events,
            &mut self.despawn_buffer,
            DT,
        );
        // 3. Defeat detection
        if !self.castle.is_alive() {
            let wave_number = self.wave.active.as_ref().map_or(self.wave.wave_number, |a| {
                a.wave_number
            });
            self.events.push(GameEvent::CastleDestroyed { wave_number });
            self.phase = GamePhase::Defeat;
        }
        // 4. Tower combat (targets post-movement positions)
        systems::combat::run(
            &mut self.world,
            &mut self.rng,
            &mut self.towers,
            &mut self.castle,
            &mut self.ledger,
            &mut self.events,
            &mut self.despawn_buffer,
            DT,
        );
        // 5. Castle regeneration
        self.castle.update(DT);
        // 6. Numeric sanity sweep
        systems::cleanup::sanity_sweep(
            &mut self.world,
            &mut self.ledger,
            &mut self.events,
            &mut self.despawn_buffer,
        );
        // 7. Deferred despawn
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
        // 8. Wave completion
        systems::wave::run_completion(&self.world, &mut self.wave, &mut self.events);
        if self.phase == GamePhase::WaveActive && self.wave.active.is_none() {
            self.phase = GamePhase::Idle;
        }
    }

    /// Despawn every monster on the field.
    fn clear_field(&mut self) {
        let doomed: Vec<hecs::Entity> = self
            .world
            .query::<&Monster>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for entity in doomed {
            let _ = self.world.despawn(entity);
        }
    }
}
