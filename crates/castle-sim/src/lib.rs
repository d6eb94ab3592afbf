//! Simulation engine for the castle-defense game.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the frontend.

pub mod castle;
pub mod engine;
pub mod loot;
pub mod systems;
pub mod tower;
pub mod world_setup;

pub use castle_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
