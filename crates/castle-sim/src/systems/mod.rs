//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus the engine-side
//! state they need (castle, towers, ledger, wave progress). All
//! per-entity state lives in components.

pub mod cleanup;
pub mod combat;
pub mod monster;
pub mod snapshot;
pub mod wave;
