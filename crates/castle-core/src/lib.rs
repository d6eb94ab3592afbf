//! Core types and definitions for the castle-defense simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, the type catalog,
//! and constants. It has no dependency on any runtime framework.

pub mod catalog;
pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod ledger;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
