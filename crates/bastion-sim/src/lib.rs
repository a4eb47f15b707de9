//! Simulation engine for Bastion.
//!
//! Owns the hecs ECS world of a map, runs shield controllers and hazards at a
//! fixed tick, exposes the host extension points impacts are checked through,
//! and produces `MapSnapshot`s for a frontend.

pub mod engine;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod map;
pub mod systems;
pub mod world_setup;

pub use bastion_core as core;
pub use engine::{SimConfig, SimulationEngine};
pub use error::SimError;
pub use map::Map;

#[cfg(test)]
mod tests;
