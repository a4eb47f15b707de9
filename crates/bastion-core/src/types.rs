//! Fundamental grid and simulation types.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Cell position on a map grid. x = East, y = North.
///
/// Also used as the ECS position component for agents, structures and hazards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(pub IVec2);

/// Identifier of a map. Messages and snapshots carry it so a host running
/// several maps can route them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapId(pub u32);

/// Stable reference to a simulation thing (structure, agent or hazard).
/// Wraps the ECS entity bits so plain data can point at entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThingId(pub u64);

/// A location anywhere in the simulation: map plus cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTarget {
    pub map: MapId,
    pub cell: IVec2,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self(IVec2::new(x, y))
    }

    /// Straight-line distance to another cell, in cells.
    pub fn distance_to(&self, other: IVec2) -> f32 {
        cell_distance(self.0, other)
    }
}

/// Straight-line (Euclidean) distance between two cells.
pub fn cell_distance(a: IVec2, b: IVec2) -> f32 {
    (b - a).as_vec2().length()
}

/// Squared distance between two cells, exact in integers.
pub fn cell_distance_sq(a: IVec2, b: IVec2) -> i32 {
    (b - a).length_squared()
}

impl SimTime {
    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
    }
}
