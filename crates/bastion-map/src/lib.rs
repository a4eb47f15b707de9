//! Map geometry for Bastion.
//!
//! Cell grid with terrain passability, the region partition built over it,
//! and bounded breadth-first traversal across regions.

pub use bastion_core as core;

pub mod grid;
pub mod region;
pub mod traverse;

// Re-export key types for convenience.
pub use grid::{MapGrid, Terrain};
pub use region::{Region, RegionId, RegionKind, RegionKindSet, RegionMap};
