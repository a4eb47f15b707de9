//! Agent reasoning for Bastion.
//!
//! Flee-destination search and the job/directive model agents run on.
//! No ECS dependency; operates on plain data and the map grid.

pub mod flee;
pub mod jobs;

pub use bastion_core as core;
