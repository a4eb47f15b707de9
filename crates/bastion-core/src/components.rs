//! ECS components for hecs entities.
//!
//! Components are plain data structs. Leaf capability behavior lives in
//! `capabilities`; controller, hazard and agent logic lives in the
//! simulation systems.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{MapId, ThingId};

/// A built structure placed on a map. Its cell is the `Position` component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub label: String,
    pub map: MapId,
}

/// Resolved indices of the controller's capabilities inside the
/// structure's `CapabilitySet`. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityBindings {
    pub energy: Option<usize>,
    pub heatsink: Option<usize>,
    pub field: Option<usize>,
}

/// Composite controller of a shield structure.
///
/// Only `power_per_tile` survives a save. Bindings are redone by post-init
/// after every construction or respawn, and `active_last_tick` always
/// starts false so stale history cannot raise an offline message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldController {
    /// Energy per tick drawn for every protected cell.
    pub power_per_tile: f32,
    #[serde(skip)]
    pub bindings: CapabilityBindings,
    #[serde(skip)]
    pub active_last_tick: bool,
}

/// An autonomous agent living on a map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    pub downed: bool,
    pub dead: bool,
    /// Under direct player control; reactive directives leave it alone.
    pub drafted: bool,
}

/// A unit of work assigned to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub def: JobDef,
    pub destination: Option<IVec2>,
    /// Thing the job reacts to (the hazard for a flee job).
    pub threat: Option<ThingId>,
    pub priority: DirectivePriority,
    pub started_tick: u64,
}

/// The agent's current job and how the previous one ended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobTracker {
    pub current: Option<Job>,
    pub last_end: Option<JobEndCondition>,
    /// Ticks accumulated toward the next movement step.
    #[serde(default)]
    pub move_progress: u32,
}

/// An area bombardment hazard. Its center is the `Position` component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bombardment {
    /// Radius around the center in which impact cells are chosen.
    pub impact_area_radius: f32,
    /// Radius agents must clear to be safe.
    pub effective_radius: f32,
    pub explosion_interval_ticks: u32,
    /// Ticks before the first impact.
    pub warmup_ticks: u32,
    pub ticks_until_next: u32,
    /// Ticks left before the hazard expires.
    pub remaining_ticks: u32,
    /// Set when an impact of this hazard was absorbed during the current tick.
    pub blocked_this_tick: bool,
    pub destroyed: bool,
    pub impacts: u32,
    pub blocked_impacts: u32,
}

/// A resolved explosion. Only created for impacts that were not blocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub cell: IVec2,
    pub radius: f32,
    pub damage: f32,
    pub source: Option<ThingId>,
    /// Ticks the explosion stays visible before cleanup.
    pub ticks_left: u32,
}
