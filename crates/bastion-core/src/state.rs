//! Map state snapshot, the complete visible state handed to a frontend each tick.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{Message, SimEvent};
use crate::types::{MapId, SimTime, ThingId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub map: MapId,
    pub time: SimTime,
    pub phase: SimPhase,
    pub shields: Vec<ShieldView>,
    pub agents: Vec<AgentView>,
    pub hazards: Vec<HazardView>,
    pub explosions: Vec<ExplosionView>,
    /// Number of distinct cells covered by an active field.
    pub shielded_cells: usize,
    pub messages: Vec<Message>,
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldView {
    pub id: ThingId,
    pub label: String,
    pub cell: IVec2,
    pub status: ShieldStatus,
    pub active: bool,
    pub protected_cells: usize,
    pub energy: Option<f32>,
    pub temp: Option<f32>,
    /// Full inspect text (status line plus capability lines).
    pub inspect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: ThingId,
    pub name: String,
    pub cell: IVec2,
    pub health: f32,
    pub downed: bool,
    pub dead: bool,
    pub drafted: bool,
    pub job: JobDef,
    pub destination: Option<IVec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardView {
    pub id: ThingId,
    pub center: IVec2,
    pub remaining_ticks: u32,
    pub impacts: u32,
    pub blocked_impacts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionView {
    pub cell: IVec2,
    pub radius: f32,
    pub damage: f32,
}
