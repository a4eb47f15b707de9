//! Events and messages emitted by the simulation for UI feedback.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::lexicon::TextKey;
use crate::types::{GlobalTarget, ThingId};

/// Simulation events, drained into each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A shield structure's field dropped out while it was wanted on.
    ShieldOffline { structure: ThingId },
    /// An impact was absorbed by a shield field.
    ImpactBlocked {
        hazard: ThingId,
        cell: IVec2,
        absorbed_by: Option<ThingId>,
    },
    /// An impact went through and exploded.
    ImpactLanded {
        hazard: ThingId,
        cell: IVec2,
        radius: f32,
        damage: f32,
    },
    /// An agent was told to run from a hazard.
    FleeIssued {
        agent: ThingId,
        hazard: ThingId,
        destination: IVec2,
    },
    /// An agent was downed or killed by an explosion.
    AgentCasualty { agent: ThingId, dead: bool },
}

/// A user-facing message for the message feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub key: TextKey,
    pub severity: MessageSeverity,
    pub target: GlobalTarget,
    pub tick: u64,
}
