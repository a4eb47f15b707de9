//! Player commands sent from a frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::types::ThingId;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Flip a shield structure's on/off switch.
    ToggleShield { structure: ThingId },
    /// Put an agent under (or release it from) direct control.
    SetDrafted { agent: ThingId, drafted: bool },
    /// Order an agent to walk somewhere. Forced priority.
    OrderGoto { agent: ThingId, cell: IVec2 },
    /// Start a bombardment centered on a cell.
    CallBombardment { cell: IVec2 },
    Pause,
    Resume,
}
