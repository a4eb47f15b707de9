//! Errors returned by host-facing engine operations.

use glam::IVec2;
use thiserror::Error;

use bastion_core::types::ThingId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no such thing: {0:?}")]
    UnknownThing(ThingId),
    #[error("{0:?} is not a shield structure")]
    NotAShield(ThingId),
    #[error("{0:?} is not an agent")]
    NotAnAgent(ThingId),
    #[error("cell {0} is outside the map")]
    OutOfBounds(IVec2),
    #[error("cell {0} is not passable")]
    Impassable(IVec2),
    #[error("failed to encode or decode structure record: {0}")]
    Record(#[from] serde_json::Error),
}
