//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Operational status of a shield structure, derived from its capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldStatus {
    /// The energy source cannot activate (switched off or empty).
    Unpowered,
    /// The heatsink is at or above its over-temperature threshold.
    ThermalShutdown,
    #[default]
    Online,
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageSeverity {
    Neutral,
    PositiveEvent,
    NegativeEvent,
}

/// Kind of job an agent is executing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobDef {
    /// Standing in place.
    #[default]
    Wait,
    /// Walking to an ordered destination.
    Goto,
    /// Running away from a threat.
    Flee,
}

/// How strongly a directive claims the agent.
/// A directive can only be pre-empted by one of strictly higher priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DirectivePriority {
    /// Self-issued or reactive work; anything else may interrupt it.
    #[default]
    OptionalInterrupt,
    /// Player order; only another forced order replaces it.
    Forced,
}

/// Why an agent's previous job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobEndCondition {
    Succeeded,
    InterruptOptional,
    InterruptForced,
    Incapable,
}

/// Answer of a pre-impact hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactVerdict {
    #[default]
    Proceed,
    /// Suppress the impact entirely: no explosion, no further effects.
    Block,
}

/// Top-level simulation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Active,
    Paused,
}
