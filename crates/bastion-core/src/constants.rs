//! Simulation constants and default tuning parameters.
//!
//! Values a player or modder may want to change are mirrored in
//! `settings::Settings`; these constants are the builtin defaults.

// --- Shields ---

/// Energy per tick drawn for each protected cell.
pub const POWER_PER_TILE: f32 = 0.01;

/// Damage of a single bombardment impact for absorption purposes.
pub const SKYFALLER_DAMAGE: f32 = 200.0;

/// Energy needed to absorb one point of impact damage.
pub const ENERGY_PER_DAMAGE: f32 = 1.0;

/// Waste heat per point of absorbed damage.
pub const HEAT_PER_DAMAGE: f32 = 0.1;

/// Waste heat per protected cell per tick while a field is online.
pub const HEAT_PER_TILE: f32 = 0.002;

/// Default field radius in cells.
pub const DEFAULT_FIELD_RADIUS: f32 = 8.0;

// --- Bombardment ---

/// Radius an agent must clear to be out of harm's way.
pub const BOMBARDMENT_EFFECTIVE_RADIUS: f32 = 23.0;

/// Radius around the hazard center in which impact cells are chosen.
pub const BOMBARDMENT_IMPACT_AREA_RADIUS: f32 = 15.0;

/// Ticks between two impacts.
pub const BOMBARDMENT_EXPLOSION_INTERVAL_TICKS: u32 = 18;

/// Ticks before the first impact.
pub const BOMBARDMENT_WARMUP_TICKS: u32 = 60;

/// Total lifetime of a bombardment (ticks).
pub const BOMBARDMENT_DURATION_TICKS: u32 = 540;

/// Explosion radius range (cells).
pub const EXPLOSION_RADIUS_MIN: f32 = 6.0;
pub const EXPLOSION_RADIUS_MAX: f32 = 8.0;

/// Explosion damage range applied to agents inside the radius.
pub const EXPLOSION_DAMAGE_MIN: f32 = 20.0;
pub const EXPLOSION_DAMAGE_MAX: f32 = 40.0;

/// Ticks an explosion stays in the world before cleanup.
pub const EXPLOSION_LINGER_TICKS: u32 = 30;

// --- Threat response ---

/// Agents farther than this from the hazard are left alone (inclusive bound).
pub const FLEE_TRIGGER_DISTANCE: f32 = 24.0;

/// Maximum number of regions visited when looking for agents.
pub const FLEE_MAX_REGIONS: usize = 25;

/// Maximum number of cells examined by one flee-destination search.
pub const FLEE_SEARCH_CELL_BUDGET: usize = 10_000;

// --- Agents ---

/// Below this fraction of max health an agent is downed.
pub const DOWNED_HEALTH_FRACTION: f32 = 0.25;

/// Ticks an agent needs to move one cell.
pub const AGENT_TICKS_PER_CELL: u32 = 2;

// --- Map ---

/// Side length of the square blocks regions are carved from.
pub const REGION_SIZE: i32 = 12;
