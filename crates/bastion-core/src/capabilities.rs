//! Leaf capabilities a structure can have installed: an energy source,
//! a heatsink and a shield field emitter.
//!
//! A structure carries them in a `CapabilitySet`, an ordered list of tagged
//! variants. Finders resolve each kind to at most one entry (the first match),
//! so a controller never depends on where in the list a capability sits.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Stored-energy reservoir with a per-tick consumption rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    pub stored: f32,
    pub capacity: f32,
    /// Signed energy per tick; negative is a net drain.
    pub base_consumption: f32,
    /// Whether consumption is demanded (the structure's on/off switch).
    pub want_active: bool,
    /// Energy per tick supplied from outside (grid connection, generator).
    #[serde(default)]
    pub recharge_per_tick: f32,
}

impl EnergySource {
    pub fn new(capacity: f32, stored: f32) -> Self {
        let capacity = capacity.max(f32::EPSILON);
        Self {
            stored: stored.clamp(0.0, capacity),
            capacity,
            base_consumption: 0.0,
            want_active: true,
            recharge_per_tick: 0.0,
        }
    }

    pub fn with_recharge(mut self, recharge_per_tick: f32) -> Self {
        self.recharge_per_tick = recharge_per_tick.max(0.0);
        self
    }

    /// Switched on and holding energy.
    pub fn is_active(&self) -> bool {
        self.want_active && self.stored > 0.0
    }

    pub fn energy_available(&self) -> f32 {
        self.stored
    }

    /// Take up to `amount`, returning what was actually taken.
    pub fn draw(&mut self, amount: f32) -> f32 {
        let drawn = amount.max(0.0).min(self.stored);
        self.stored -= drawn;
        drawn
    }

    /// Remove `amount` outright; the store bottoms out at zero.
    pub fn drain(&mut self, amount: f32) {
        self.stored = (self.stored - amount.max(0.0)).max(0.0);
    }

    /// Apply one tick of supply and (when switched on) consumption.
    pub fn tick(&mut self) {
        let mut delta = self.recharge_per_tick;
        if self.want_active {
            delta += self.base_consumption;
        }
        self.stored = (self.stored + delta).clamp(0.0, self.capacity);
    }
}

/// Accumulates waste heat and cools passively toward ambient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatsink {
    pub temp: f32,
    pub over_temperature_threshold: f32,
    pub ambient: f32,
    /// Heat units needed to raise the temperature by one degree.
    pub heat_capacity: f32,
    /// Degrees shed per tick while above ambient.
    pub dissipation_per_tick: f32,
}

impl Heatsink {
    pub fn new(ambient: f32, over_temperature_threshold: f32) -> Self {
        Self {
            temp: ambient,
            over_temperature_threshold,
            ambient,
            heat_capacity: 1.0,
            dissipation_per_tick: 0.0,
        }
    }

    pub fn over_temperature(&self) -> bool {
        self.temp >= self.over_temperature_threshold
    }

    pub fn push_heat(&mut self, amount: f32) {
        self.temp += amount.max(0.0) / self.heat_capacity.max(f32::EPSILON);
    }

    /// Passive cooling; never below ambient.
    pub fn tick(&mut self) {
        if self.temp > self.ambient {
            self.temp = (self.temp - self.dissipation_per_tick).max(self.ambient);
        }
    }
}

/// Radial protective field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldField {
    pub radius: f32,
    /// Field switch for structures without an energy source.
    pub enabled: bool,
    /// Waste heat per protected cell per tick while online.
    pub heat_per_tile: f32,
    /// Energy needed to absorb one point of impact damage.
    pub energy_per_damage: f32,
    /// Waste heat per point of absorbed damage.
    pub heat_per_damage: f32,
    /// Covered cells, recomputed on spawn from position and map bounds.
    #[serde(skip)]
    pub protected: Vec<IVec2>,
    #[serde(skip)]
    pub online: bool,
}

impl ShieldField {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            enabled: true,
            heat_per_tile: 0.0,
            energy_per_damage: 0.0,
            heat_per_damage: 0.0,
            protected: Vec::new(),
            online: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.online
    }

    pub fn protected_cell_count(&self) -> usize {
        self.protected.len()
    }

    pub fn covers(&self, center: IVec2, cell: IVec2) -> bool {
        let r = self.radius;
        (cell - center).length_squared() as f32 <= r * r
    }

    /// Replace the coverage. The field stays offline until its next tick.
    pub fn set_coverage(&mut self, cells: Vec<IVec2>) {
        self.protected = cells;
        self.online = false;
    }

    pub fn shut_down(&mut self) {
        self.online = false;
    }

    /// Recompute the online flag and return the waste heat produced this tick.
    pub fn tick(&mut self, energy_ok: bool, overheated: bool) -> f32 {
        self.online = self.enabled && energy_ok && !overheated && !self.protected.is_empty();
        if self.online {
            self.protected.len() as f32 * self.heat_per_tile
        } else {
            0.0
        }
    }

    pub fn absorb_cost(&self, damage: f32) -> f32 {
        damage.max(0.0) * self.energy_per_damage
    }

    pub fn absorb_heat(&self, damage: f32) -> f32 {
        damage.max(0.0) * self.heat_per_damage
    }
}

/// One installed sub-component of a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Capability {
    Energy(EnergySource),
    Heatsink(Heatsink),
    Field(ShieldField),
    /// Anything the shield logic does not care about (lights, art, ...).
    Inert { name: String },
}

/// Ordered list of a structure's installed capabilities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub installed: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new(installed: Vec<Capability>) -> Self {
        Self { installed }
    }

    pub fn find_energy(&self) -> Option<usize> {
        self.installed
            .iter()
            .position(|c| matches!(c, Capability::Energy(_)))
    }

    pub fn find_heatsink(&self) -> Option<usize> {
        self.installed
            .iter()
            .position(|c| matches!(c, Capability::Heatsink(_)))
    }

    pub fn find_field(&self) -> Option<usize> {
        self.installed
            .iter()
            .position(|c| matches!(c, Capability::Field(_)))
    }

    pub fn energy(&self, index: Option<usize>) -> Option<&EnergySource> {
        match self.installed.get(index?)? {
            Capability::Energy(e) => Some(e),
            _ => None,
        }
    }

    pub fn energy_mut(&mut self, index: Option<usize>) -> Option<&mut EnergySource> {
        match self.installed.get_mut(index?)? {
            Capability::Energy(e) => Some(e),
            _ => None,
        }
    }

    pub fn heatsink(&self, index: Option<usize>) -> Option<&Heatsink> {
        match self.installed.get(index?)? {
            Capability::Heatsink(h) => Some(h),
            _ => None,
        }
    }

    pub fn heatsink_mut(&mut self, index: Option<usize>) -> Option<&mut Heatsink> {
        match self.installed.get_mut(index?)? {
            Capability::Heatsink(h) => Some(h),
            _ => None,
        }
    }

    pub fn field(&self, index: Option<usize>) -> Option<&ShieldField> {
        match self.installed.get(index?)? {
            Capability::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, index: Option<usize>) -> Option<&mut ShieldField> {
        match self.installed.get_mut(index?)? {
            Capability::Field(f) => Some(f),
            _ => None,
        }
    }
}
