//! Shield controller: composes a structure's energy source, heatsink and
//! field emitter into one operational status and steps them each tick.
//!
//! Any capability may be missing. A missing capability never blocks the
//! shield: no heatsink means no thermal shutdown, no energy source means
//! the field is never starved.

use hecs::World;

use bastion_core::capabilities::CapabilitySet;
use bastion_core::components::{CapabilityBindings, ShieldController, Structure};
use bastion_core::enums::{MessageSeverity, ShieldStatus};
use bastion_core::events::{Message, SimEvent};
use bastion_core::lexicon::{Lexicon, TextKey};
use bastion_core::types::{GlobalTarget, Position};

use crate::map::thing_id;

/// What one controller tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Field state at the start of the tick.
    pub active: bool,
    /// The field dropped out this tick while it was wanted on.
    pub went_offline: bool,
}

/// Resolve capability bindings. Runs after construction and after every
/// respawn; bindings are never persisted.
pub fn post_init(controller: &mut ShieldController, caps: &CapabilitySet) {
    controller.bindings = CapabilityBindings {
        energy: caps.find_energy(),
        heatsink: caps.find_heatsink(),
        field: caps.find_field(),
    };
}

/// Forget transient history when the structure leaves the world. The field
/// goes down with it, so a respawn starts from a cold field.
pub fn on_removed_from_world(controller: &mut ShieldController, caps: &mut CapabilitySet) {
    controller.active_last_tick = false;
    if let Some(field) = caps.field_mut(controller.bindings.field) {
        field.shut_down();
    }
}

/// Current status. Thermal shutdown takes precedence over lack of power.
pub fn status(controller: &ShieldController, caps: &CapabilitySet) -> ShieldStatus {
    let b = controller.bindings;
    if caps
        .heatsink(b.heatsink)
        .is_some_and(|sink| sink.over_temperature())
    {
        return ShieldStatus::ThermalShutdown;
    }
    if caps.energy(b.energy).is_some_and(|energy| !energy.is_active()) {
        return ShieldStatus::Unpowered;
    }
    ShieldStatus::Online
}

pub fn is_active(controller: &ShieldController, caps: &CapabilitySet) -> bool {
    caps.field(controller.bindings.field)
        .is_some_and(|field| field.is_active())
}

/// Energy per tick the field asks for: negative, proportional to coverage.
pub fn base_power_consumption(controller: &ShieldController, caps: &CapabilitySet) -> f32 {
    caps.field(controller.bindings.field).map_or(0.0, |field| {
        -(field.protected_cell_count() as f32) * controller.power_per_tile
    })
}

/// Whether the structure is switched on. The energy source's switch wins;
/// without one the field's own switch is used.
pub fn wants_active(controller: &ShieldController, caps: &CapabilitySet) -> bool {
    let b = controller.bindings;
    match caps.energy(b.energy) {
        Some(energy) => energy.want_active,
        None => caps.field(b.field).map_or(true, |field| field.enabled),
    }
}

/// Flip the structure's switch. Returns the new state.
pub fn toggle(controller: &ShieldController, caps: &mut CapabilitySet) -> bool {
    let b = controller.bindings;
    if let Some(energy) = caps.energy_mut(b.energy) {
        energy.want_active = !energy.want_active;
        return energy.want_active;
    }
    if let Some(field) = caps.field_mut(b.field) {
        field.enabled = !field.enabled;
        return field.enabled;
    }
    true
}

/// One controller tick.
pub fn tick(controller: &mut ShieldController, caps: &mut CapabilitySet) -> TickOutcome {
    let b = controller.bindings;
    let active = is_active(controller, caps);
    let consumption = base_power_consumption(controller, caps);

    if let Some(energy) = caps.energy_mut(b.energy) {
        energy.base_consumption = consumption;
        energy.tick();
    }
    if let Some(sink) = caps.heatsink_mut(b.heatsink) {
        sink.tick();
    }

    let energy_ok = caps.energy(b.energy).map_or(true, |e| e.is_active());
    let overheated = caps
        .heatsink(b.heatsink)
        .is_some_and(|sink| sink.over_temperature());
    let heat = caps
        .field_mut(b.field)
        .map_or(0.0, |field| field.tick(energy_ok, overheated));
    if heat > 0.0 {
        if let Some(sink) = caps.heatsink_mut(b.heatsink) {
            sink.push_heat(heat);
        }
    }

    let went_offline = controller.active_last_tick && !active && wants_active(controller, caps);
    controller.active_last_tick = active;

    TickOutcome {
        active,
        went_offline,
    }
}

/// Base inspect text: one line per installed capability.
pub fn capability_lines(
    controller: &ShieldController,
    caps: &CapabilitySet,
    lexicon: &Lexicon,
) -> Vec<String> {
    let b = controller.bindings;
    let mut lines = Vec::new();
    if let Some(energy) = caps.energy(b.energy) {
        lines.push(format!(
            "{}: {:.0} / {:.0}",
            lexicon.text(TextKey::InspectEnergy),
            energy.stored,
            energy.capacity
        ));
    }
    if let Some(sink) = caps.heatsink(b.heatsink) {
        lines.push(format!(
            "{}: {:.1} / {:.1}",
            lexicon.text(TextKey::InspectTemperature),
            sink.temp,
            sink.over_temperature_threshold
        ));
    }
    if let Some(field) = caps.field(b.field) {
        lines.push(format!(
            "{}: {}",
            lexicon.text(TextKey::InspectProtectedCells),
            field.protected_cell_count()
        ));
    }
    lines
}

/// Inspect string: status line, then the base inspect text. Read-only.
pub fn describe(
    controller: &ShieldController,
    caps: &CapabilitySet,
    lexicon: &Lexicon,
) -> String {
    let mut text = lexicon.status_line(status(controller, caps));
    text.push('\n');
    text.push_str(&capability_lines(controller, caps, lexicon).join("\n"));
    text
}

/// Tick every shield structure in the world.
pub fn run(
    world: &mut World,
    tick_number: u64,
    messages: &mut Vec<Message>,
    events: &mut Vec<SimEvent>,
) {
    for (entity, (structure, position, caps, controller)) in world.query_mut::<(
        &Structure,
        &Position,
        &mut CapabilitySet,
        &mut ShieldController,
    )>() {
        let outcome = tick(controller, caps);
        if outcome.went_offline {
            tracing::warn!(
                target: "bastion::shield",
                structure = %structure.label,
                x = position.0.x,
                y = position.0.y,
                status = ?status(controller, caps),
                tick = tick_number,
                "shield.offline_unexpectedly"
            );
            messages.push(Message {
                key: TextKey::IncidentOffline,
                severity: MessageSeverity::NegativeEvent,
                target: GlobalTarget {
                    map: structure.map,
                    cell: position.0,
                },
                tick: tick_number,
            });
            events.push(SimEvent::ShieldOffline {
                structure: thing_id(entity),
            });
        }
    }
}
