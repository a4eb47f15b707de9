//! Simulation engine: runs one map at a fixed tick.
//!
//! `SimulationEngine` owns the map, processes player commands, runs all
//! systems in order and produces `MapSnapshot`s. Headless and seeded, so the
//! same seed and the same commands give the same run.

use std::collections::VecDeque;

use glam::IVec2;
use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bastion_ai::jobs;
use bastion_core::capabilities::CapabilitySet;
use bastion_core::commands::PlayerCommand;
use bastion_core::components::{Agent, JobTracker, ShieldController};
use bastion_core::enums::{JobEndCondition, ShieldStatus, SimPhase};
use bastion_core::events::{Message, SimEvent};
use bastion_core::lexicon::Lexicon;
use bastion_core::settings::Settings;
use bastion_core::state::MapSnapshot;
use bastion_core::types::{MapId, SimTime, ThingId};
use bastion_map::MapGrid;

use crate::error::SimError;
use crate::hooks::HookRegistry;
use crate::lifecycle::{self, StructureRecord};
use crate::map::{thing_id, Map};
use crate::systems;
use crate::systems::shield_controller;
use crate::world_setup::{self, ShieldBlueprint};

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub settings: Settings,
    pub map_id: MapId,
    pub grid: MapGrid,
    /// Give the map an interception registry. Without one nothing is blocked.
    pub interception: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            settings: Settings::default(),
            map_id: MapId(0),
            grid: world_setup::demo_grid(),
            interception: true,
        }
    }
}

/// The simulation engine. Owns the map and all sim state.
pub struct SimulationEngine {
    map: Map,
    hooks: HookRegistry,
    settings: Settings,
    lexicon: Lexicon,
    time: SimTime,
    phase: SimPhase,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    messages: Vec<Message>,
    events: Vec<SimEvent>,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        let map = if config.interception {
            Map::new(config.map_id, config.grid)
        } else {
            Map::without_registry(config.map_id, config.grid)
        };
        Self {
            map,
            hooks: HookRegistry::with_defaults(),
            settings: config.settings,
            lexicon: Lexicon::default(),
            time: SimTime::default(),
            phase: SimPhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            messages: Vec::new(),
            events: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> MapSnapshot {
        self.process_commands();

        if self.phase == SimPhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let messages = std::mem::take(&mut self.messages);
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.map,
            &self.time,
            self.phase,
            &self.lexicon,
            messages,
            events,
        )
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Register extra extension points or replace the defaults.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn set_lexicon(&mut self, lexicon: Lexicon) {
        self.lexicon = lexicon;
    }

    pub fn construct_shield(
        &mut self,
        blueprint: &ShieldBlueprint,
        cell: IVec2,
    ) -> Result<ThingId, SimError> {
        let entity =
            world_setup::construct_shield(&mut self.map, blueprint, cell, &self.settings.shields)?;
        Ok(thing_id(entity))
    }

    pub fn spawn_agent(&mut self, name: &str, cell: IVec2) -> Result<ThingId, SimError> {
        let entity = world_setup::spawn_agent(&mut self.map, name, cell)?;
        Ok(thing_id(entity))
    }

    pub fn call_bombardment(&mut self, cell: IVec2) -> Result<ThingId, SimError> {
        let entity =
            world_setup::spawn_bombardment(&mut self.map, cell, &self.settings.bombardment)?;
        tracing::info!(
            target: "bastion::sim",
            x = cell.x,
            y = cell.y,
            tick = self.time.tick,
            "bombardment.called"
        );
        Ok(thing_id(entity))
    }

    /// Remove a shield structure, returning its persisted record.
    pub fn despawn_structure(&mut self, id: ThingId) -> Result<StructureRecord, SimError> {
        let entity = self.map.entity(id).ok_or(SimError::UnknownThing(id))?;
        lifecycle::despawn(&mut self.map, entity)
    }

    pub fn respawn_structure(&mut self, record: StructureRecord) -> Result<ThingId, SimError> {
        let entity = lifecycle::respawn(&mut self.map, record)?;
        Ok(thing_id(entity))
    }

    /// Inspect text of a shield structure.
    pub fn inspect(&self, id: ThingId) -> Result<String, SimError> {
        self.with_shield(id, |controller, caps| {
            shield_controller::describe(controller, caps, &self.lexicon)
        })
    }

    pub fn shield_status(&self, id: ThingId) -> Result<ShieldStatus, SimError> {
        self.with_shield(id, shield_controller::status)
    }

    /// Flip a shield's switch. Returns whether it is now switched on.
    pub fn toggle_shield(&mut self, id: ThingId) -> Result<bool, SimError> {
        let entity = self.map.entity(id).ok_or(SimError::UnknownThing(id))?;
        let (caps, controller) = self
            .map
            .world
            .query_one_mut::<(&mut CapabilitySet, &ShieldController)>(entity)
            .map_err(|_| SimError::NotAShield(id))?;
        let on = shield_controller::toggle(controller, caps);
        tracing::info!(target: "bastion::shield", id = id.0, on, "shield.toggled");
        Ok(on)
    }

    fn with_shield<T>(
        &self,
        id: ThingId,
        f: impl FnOnce(&ShieldController, &CapabilitySet) -> T,
    ) -> Result<T, SimError> {
        let entity = self.map.entity(id).ok_or(SimError::UnknownThing(id))?;
        let mut query = self
            .map
            .world
            .query_one::<(&ShieldController, &CapabilitySet)>(entity)
            .map_err(|_| SimError::UnknownThing(id))?;
        let (controller, caps) = query.get().ok_or(SimError::NotAShield(id))?;
        Ok(f(controller, caps))
    }

    fn agent_entity(&self, id: ThingId) -> Result<Entity, SimError> {
        let entity = self.map.entity(id).ok_or(SimError::UnknownThing(id))?;
        if self.map.world.get::<&Agent>(entity).is_err() {
            return Err(SimError::NotAnAgent(id));
        }
        Ok(entity)
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                tracing::warn!(target: "bastion::sim", error = %err, "command.rejected");
            }
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) -> Result<(), SimError> {
        match command {
            PlayerCommand::ToggleShield { structure } => {
                self.toggle_shield(structure)?;
            }
            PlayerCommand::SetDrafted { agent, drafted } => {
                let entity = self.agent_entity(agent)?;
                let (state, tracker) = self
                    .map
                    .world
                    .query_one_mut::<(&mut Agent, &mut JobTracker)>(entity)
                    .map_err(|_| SimError::NotAnAgent(agent))?;
                state.drafted = drafted;
                if drafted {
                    jobs::end_job(tracker, JobEndCondition::InterruptForced);
                }
            }
            PlayerCommand::OrderGoto { agent, cell } => {
                if !self.map.grid.passable(cell) {
                    return Err(SimError::Impassable(cell));
                }
                let entity = self.agent_entity(agent)?;
                let tracker = self
                    .map
                    .world
                    .query_one_mut::<&mut JobTracker>(entity)
                    .map_err(|_| SimError::NotAnAgent(agent))?;
                jobs::try_preempt(tracker, jobs::goto_job(cell, self.time.tick));
            }
            PlayerCommand::CallBombardment { cell } => {
                self.call_bombardment(cell)?;
            }
            PlayerCommand::Pause => {
                if self.phase == SimPhase::Active {
                    self.phase = SimPhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Active;
                }
            }
        }
        Ok(())
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let tick = self.time.tick;
        // 1. Shield controllers
        systems::shield_controller::run(
            &mut self.map.world,
            tick,
            &mut self.messages,
            &mut self.events,
        );
        // 2. Interception registry from the fields that are now active
        if let Some(manager) = self.map.shields.as_mut() {
            manager.rebuild(&self.map.world);
        }
        // 3. Hazards (impacts consult the registry, then threat response)
        systems::bombardment::run(
            &mut self.map,
            &mut self.hooks,
            &self.settings,
            &mut self.rng,
            &mut self.events,
            tick,
        );
        // 4. Agent jobs
        systems::agents::run(&mut self.map.world, &self.map.grid);
        // 5. Cleanup
        systems::cleanup::run(&mut self.map.world, &mut self.despawn_buffer);
    }
}
