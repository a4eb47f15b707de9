//! Core types and definitions for the Bastion shield simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, leaf capabilities, commands, state snapshots, events,
//! settings and constants. It has no dependency on the ECS or any host.

pub mod capabilities;
pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod lexicon;
pub mod settings;
pub mod state;
pub mod types;
