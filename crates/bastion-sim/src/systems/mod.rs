//! ECS systems that operate on a map each tick.
//!
//! Systems are functions over `&mut World` / `&mut Map`.
//! They do not own state; all state lives in components and the map.

pub mod agents;
pub mod bombardment;
pub mod cleanup;
pub mod interception;
pub mod shield_controller;
pub mod snapshot;
pub mod threat_response;
