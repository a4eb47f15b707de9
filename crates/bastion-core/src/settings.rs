//! Tunable settings, loaded from JSON.
//!
//! Builtin values ship with the crate. A host may point
//! `BASTION_SETTINGS_PATH` (or pass a path) at an override file; a file that
//! cannot be read or parsed is logged and the builtin settings are used.
//! Settings are handed to the engine and controllers explicitly.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

const BUILTIN_SETTINGS: &str = include_str!("data/settings.json");

pub const SETTINGS_PATH_ENV: &str = "BASTION_SETTINGS_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldSettings {
    pub power_per_tile: f32,
    pub skyfaller_damage: f32,
    pub energy_per_damage: f32,
    pub heat_per_damage: f32,
    pub heat_per_tile: f32,
    pub field_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSettings {
    pub flee_trigger_distance: f32,
    pub max_regions: usize,
    pub search_cell_budget: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombardmentSettings {
    pub effective_radius: f32,
    pub impact_area_radius: f32,
    pub explosion_interval_ticks: u32,
    pub warmup_ticks: u32,
    pub duration_ticks: u32,
    pub explosion_radius_min: f32,
    pub explosion_radius_max: f32,
    pub explosion_damage_min: f32,
    pub explosion_damage_max: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub shields: ShieldSettings,
    #[serde(default)]
    pub response: ResponseSettings,
    #[serde(default)]
    pub bombardment: BombardmentSettings,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self {
            power_per_tile: POWER_PER_TILE,
            skyfaller_damage: SKYFALLER_DAMAGE,
            energy_per_damage: ENERGY_PER_DAMAGE,
            heat_per_damage: HEAT_PER_DAMAGE,
            heat_per_tile: HEAT_PER_TILE,
            field_radius: DEFAULT_FIELD_RADIUS,
        }
    }
}

impl Default for ResponseSettings {
    fn default() -> Self {
        Self {
            flee_trigger_distance: FLEE_TRIGGER_DISTANCE,
            max_regions: FLEE_MAX_REGIONS,
            search_cell_budget: FLEE_SEARCH_CELL_BUDGET,
        }
    }
}

impl Default for BombardmentSettings {
    fn default() -> Self {
        Self {
            effective_radius: BOMBARDMENT_EFFECTIVE_RADIUS,
            impact_area_radius: BOMBARDMENT_IMPACT_AREA_RADIUS,
            explosion_interval_ticks: BOMBARDMENT_EXPLOSION_INTERVAL_TICKS,
            warmup_ticks: BOMBARDMENT_WARMUP_TICKS,
            duration_ticks: BOMBARDMENT_DURATION_TICKS,
            explosion_radius_min: EXPLOSION_RADIUS_MIN,
            explosion_radius_max: EXPLOSION_RADIUS_MAX,
            explosion_damage_min: EXPLOSION_DAMAGE_MIN,
            explosion_damage_max: EXPLOSION_DAMAGE_MAX,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}

/// Load settings from `BASTION_SETTINGS_PATH` if set, else the builtin file.
pub fn load_settings_from_env() -> Settings {
    let override_path = env::var(SETTINGS_PATH_ENV).ok().map(PathBuf::from);
    load_settings(override_path.as_deref())
}

/// Load settings from `path`, falling back to the builtin settings.
pub fn load_settings(path: Option<&Path>) -> Settings {
    if let Some(path) = path {
        match read_settings_from_file(path) {
            Ok(settings) => {
                tracing::info!(
                    target: "bastion::settings",
                    path = %path.display(),
                    "settings.loaded=override"
                );
                return settings;
            }
            Err(err) => {
                tracing::warn!(
                    target: "bastion::settings",
                    path = %path.display(),
                    error = %err,
                    "settings.load_failed"
                );
            }
        }
    }

    match read_settings_from_str(BUILTIN_SETTINGS) {
        Ok(settings) => {
            tracing::info!(target: "bastion::settings", "settings.loaded=builtin");
            settings
        }
        Err(err) => {
            tracing::error!(
                target: "bastion::settings",
                error = %err,
                "settings.builtin_invalid"
            );
            Settings::default()
        }
    }
}

pub fn read_settings_from_file(path: &Path) -> Result<Settings, SettingsError> {
    let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_settings_from_str(&contents)
}

pub fn read_settings_from_str(data: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = serde_json::from_str(data)?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if settings.shields.power_per_tile < 0.0 {
        return Err(SettingsError::Invalid("shields.power_per_tile must be >= 0"));
    }
    if settings.shields.field_radius < 0.0 {
        return Err(SettingsError::Invalid("shields.field_radius must be >= 0"));
    }
    if settings.response.flee_trigger_distance < 0.0 {
        return Err(SettingsError::Invalid(
            "response.flee_trigger_distance must be >= 0",
        ));
    }
    let b = &settings.bombardment;
    if b.explosion_interval_ticks == 0 {
        return Err(SettingsError::Invalid(
            "bombardment.explosion_interval_ticks must be > 0",
        ));
    }
    if b.explosion_radius_min > b.explosion_radius_max
        || b.explosion_damage_min > b.explosion_damage_max
    {
        return Err(SettingsError::Invalid("bombardment ranges must be ordered"));
    }
    Ok(())
}
