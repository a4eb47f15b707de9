//! Display text lookup.
//!
//! The simulation only deals in `TextKey`s; a `Lexicon` turns them into
//! strings. English defaults are builtin and any entry can be overridden
//! from a JSON object of `{ "key": "text" }`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::ShieldStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKey {
    IncidentOffline,
    StatusOnline,
    StatusOffline,
    StatusBatteryTooLow,
    StatusThermalSafety,
    InspectEnergy,
    InspectTemperature,
    InspectProtectedCells,
}

impl TextKey {
    fn default_text(self) -> &'static str {
        match self {
            TextKey::IncidentOffline => "A shield has gone offline unexpectedly.",
            TextKey::StatusOnline => "Shield online",
            TextKey::StatusOffline => "Shield offline",
            TextKey::StatusBatteryTooLow => "battery too low",
            TextKey::StatusThermalSafety => "thermal safety engaged",
            TextKey::InspectEnergy => "Stored energy",
            TextKey::InspectTemperature => "Temperature",
            TextKey::InspectProtectedCells => "Protected cells",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    overrides: HashMap<TextKey, String>,
}

impl Lexicon {
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        let overrides: HashMap<TextKey, String> = serde_json::from_str(data)?;
        Ok(Self { overrides })
    }

    pub fn text(&self, key: TextKey) -> &str {
        self.overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_text())
    }

    /// One of the three fixed status lines.
    pub fn status_line(&self, status: ShieldStatus) -> String {
        match status {
            ShieldStatus::Unpowered => format!(
                "{} - {}",
                self.text(TextKey::StatusOffline),
                self.text(TextKey::StatusBatteryTooLow)
            ),
            ShieldStatus::ThermalShutdown => format!(
                "{} - {}",
                self.text(TextKey::StatusOffline),
                self.text(TextKey::StatusThermalSafety)
            ),
            ShieldStatus::Online => self.text(TextKey::StatusOnline).to_string(),
        }
    }
}
