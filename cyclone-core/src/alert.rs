//! Weather notifications.
//!
//! Composes the title and body shown for current conditions. Delivering
//! them (browser push, desktop notifications) is up to the front end.

use serde::{Deserialize, Serialize};

use crate::{display::TemperatureUnit, model::CurrentWeather};

const PUSH_DEFAULT_TITLE: &str = "Weather Alert";
const PUSH_DEFAULT_BODY: &str = "Check your weather app for more details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Rain,
    Snow,
    Storm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherAlert {
    pub severity: Severity,
    pub title: String,
    pub body: String,
    /// OpenWeather icon token for the conditions, when known.
    pub icon: Option<String>,
}

/// Incoming push message; any field may be missing.
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

impl WeatherAlert {
    /// Pick the alert for the current conditions in `city`.
    pub fn for_conditions(city: &str, current: &CurrentWeather, unit: TemperatureUnit) -> Self {
        let main = current.weather.main.to_lowercase();
        let description = &current.weather.description;

        let (severity, title, body) = if ["typhoon", "storm", "thunderstorm"]
            .iter()
            .any(|k| main.contains(k))
        {
            (
                Severity::Storm,
                "Typhoon/Storm Alert!".to_string(),
                format!("Severe weather in {city}: {description}. Stay safe!"),
            )
        } else if main.contains("rain") {
            (
                Severity::Rain,
                "Rain Alert".to_string(),
                format!("Rain expected in {city}: {description}. Don't forget your umbrella!"),
            )
        } else if main.contains("snow") {
            (
                Severity::Snow,
                "Snow Alert".to_string(),
                format!("Snow in {city}: {description}. Dress warmly!"),
            )
        } else {
            let temp = unit.format(current.temperature);
            (
                Severity::Info,
                "Today's Weather".to_string(),
                format!("Weather in {city}: {description}, {temp}°{}.", unit.letter()),
            )
        };

        Self { severity, title, body, icon: Some(current.weather.icon.clone()) }
    }

    /// Build an alert from a push message body, filling in defaults for
    /// missing fields. Unparseable payloads get both defaults.
    pub fn from_push_payload(payload: &str) -> Self {
        let parsed: PushPayload = serde_json::from_str(payload).unwrap_or_default();

        Self {
            severity: Severity::Info,
            title: parsed.title.unwrap_or_else(|| PUSH_DEFAULT_TITLE.to_string()),
            body: parsed.body.unwrap_or_else(|| PUSH_DEFAULT_BODY.to_string()),
            icon: None,
        }
    }
}
