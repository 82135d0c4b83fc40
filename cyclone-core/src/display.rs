//! Presentation helpers shared by every front end.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Whole-degree string, e.g. "82".
    pub fn format(self, celsius: f64) -> String {
        format!("{:.0}", self.convert(celsius))
    }

    pub fn letter(self) -> char {
        match self {
            TemperatureUnit::Celsius => 'C',
            TemperatureUnit::Fahrenheit => 'F',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        })
    }
}

impl FromStr for TemperatureUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(ConfigError::UnknownUnit(s.to_string())),
        }
    }
}

/// Icon family for an OpenWeather icon token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IconCategory {
    Clear,
    Clouds,
    Rain,
    Storm,
    Snow,
}

impl IconCategory {
    pub fn from_icon(code: &str) -> Self {
        if code.contains("01") {
            IconCategory::Clear
        } else if ["02", "03", "04"].iter().any(|c| code.contains(c)) {
            IconCategory::Clouds
        } else if code.contains("09") || code.contains("10") {
            IconCategory::Rain
        } else if code.contains("11") {
            IconCategory::Storm
        } else if code.contains("13") {
            IconCategory::Snow
        } else {
            IconCategory::Clouds
        }
    }

    /// Single-glyph rendering for terminals.
    pub fn glyph(self) -> &'static str {
        match self {
            IconCategory::Clear => "☀",
            IconCategory::Clouds => "☁",
            IconCategory::Rain => "☂",
            IconCategory::Storm => "⚡",
            IconCategory::Snow => "❄",
        }
    }
}

/// Salutation for a local hour of day.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}
