use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Visual category of a forecast entry, as reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherDescriptor {
    /// Icon token, e.g. "10d".
    pub icon: String,
    /// Category label, e.g. "Rain".
    pub main: String,
    pub description: String,
}

/// One 3-hour forecast observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub humidity: u8,
    /// Fraction in 0.0..=1.0.
    pub precipitation_probability: f64,
    pub wind_speed: f64,
    pub weather: WeatherDescriptor,
}

/// Label of a point in the hourly strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourLabel {
    Now,
    /// Local hour of day, 0..=23.
    Clock(u32),
}

impl fmt::Display for HourLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HourLabel::Now => f.write_str("Now"),
            HourLabel::Clock(0) => f.write_str("12 AM"),
            HourLabel::Clock(12) => f.write_str("12 PM"),
            HourLabel::Clock(h) if h > 12 => write!(f, "{} PM", h - 12),
            HourLabel::Clock(h) => write!(f, "{h} AM"),
        }
    }
}

impl Serialize for HourLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HourLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HourLabel::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hour label '{s}'")))
    }
}

impl HourLabel {
    /// Parse the display form back, e.g. "3 PM" -> `Clock(15)`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "Now" {
            return Some(HourLabel::Now);
        }

        let (hour, period) = s.split_once(' ')?;
        let hour: u32 = hour.parse().ok()?;
        if !(1..=12).contains(&hour) {
            return None;
        }

        let h24 = match (period, hour) {
            ("AM", 12) => 0,
            ("AM", h) => h,
            ("PM", 12) => 12,
            ("PM", h) => h + 12,
            _ => return None,
        };

        Some(HourLabel::Clock(h24))
    }
}

/// One display-ready point of the "today" strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub label: HourLabel,
    pub temperature: f64,
    pub icon: String,
}

/// One aggregated forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Short weekday name, e.g. "Mon".
    pub day_label: String,
    pub day_of_month: u32,
    /// Short month name, e.g. "Oct".
    pub month_label: String,
    pub temperature_max: f64,
    pub temperature_min: f64,
    /// Percent, 0..=100.
    pub precipitation_probability: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub weather: WeatherDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBuckets {
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

impl Location {
    /// "City, CC", or just the city when the country is unknown.
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub weather: WeatherDescriptor,
    pub observation_time: DateTime<Utc>,
}
