use chrono::{DateTime, Utc};

/// A forecast entry that cannot become a [`WeatherSample`](crate::WeatherSample).
///
/// Raised at the feed boundary so that bucketing only ever sees
/// fully-populated samples.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IngestError {
    #[error("forecast entry at {0} has no weather descriptor")]
    MissingWeather(DateTime<Utc>),

    #[error("forecast entry at {at} has humidity {value}%, expected 0-100")]
    HumidityOutOfRange { at: DateTime<Utc>, value: u8 },

    #[error("forecast entry at {at} has precipitation probability {value}, expected 0.0-1.0")]
    PrecipitationOutOfRange { at: DateTime<Utc>, value: f64 },

    #[error("forecast entry at {at} has negative wind speed {value}")]
    NegativeWindSpeed { at: DateTime<Utc>, value: f64 },

    #[error("invalid unix timestamp {0}")]
    InvalidTimestamp(i64),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("UTC offset of {0} hours is out of range (-23..=23)")]
    InvalidUtcOffset(i32),

    #[error("Unknown temperature unit '{0}'. Supported units: c, celsius, f, fahrenheit.")]
    UnknownUnit(String),
}
