//! Core library for the `cyclone` weather dashboard.
//!
//! This crate defines:
//! - Forecast bucketing (hourly strip and daily summaries)
//! - Abstraction over the hosted weather feed, with an OpenWeather client
//! - The dashboard fetch cycle and weather alerts
//! - Configuration & credentials handling
//!
//! It is used by `cyclone-cli`, but can also be reused by other binaries or services.

pub mod alert;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;

pub use alert::WeatherAlert;
pub use config::{Config, ProviderConfig};
pub use dashboard::{Dashboard, DashboardReport, LocationQuery};
pub use display::{IconCategory, TemperatureUnit};
pub use error::{ConfigError, IngestError};
pub use forecast::bucketize;
pub use model::{
    Coordinates, CurrentWeather, DailySummary, ForecastBuckets, HourLabel, HourlyPoint, Location,
    WeatherDescriptor, WeatherSample,
};
pub use provider::{WeatherProvider, provider_from_config};
