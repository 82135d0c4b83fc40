use crate::{
    Config,
    model::{Coordinates, CurrentWeather, Location, WeatherSample},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Hosted weather feed the dashboard reads from.
///
/// Implementations validate what they receive: a returned
/// [`WeatherSample`] is always fully populated.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, coords: Coordinates) -> anyhow::Result<CurrentWeather>;

    /// Time-ascending 3-hour forecast samples.
    async fn forecast(&self, coords: Coordinates) -> anyhow::Result<Vec<WeatherSample>>;

    /// First match for a place name.
    async fn geocode(&self, query: &str) -> anyhow::Result<Location>;

    async fn reverse_geocode(&self, coords: Coordinates) -> anyhow::Result<Location>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let mut provider = OpenWeatherProvider::new(config.api_key()?);
    if let Some(base_url) = config.base_url() {
        provider = provider.with_base_url(base_url);
    }
    Ok(Box::new(provider))
}
