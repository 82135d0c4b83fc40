//! One fetch cycle of the weather dashboard.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    Config,
    display::greeting,
    forecast::{bucketize, today_label},
    model::{Coordinates, CurrentWeather, DailySummary, HourlyPoint, Location},
    provider::WeatherProvider,
};

/// Where to show the weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
    Default,
}

/// Everything one dashboard render needs.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub location: Location,
    pub greeting: String,
    pub current: CurrentWeather,
    pub hourly: Vec<HourlyPoint>,
    pub daily: Vec<DailySummary>,
    pub generated_at: DateTime<Utc>,
}

pub struct Dashboard {
    provider: Box<dyn WeatherProvider>,
    offset: FixedOffset,
    default_location: Location,
}

impl Dashboard {
    pub fn new(provider: Box<dyn WeatherProvider>, config: &Config) -> Result<Self> {
        Ok(Self {
            provider,
            offset: config.utc_offset()?,
            default_location: config.default_location.clone(),
        })
    }

    pub async fn resolve_location(&self, query: LocationQuery) -> Result<Location> {
        match query {
            LocationQuery::City(name) => self
                .provider
                .geocode(&name)
                .await
                .with_context(|| format!("Could not find location '{name}'")),
            LocationQuery::Coordinates(coords) => match self.provider.reverse_geocode(coords).await {
                Ok(location) => Ok(location),
                Err(err) => {
                    warn!(error = %err, lat = coords.lat, lon = coords.lon, "reverse geocoding failed");
                    Ok(Location {
                        name: "Unknown Location".to_string(),
                        country: String::new(),
                        coordinates: coords,
                    })
                }
            },
            LocationQuery::Default => Ok(self.default_location.clone()),
        }
    }

    /// Current conditions only, without the forecast feed.
    pub async fn current(&self, location: &Location) -> Result<CurrentWeather> {
        info!(location = %location.display_name(), "fetching current conditions");
        self.provider
            .current(location.coordinates)
            .await
            .context("Failed to fetch current weather")
    }

    /// Fetch current conditions and the forecast feed, then bucket the feed.
    pub async fn load(&self, location: Location) -> Result<DashboardReport> {
        self.load_at(location, Utc::now()).await
    }

    /// [`Dashboard::load`] with an explicit clock.
    pub async fn load_at(&self, location: Location, now: DateTime<Utc>) -> Result<DashboardReport> {
        let coords = location.coordinates;
        info!(location = %location.display_name(), "fetching weather");

        let (current, samples) = tokio::try_join!(
            self.provider.current(coords),
            self.provider.forecast(coords),
        )
        .context("Failed to fetch weather data")?;

        let today = today_label(now, self.offset);
        let buckets = bucketize(&samples, &today, self.offset);
        info!(
            samples = samples.len(),
            hourly = buckets.hourly.len(),
            daily = buckets.daily.len(),
            "forecast bucketed"
        );

        let local_hour = now.with_timezone(&self.offset).hour();

        Ok(DashboardReport {
            location,
            greeting: greeting(local_hour).to_string(),
            current,
            hourly: buckets.hourly,
            daily: buckets.daily,
            generated_at: now,
        })
    }
}
