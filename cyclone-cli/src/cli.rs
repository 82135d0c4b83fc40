use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cyclone_core::{
    Config, Coordinates, Dashboard, LocationQuery, TemperatureUnit, WeatherAlert,
    provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use tracing::info;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cyclone", version, about = "Philippine tropical-cyclone weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key, unit and default location.
    Configure,

    /// Show current conditions, today's hourly strip and the week ahead.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Temperature unit: c or f. Defaults to the configured unit.
        #[arg(long)]
        unit: Option<TemperatureUnit>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the weather notification for the current conditions.
    Alert {
        #[command(flatten)]
        location: LocationArgs,

        #[arg(long)]
        unit: Option<TemperatureUnit>,
    },

    /// Print the notification a push message payload would show.
    Push {
        /// JSON payload, e.g. '{"title":"Signal No. 2","body":"..."}'.
        payload: String,
    },

    /// Look up a place name.
    Locate {
        /// City or place name.
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name; geocoded through OpenWeather.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Latitude, used together with --lon.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude, used together with --lat.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    pub fn query(&self) -> LocationQuery {
        match (&self.city, self.lat, self.lon) {
            (Some(city), _, _) => LocationQuery::City(city.clone()),
            (None, Some(lat), Some(lon)) => LocationQuery::Coordinates(Coordinates { lat, lon }),
            _ => LocationQuery::Default,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_with(Config::load).await
    }

    /// Config is loaded only by the subcommands that read it.
    async fn run_with(self, load_config: impl Fn() -> anyhow::Result<Config>) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(&mut load_config()?).await?,
            Command::Show { location, unit, json } => {
                let config = load_config()?;
                let dashboard = dashboard(&config)?;
                let place = dashboard.resolve_location(location.query()).await?;
                let report = dashboard.load(place).await?;

                if json {
                    let out = serde_json::to_string_pretty(&report)
                        .context("Failed to serialize dashboard report")?;
                    println!("{out}");
                } else {
                    print!("{}", render::report(&report, unit.unwrap_or(config.unit)));
                }
            }
            Command::Alert { location, unit } => {
                let config = load_config()?;
                let dashboard = dashboard(&config)?;
                let place = dashboard.resolve_location(location.query()).await?;
                let current = dashboard.current(&place).await?;

                let alert =
                    WeatherAlert::for_conditions(&place.name, &current, unit.unwrap_or(config.unit));
                print!("{}", render::alert(&alert));
            }
            Command::Push { payload } => {
                print!("{}", render::alert(&WeatherAlert::from_push_payload(&payload)));
            }
            Command::Locate { name } => {
                let dashboard = dashboard(&load_config()?)?;
                let place = dashboard.resolve_location(LocationQuery::City(name)).await?;
                println!("{}", render::location(&place));
            }
        }

        Ok(())
    }
}

fn dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    Dashboard::new(provider_from_config(config)?, config)
}

async fn configure(config: &mut Config) -> anyhow::Result<()> {
    let mut key_prompt = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation();
    if config.stored_api_key().is_some() {
        key_prompt = key_prompt.with_help_message("leave empty to keep the current key");
    } else if config.is_configured() {
        key_prompt = key_prompt.with_help_message("leave empty to keep using OPENWEATHER_API_KEY");
    }

    let api_key = key_prompt.prompt()?;
    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.set_api_key(api_key.to_string());
    }
    // fail before the remaining prompts if there is still no key
    config.api_key()?;

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Temperature unit:", units).with_starting_cursor(start).prompt()?;

    let prompt = format!(
        "Default city (empty keeps {}):",
        config.default_location.display_name()
    );
    let city = Text::new(&prompt).prompt()?;
    let city = city.trim();

    if !city.is_empty() {
        let place = dashboard(config)?
            .resolve_location(LocationQuery::City(city.to_string()))
            .await?;
        println!("Default location: {}", render::location(&place));
        config.default_location = place;
    }

    config.save()?;
    let path = Config::config_file_path()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}
