use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::IngestError,
    model::{Coordinates, CurrentWeather, Location, WeatherDescriptor, WeatherSample},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the provider at another host, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_body(&self, path: &str, what: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, what, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.get_body(path, what, query).await?;
        serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }

    async fn fetch_current(&self, coords: Coordinates) -> Result<CurrentWeather> {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        let body = self
            .get_body(
                "/data/2.5/weather",
                "current weather",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", "metric")],
            )
            .await?;

        parse_current(&body)
    }

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<Vec<WeatherSample>> {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        let body = self
            .get_body(
                "/data/2.5/forecast",
                "5-day forecast",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", "metric")],
            )
            .await?;

        let samples = parse_forecast(&body)?;
        debug!(count = samples.len(), "forecast samples ingested");
        Ok(samples)
    }

    async fn fetch_direct(&self, query: &str) -> Result<Location> {
        let found: Vec<OwGeoEntry> = self
            .get_json("/geo/1.0/direct", "geocoding", &[("q", query), ("limit", "1")])
            .await?;

        first_location(found)
    }

    async fn fetch_reverse(&self, coords: Coordinates) -> Result<Location> {
        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        let found: Vec<OwGeoEntry> = self
            .get_json(
                "/geo/1.0/reverse",
                "reverse geocoding",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("limit", "1")],
            )
            .await?;

        // keep the caller's coordinates, the lookup only names them
        first_location(found).map(|loc| Location { coordinates: coords, ..loc })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
}

impl From<OwWeather> for WeatherDescriptor {
    fn from(w: OwWeather) -> Self {
        Self { icon: w.icon, main: w.main, description: w.description }
    }
}

impl TryFrom<OwForecastEntry> for WeatherSample {
    type Error = IngestError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        let at = DateTime::from_timestamp(entry.dt, 0).ok_or(IngestError::InvalidTimestamp(entry.dt))?;

        let weather = entry.weather.into_iter().next().ok_or(IngestError::MissingWeather(at))?;

        if entry.main.humidity > 100 {
            return Err(IngestError::HumidityOutOfRange { at, value: entry.main.humidity });
        }
        if !(0.0..=1.0).contains(&entry.pop) {
            return Err(IngestError::PrecipitationOutOfRange { at, value: entry.pop });
        }
        if entry.wind.speed < 0.0 {
            return Err(IngestError::NegativeWindSpeed { at, value: entry.wind.speed });
        }

        Ok(WeatherSample {
            timestamp: at,
            temperature: entry.main.temp,
            temperature_max: entry.main.temp_max,
            temperature_min: entry.main.temp_min,
            humidity: entry.main.humidity,
            precipitation_probability: entry.pop,
            wind_speed: entry.wind.speed,
            weather: weather.into(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, coords: Coordinates) -> Result<CurrentWeather> {
        self.fetch_current(coords).await
    }

    async fn forecast(&self, coords: Coordinates) -> Result<Vec<WeatherSample>> {
        self.fetch_forecast(coords).await
    }

    async fn geocode(&self, query: &str) -> Result<Location> {
        self.fetch_direct(query).await
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Location> {
        self.fetch_reverse(coords).await
    }
}

fn parse_current(body: &str) -> Result<CurrentWeather> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather current weather JSON")?;

    let observation_time = DateTime::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

    let weather = parsed
        .weather
        .into_iter()
        .next()
        .map(WeatherDescriptor::from)
        .ok_or_else(|| anyhow!("OpenWeather current weather response contained no weather data"))?;

    Ok(CurrentWeather {
        location_name: parsed.name,
        temperature: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        temperature_max: parsed.main.temp_max,
        temperature_min: parsed.main.temp_min,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        weather,
        observation_time,
    })
}

/// Parse a 5-day / 3-hour feed. One malformed entry rejects the whole feed.
fn parse_forecast(body: &str) -> Result<Vec<WeatherSample>> {
    let parsed: OwForecastResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather forecast JSON")?;

    let samples = parsed
        .list
        .into_iter()
        .map(WeatherSample::try_from)
        .collect::<Result<Vec<_>, _>>()
        .context("OpenWeather forecast contained a malformed entry")?;

    Ok(samples)
}

fn first_location(found: Vec<OwGeoEntry>) -> Result<Location> {
    let entry = found.into_iter().next().ok_or_else(|| anyhow!("Location not found"))?;

    Ok(Location {
        name: entry.name,
        country: entry.country,
        coordinates: Coordinates { lat: entry.lat, lon: entry.lon },
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(dt: i64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {
                "temp": 27.3,
                "feels_like": 30.1,
                "temp_min": 26.8,
                "temp_max": 27.9,
                "humidity": 84
            },
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10n" }],
            "wind": { "speed": 2.4, "deg": 120 },
            "pop": 0.46,
            "dt_txt": "2024-10-14 00:00:00"
        })
    }

    #[test]
    fn parses_forecast_feed() {
        let body = json!({ "cod": "200", "list": [entry(1728864000), entry(1728874800)] }).to_string();
        let samples = parse_forecast(&body).expect("feed should parse");

        assert_eq!(samples.len(), 2);
        let first = &samples[0];
        assert_eq!(first.timestamp.timestamp(), 1728864000);
        assert_eq!(first.temperature, 27.3);
        assert_eq!(first.temperature_max, 27.9);
        assert_eq!(first.temperature_min, 26.8);
        assert_eq!(first.humidity, 84);
        assert_eq!(first.precipitation_probability, 0.46);
        assert_eq!(first.wind_speed, 2.4);
        assert_eq!(first.weather.icon, "10n");
        assert_eq!(first.weather.main, "Rain");
    }

    #[test]
    fn rejects_entry_without_weather() {
        let mut bad = entry(1728864000);
        bad["weather"] = json!([]);
        let body = json!({ "list": [entry(1728853200), bad] }).to_string();

        let err = parse_forecast(&body).unwrap_err();
        let ingest = err.downcast_ref::<IngestError>().expect("typed ingest error");
        assert!(matches!(ingest, IngestError::MissingWeather(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut bad = entry(1728864000);
        bad["pop"] = json!(1.5);
        let body = json!({ "list": [bad] }).to_string();
        let err = parse_forecast(&body).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::PrecipitationOutOfRange { .. })
        ));

        let mut bad = entry(1728864000);
        bad["main"]["humidity"] = json!(140);
        let body = json!({ "list": [bad] }).to_string();
        let err = parse_forecast(&body).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::HumidityOutOfRange { value: 140, .. })
        ));

        let mut bad = entry(1728864000);
        bad["wind"]["speed"] = json!(-1.0);
        let body = json!({ "list": [bad] }).to_string();
        let err = parse_forecast(&body).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::NegativeWindSpeed { .. })
        ));
    }

    #[test]
    fn missing_field_fails_deserialization() {
        let mut bad = entry(1728864000);
        bad["main"].as_object_mut().unwrap().remove("temp_max");
        let body = json!({ "list": [bad] }).to_string();

        let err = parse_forecast(&body).unwrap_err();
        assert!(err.to_string().contains("Failed to parse OpenWeather forecast JSON"));
    }

    #[test]
    fn parses_current_weather() {
        let body = json!({
            "name": "Manolo Fortich",
            "dt": 1728864000,
            "main": { "temp": 24.1, "feels_like": 24.9, "temp_min": 23.0, "temp_max": 25.2, "humidity": 91 },
            "weather": [{ "main": "Clouds", "description": "overcast clouds", "icon": "04n" }],
            "wind": { "speed": 1.2 }
        })
        .to_string();

        let current = parse_current(&body).unwrap();
        assert_eq!(current.location_name, "Manolo Fortich");
        assert_eq!(current.feels_like, 24.9);
        assert_eq!(current.weather.description, "overcast clouds");
        assert_eq!(current.observation_time.timestamp(), 1728864000);
    }

    #[test]
    fn first_location_errors_on_empty_result() {
        let err = first_location(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Location not found");
    }

    #[test]
    fn geocoding_entry_defaults_missing_country() {
        let found: Vec<OwGeoEntry> =
            serde_json::from_value(json!([{ "name": "Tacloban", "lat": 11.24, "lon": 125.0 }])).unwrap();
        let loc = first_location(found).unwrap();
        assert_eq!(loc.name, "Tacloban");
        assert_eq!(loc.country, "");
        assert_eq!(loc.coordinates.lat, 11.24);
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(250);
        assert_eq!(truncate_body(&long).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn rejects_unrepresentable_timestamp() {
        let raw: OwForecastEntry = serde_json::from_value(entry(i64::MAX)).unwrap();
        let err = WeatherSample::try_from(raw).unwrap_err();
        assert_eq!(err, IngestError::InvalidTimestamp(i64::MAX));

        let body = json!({ "list": [entry(1728864000), entry(i64::MAX)] }).to_string();
        let err = parse_forecast(&body).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IngestError>(),
            Some(IngestError::InvalidTimestamp(i64::MAX))
        ));
    }

    #[test]
    fn base_url_is_trimmed() {
        let provider = OpenWeatherProvider::new("KEY".into()).with_base_url("http://localhost:8080/");
        assert_eq!(provider.base_url, "http://localhost:8080");
    }

    /// Serves one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len(),
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn error_status_carries_status_and_truncated_body() {
        let (base_url, server) = serve_once("500 Internal Server Error", "e".repeat(300)).await;
        let provider = OpenWeatherProvider::new("KEY".into()).with_base_url(base_url);

        let err = provider
            .get_body("/data/2.5/forecast", "5-day forecast", &[("lat", "8.3675")])
            .await
            .unwrap_err();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /data/2.5/forecast?lat=8.3675&appid=KEY "));
        let msg = err.to_string();
        let prefix = "OpenWeather 5-day forecast request failed with status 500 Internal Server Error: ";
        assert!(msg.starts_with(prefix), "{msg}");
        assert_eq!(&msg[prefix.len()..], format!("{}...", "e".repeat(200)));
    }

    #[tokio::test]
    async fn success_status_returns_body() {
        let (base_url, server) = serve_once("200 OK", "{}".to_string()).await;
        let provider = OpenWeatherProvider::new("KEY".into()).with_base_url(base_url);

        let body = provider.get_body("/geo/1.0/direct", "geocoding", &[]).await.unwrap();
        server.await.unwrap();
        assert_eq!(body, "{}");
    }
}
