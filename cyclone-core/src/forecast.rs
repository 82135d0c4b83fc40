//! Forecast bucketing.
//!
//! Reshapes a time-ordered 3-hour forecast feed into the 8-point "today"
//! strip and the per-day summaries shown on the dashboard. Everything here
//! is pure: "today" and the local offset are passed in by the caller.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use std::collections::HashMap;

use crate::model::{DailySummary, ForecastBuckets, HourLabel, HourlyPoint, WeatherSample};

/// Number of points in the hourly strip.
pub const HOURLY_POINTS: usize = 8;

/// Maximum number of daily summaries returned.
pub const MAX_DAYS: usize = 7;

/// Spacing of the feed, used when padding the hourly strip.
const STEP_HOURS: u32 = 3;

/// Short weekday name ("Mon") of `ts` in the given local offset.
pub fn day_label(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    ts.with_timezone(&offset).format("%a").to_string()
}

/// The label `bucketize` treats as "today". Compute it once per fetch cycle.
pub fn today_label(now: DateTime<Utc>, offset: FixedOffset) -> String {
    day_label(now, offset)
}

/// Split `samples` into the hourly strip and the daily summaries.
///
/// `samples` must be in ascending timestamp order; no reordering is done.
/// Non-empty input always yields exactly [`HOURLY_POINTS`] hourly points,
/// the first labelled [`HourLabel::Now`]. Daily summaries follow the order
/// in which each day label is first seen and are capped at [`MAX_DAYS`].
/// Empty input yields empty buckets.
pub fn bucketize(samples: &[WeatherSample], today_label: &str, offset: FixedOffset) -> ForecastBuckets {
    let mut hourly: Vec<HourlyPoint> = Vec::with_capacity(HOURLY_POINTS);
    let mut last_hour: Option<u32> = None;

    let mut daily: Vec<DailySummary> = Vec::new();
    let mut day_index: HashMap<String, usize> = HashMap::new();

    for (index, sample) in samples.iter().enumerate() {
        let local = sample.timestamp.with_timezone(&offset);
        let day = local.format("%a").to_string();

        if (index < HOURLY_POINTS || day == today_label) && hourly.len() < HOURLY_POINTS {
            let label = if hourly.is_empty() { HourLabel::Now } else { HourLabel::Clock(local.hour()) };

            hourly.push(HourlyPoint {
                label,
                temperature: sample.temperature,
                icon: sample.weather.icon.clone(),
            });
            last_hour = Some(local.hour());
        }

        let pop_pct = sample.precipitation_probability * 100.0;

        match day_index.get(&day) {
            Some(&i) => {
                let summary = &mut daily[i];
                summary.temperature_max = summary.temperature_max.max(sample.temperature_max);
                summary.temperature_min = summary.temperature_min.min(sample.temperature_min);
                summary.precipitation_probability = summary.precipitation_probability.max(pop_pct);
            }
            None => {
                day_index.insert(day.clone(), daily.len());
                daily.push(DailySummary {
                    day_label: day,
                    day_of_month: local.day(),
                    month_label: local.format("%b").to_string(),
                    temperature_max: sample.temperature_max,
                    temperature_min: sample.temperature_min,
                    precipitation_probability: pop_pct,
                    humidity: sample.humidity,
                    wind_speed: sample.wind_speed,
                    weather: sample.weather.clone(),
                });
            }
        }
    }

    if let (Some(hour), Some(last)) = (last_hour, hourly.last().cloned()) {
        pad_hourly(&mut hourly, hour, last);
    }

    daily.truncate(MAX_DAYS);

    ForecastBuckets { hourly, daily }
}

/// Extend the strip to [`HOURLY_POINTS`] by stepping forward from the last
/// real point. These are placeholder estimates, not forecast data.
fn pad_hourly(hourly: &mut Vec<HourlyPoint>, mut hour: u32, last: HourlyPoint) {
    let mut temperature = last.temperature;

    while hourly.len() < HOURLY_POINTS {
        hour = (hour + STEP_HOURS) % 24;
        temperature += diurnal_adjustment(hour);

        hourly.push(HourlyPoint {
            label: HourLabel::Clock(hour),
            temperature,
            icon: last.icon.clone(),
        });
    }
}

/// Temperature step for an estimated point landing on `hour`.
fn diurnal_adjustment(hour: u32) -> f64 {
    match hour {
        // morning warm-up
        6..=11 => 1.0,
        // afternoon peak
        12..=17 => 0.5,
        _ => -0.5,
    }
}
