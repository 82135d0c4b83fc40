//! Human-readable output.

use std::fmt::Write;

use cyclone_core::{
    DashboardReport, IconCategory, Location, TemperatureUnit, WeatherAlert,
};

pub fn report(report: &DashboardReport, unit: TemperatureUnit) -> String {
    let mut out = String::new();
    let current = &report.current;
    let deg = |c: f64| format!("{}{}", unit.format(c), unit.symbol());

    let _ = writeln!(out, "{}! {}", report.greeting, report.location.display_name());
    let _ = writeln!(
        out,
        "{} {}  {}  (feels like {})",
        IconCategory::from_icon(&current.weather.icon).glyph(),
        deg(current.temperature),
        current.weather.description,
        deg(current.feels_like),
    );
    let _ = writeln!(
        out,
        "H: {}  L: {}  Humidity: {}%  Wind: {:.1} m/s",
        deg(current.temperature_max),
        deg(current.temperature_min),
        current.humidity,
        current.wind_speed,
    );

    if !report.hourly.is_empty() {
        let _ = writeln!(out, "\nToday");
        for point in &report.hourly {
            let _ = writeln!(
                out,
                "  {:<6} {} {}",
                point.label.to_string(),
                IconCategory::from_icon(&point.icon).glyph(),
                deg(point.temperature),
            );
        }
    }

    if !report.daily.is_empty() {
        let _ = writeln!(out, "\nNext days");
        for day in &report.daily {
            let _ = writeln!(
                out,
                "  {} {:>2} {}  {}  H: {}  L: {}  Rain: {:.0}%  Humidity: {}%  Wind: {:.1} m/s",
                day.day_label,
                day.day_of_month,
                day.month_label,
                IconCategory::from_icon(&day.weather.icon).glyph(),
                deg(day.temperature_max),
                deg(day.temperature_min),
                day.precipitation_probability,
                day.humidity,
                day.wind_speed,
            );
        }
    }

    out
}

pub fn alert(alert: &WeatherAlert) -> String {
    format!("{}\n{}\n", alert.title, alert.body)
}

pub fn location(location: &Location) -> String {
    format!(
        "{} ({:.4}, {:.4})",
        location.display_name(),
        location.coordinates.lat,
        location.coordinates.lon
    )
}
