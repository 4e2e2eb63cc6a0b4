//! Text rendering for weather replies.

use chrono::TimeZone;
use std::fmt::Display;

use crate::model::WeatherObservation;

const WIND_DIRECTIONS: [&str; 8] = ["С", "СВ", "В", "ЮВ", "Ю", "ЮЗ", "З", "СЗ"];

/// Compass label for a wind bearing in degrees, one of eight 45° buckets.
pub fn wind_direction(deg: f64) -> &'static str {
    let index = (deg / 45.0).round().rem_euclid(8.0) as usize;
    WIND_DIRECTIONS[index % WIND_DIRECTIONS.len()]
}

/// Formats a Unix timestamp as a zero-padded 24-hour `HH:MM` in `zone`.
pub fn clock_time<Tz>(timestamp: i64, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    zone.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Upper-cases the first character only; the rest is left as typed.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn not_found_text(place: &str) -> String {
    format!("Я не нашел населенный пункт \"{place}\".")
}

/// Renders the weather summary. `sunrise` and `sunset` are already clock strings.
pub fn weather_summary(
    obs: &WeatherObservation,
    sunrise: &str,
    sunset: &str,
    zone_label: &str,
) -> String {
    let visibility = obs
        .visibility_m
        .map_or_else(|| "None".to_string(), |v| v.to_string());

    format!(
        "{description}.\n\
         Температура {temp} ℃, ощущается как {feels_like} ℃.\n\
         Атмосферное давление {pressure} мм рт. ст.\n\
         Влажность {humidity} %.\n\
         Видимость {visibility} метров.\n\
         Ветер {wind_speed} м/с {direction}.\n\
         Восход солнца {sunrise} {zone_label}. Закат {sunset} {zone_label}.",
        description = obs.description,
        temp = obs.temperature_c,
        feels_like = obs.feels_like_c,
        pressure = obs.pressure,
        humidity = obs.humidity_pct,
        wind_speed = obs.wind_speed_mps,
        direction = wind_direction(obs.wind_deg),
    )
}
