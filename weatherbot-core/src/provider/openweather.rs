use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use crate::{
    error::ApiError,
    model::{LookupOutcome, WeatherObservation},
};

use super::WeatherLookup;

const SERVICE: &str = "OpenWeather";

#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    api_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            http: Client::new(),
        }
    }
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    async fn lookup(&self, place: &str) -> Result<LookupOutcome> {
        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("q", place),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::request(SERVICE, e))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        debug!(%status, place, "OpenWeather answered");

        Ok(parse_current(status, &body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    pressure: i64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

/// Current-weather body. Everything is optional because error bodies
/// (`{"cod": "404", "message": "city not found"}`) share the endpoint.
#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    visibility: Option<i64>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
    #[serde(default)]
    timezone: i32,
}

/// Interprets a current-weather answer.
///
/// A body without `main` is a not-found answer when OpenWeather reports success or
/// a bad/unknown query (400, 404); any other status is a failure, so a bad key or an
/// outage never reads as an unknown place.
fn parse_current(status: StatusCode, body: &str) -> Result<LookupOutcome, ApiError> {
    let parsed: OwCurrentResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => return Err(ApiError::status(SERVICE, status, body)),
        Err(source) => {
            return Err(ApiError::Decode {
                service: SERVICE,
                source,
            });
        }
    };

    let Some(main) = parsed.main else {
        return match status {
            s if s.is_success() => Ok(LookupOutcome::NotFound),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(LookupOutcome::NotFound),
            s => Err(ApiError::status(SERVICE, s, body)),
        };
    };

    let wind = parsed.wind.ok_or(ApiError::Incomplete {
        service: SERVICE,
        field: "wind",
    })?;
    let wind_deg = wind.deg.ok_or(ApiError::Incomplete {
        service: SERVICE,
        field: "wind.deg",
    })?;
    let sys = parsed.sys.ok_or(ApiError::Incomplete {
        service: SERVICE,
        field: "sys",
    })?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_default();

    Ok(LookupOutcome::Found(WeatherObservation {
        description,
        temperature_c: main.temp,
        feels_like_c: main.feels_like,
        pressure: main.pressure,
        humidity_pct: main.humidity,
        visibility_m: parsed.visibility,
        wind_speed_mps: wind.speed,
        wind_deg,
        sunrise: sys.sunrise,
        sunset: sys.sunset,
        utc_offset_secs: parsed.timezone,
    }))
}
