use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, Utc};
use tracing::info;

use crate::{
    config::{ClockConfig, ClockZone},
    format::{clock_time, not_found_text, weather_summary},
    model::{LookupOutcome, WeatherObservation},
    provider::WeatherLookup,
};

/// Turns a place name into the weather reply text.
#[derive(Debug)]
pub struct WeatherResponder {
    lookup: Box<dyn WeatherLookup>,
    clock: ClockConfig,
}

impl WeatherResponder {
    pub fn new(lookup: Box<dyn WeatherLookup>, clock: ClockConfig) -> Self {
        Self { lookup, clock }
    }

    /// Looks up `query` and renders the answer. `original` is the text as the user
    /// sent it (trimmed) and is what the not-found message quotes.
    pub async fn resolve(&self, query: &str, original: &str) -> Result<String> {
        let outcome = self
            .lookup
            .lookup(query)
            .await
            .with_context(|| format!("Weather lookup failed for {query:?}"))?;

        match outcome {
            LookupOutcome::Found(obs) => {
                info!(place = query, "weather found");
                Ok(self.render(&obs))
            }
            LookupOutcome::NotFound => {
                info!(place = query, "place not found");
                Ok(not_found_text(original))
            }
        }
    }

    fn render(&self, obs: &WeatherObservation) -> String {
        let sunrise = self.clock_time(obs.sunrise, obs);
        let sunset = self.clock_time(obs.sunset, obs);
        weather_summary(obs, &sunrise, &sunset, &self.clock.label)
    }

    fn clock_time(&self, timestamp: i64, obs: &WeatherObservation) -> String {
        match self.clock.zone {
            ClockZone::Local => clock_time(timestamp, &Local),
            ClockZone::Provider => match FixedOffset::east_opt(obs.utc_offset_secs) {
                Some(offset) => clock_time(timestamp, &offset),
                None => clock_time(timestamp, &Utc),
            },
        }
    }
}
