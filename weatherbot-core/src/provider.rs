use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Config, model::LookupOutcome, provider::openweather::OpenWeatherClient};

pub mod openweather;

/// Current-weather lookup keyed by place name.
///
/// `Ok(LookupOutcome::NotFound)` means the provider answered but did not recognize
/// the place; transport and protocol failures are `Err`.
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn lookup(&self, place: &str) -> anyhow::Result<LookupOutcome>;
}

/// Construct the OpenWeather lookup from config.
pub fn lookup_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherLookup>> {
    let api_key = config.openweather_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weatherbot configure` or set OPENWEATHERMAP_API_KEY."
        )
    })?;

    Ok(Box::new(OpenWeatherClient::new(
        api_key.to_owned(),
        config.openweather.api_url.clone(),
    )))
}
