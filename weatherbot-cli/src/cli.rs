use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::{
    fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use weatherbot_core::{
    ClockZone, Config, WeatherResponder, WebhookHandler, format::capitalize_first,
    lookup_from_config,
};

use crate::serve;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Weather Telegram bot")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Telegram token, OpenWeather key and clock settings.
    Configure,

    /// Print the reply the bot would give for a place name.
    Weather {
        /// Place name, as a user would type it.
        #[arg(required = true)]
        place: Vec<String>,
    },

    /// Process one cloud-function event (`{"body": "<update json>"}`).
    Handle {
        /// File with the event JSON; read from stdin when absent.
        #[arg(long)]
        event: Option<PathBuf>,
    },

    /// Receive Telegram webhook updates over HTTP.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: SocketAddr,

        /// Route the webhook is registered on.
        #[arg(long, default_value = "/")]
        path: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Configure => configure(&path),
            Command::Weather { place } => {
                let config = load_with_env(&path)?;
                show_weather(&config, &place.join(" ")).await
            }
            Command::Handle { event } => {
                let config = load_with_env(&path)?;
                handle_event(&config, event.as_deref()).await
            }
            Command::Serve { listen, path: route } => {
                let config = load_with_env(&path)?;
                let handler = WebhookHandler::from_config(&config);
                serve::run(Arc::new(handler), listen, &route).await
            }
        }
    }
}

fn load_with_env(path: &Path) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());
    let mut config = Config::load_from(path)?;
    config.apply_env();
    Ok(config)
}

fn configure(path: &Path) -> Result<()> {
    let mut config = Config::load_from(path)?;

    if let Some(token) = prompt_secret("Telegram bot token:", config.telegram_bot_token())? {
        config.telegram.bot_token = Some(token);
    }
    if let Some(key) = prompt_secret("OpenWeather API key:", config.openweather_api_key())? {
        config.openweather.api_key = Some(key);
    }

    let zones = ClockZone::all().to_vec();
    let current = zones
        .iter()
        .position(|z| *z == config.clock.zone)
        .unwrap_or_default();
    config.clock.zone = Select::new("Show sunrise/sunset in:", zones)
        .with_starting_cursor(current)
        .prompt()?;

    config.clock.label = Text::new("Time zone label:")
        .with_default(&config.clock.label)
        .prompt()?;

    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

/// Empty input keeps the current value.
fn prompt_secret(message: &str, current: Option<&str>) -> Result<Option<String>> {
    let help = if current.is_some() {
        "leave empty to keep the current value"
    } else {
        "not configured yet"
    };

    let value = Password::new(message)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(help)
        .prompt()?;

    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

async fn show_weather(config: &Config, place: &str) -> Result<()> {
    let place = place.trim();
    if place.is_empty() {
        bail!("Place name must not be empty");
    }

    let responder = WeatherResponder::new(lookup_from_config(config)?, config.clock.clone());
    let text = responder.resolve(&capitalize_first(place), place).await?;
    println!("{text}");

    Ok(())
}

async fn handle_event(config: &Config, event: Option<&Path>) -> Result<()> {
    let json = match event {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("Failed to read event from stdin")?,
    };

    let handler = WebhookHandler::from_config(config);
    let event = WebhookHandler::parse_function_event(&json)?;
    let response = handler.handle_function_event(&event).await?;

    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_joins_multi_word_places() {
        let cli = Cli::try_parse_from(["weatherbot", "weather", "new", "york"]).unwrap();

        match cli.command {
            Command::Weather { place } => assert_eq!(place.join(" "), "new york"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn weather_requires_a_place() {
        assert!(Cli::try_parse_from(["weatherbot", "weather"]).is_err());
    }

    #[test]
    fn serve_has_defaults() {
        let cli = Cli::try_parse_from(["weatherbot", "serve"]).unwrap();

        match cli.command {
            Command::Serve { listen, path } => {
                assert_eq!(listen, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
                assert_eq!(path, "/");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["weatherbot", "handle", "--config", "/tmp/bot.toml"]).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/bot.toml")));
        assert!(matches!(cli.command, Command::Handle { event: None }));
    }
}
