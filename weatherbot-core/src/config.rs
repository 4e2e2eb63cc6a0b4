use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf, str::FromStr};

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_OPENWEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_CLOCK_LABEL: &str = "МСК";

/// Telegram Bot API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: default_telegram_api_url(),
        }
    }
}

/// OpenWeather current-weather endpoint access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_openweather_api_url")]
    pub api_url: String,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_openweather_api_url(),
        }
    }
}

/// Which clock sunrise and sunset are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockZone {
    /// The host's configured timezone.
    #[default]
    Local,
    /// The place's own offset, as reported by the provider.
    Provider,
}

impl ClockZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockZone::Local => "local",
            ClockZone::Provider => "provider",
        }
    }

    pub const fn all() -> &'static [ClockZone] {
        &[ClockZone::Local, ClockZone::Provider]
    }
}

impl fmt::Display for ClockZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockZone {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "local" => Ok(ClockZone::Local),
            "provider" => Ok(ClockZone::Provider),
            _ => Err(anyhow!(
                "Unknown clock zone '{value}'. Supported zones: local, provider."
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default)]
    pub zone: ClockZone,
    /// Abbreviation printed after sunrise and sunset times.
    #[serde(default = "default_clock_label")]
    pub label: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            zone: ClockZone::default(),
            label: default_clock_label(),
        }
    }
}

/// Both secrets the bot needs; only built when neither is missing.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub telegram_bot_token: String,
    pub openweather_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("telegram_bot_token", &"<redacted>")
            .field("openweather_api_key", &"<redacted>")
            .finish()
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [telegram]
/// bot_token = "..."
///
/// [openweather]
/// api_key = "..."
///
/// [clock]
/// zone = "local"
/// label = "МСК"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openweather: OpenWeatherConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

impl Config {
    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherbot", "weatherbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override secrets from `TELEGRAM_BOT_TOKEN` / `OPENWEATHERMAP_API_KEY`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TELEGRAM_TOKEN_ENV) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = lookup(OPENWEATHER_KEY_ENV) {
            self.openweather.api_key = Some(key);
        }
    }

    pub fn telegram_bot_token(&self) -> Option<&str> {
        non_blank(self.telegram.bot_token.as_deref())
    }

    pub fn openweather_api_key(&self) -> Option<&str> {
        non_blank(self.openweather.api_key.as_deref())
    }

    /// Both secrets, or `None` if either is missing or blank.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            telegram_bot_token: self.telegram_bot_token()?.to_owned(),
            openweather_api_key: self.openweather_api_key()?.to_owned(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

fn default_openweather_api_url() -> String {
    DEFAULT_OPENWEATHER_API_URL.to_string()
}

fn default_clock_label() -> String {
    DEFAULT_CLOCK_LABEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_public_apis() {
        let cfg = Config::default();

        assert_eq!(cfg.telegram.api_url, "https://api.telegram.org");
        assert_eq!(
            cfg.openweather.api_url,
            "https://api.openweathermap.org/data/2.5/weather"
        );
        assert_eq!(cfg.clock.zone, ClockZone::Local);
        assert_eq!(cfg.clock.label, "МСК");
        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [openweather]
            api_key = "OW"

            [clock]
            zone = "provider"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.openweather_api_key(), Some("OW"));
        assert_eq!(
            cfg.openweather.api_url,
            "https://api.openweathermap.org/data/2.5/weather"
        );
        assert_eq!(cfg.clock.zone, ClockZone::Provider);
        assert_eq!(cfg.clock.label, "МСК");
        assert!(cfg.telegram_bot_token().is_none());
    }

    #[test]
    fn credentials_require_both_secrets() {
        let mut cfg = Config::default();
        cfg.telegram.bot_token = Some("TG".into());
        assert!(cfg.credentials().is_none());

        cfg.openweather.api_key = Some("OW".into());
        let creds = cfg.credentials().expect("both secrets set");
        assert_eq!(creds.telegram_bot_token, "TG");
        assert_eq!(creds.openweather_api_key, "OW");
    }

    #[test]
    fn blank_secrets_count_as_missing() {
        let mut cfg = Config::default();
        cfg.telegram.bot_token = Some("TG".into());
        cfg.openweather.api_key = Some("   ".into());

        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.telegram.bot_token = Some("FROM_FILE".into());

        let env: HashMap<&str, String> = [
            (TELEGRAM_TOKEN_ENV, "FROM_ENV".to_string()),
            (OPENWEATHER_KEY_ENV, "KEY".to_string()),
        ]
        .into_iter()
        .collect();
        cfg.apply_env_from(|name| env.get(name).cloned());

        assert_eq!(cfg.telegram_bot_token(), Some("FROM_ENV"));
        assert_eq!(cfg.openweather_api_key(), Some("KEY"));
    }

    #[test]
    fn missing_file_loads_default() {
        let path = std::env::temp_dir().join("weatherbot-does-not-exist/config.toml");
        let cfg = Config::load_from(&path).expect("missing file is not an error");

        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn save_then_load_keeps_secrets() {
        let dir = std::env::temp_dir().join(format!("weatherbot-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.telegram.bot_token = Some("TG".into());
        cfg.openweather.api_key = Some("OW".into());
        cfg.clock.zone = ClockZone::Provider;
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded.credentials(), cfg.credentials());
        assert_eq!(loaded.clock.zone, ClockZone::Provider);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clock_zone_parses_case_insensitively() {
        assert_eq!("Provider".parse::<ClockZone>().ok(), Some(ClockZone::Provider));
        let err = "utc".parse::<ClockZone>().unwrap_err();
        assert!(err.to_string().contains("Unknown clock zone"));
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = Credentials {
            telegram_bot_token: "secret-token".into(),
            openweather_api_key: "secret-key".into(),
        };
        let shown = format!("{creds:?}");

        assert!(!shown.contains("secret"));
    }
}
