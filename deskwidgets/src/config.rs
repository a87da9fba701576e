//! Application configuration
//!
//! Defaults first, then `DESKWIDGETS_*` environment variables:
//!
//! - `DESKWIDGETS_STORE_PATH`: where the widget collection is saved
//! - `DESKWIDGETS_WEATHER_API_KEY`: OpenWeatherMap key; weather is disabled without it
//! - `DESKWIDGETS_WEATHER_URL`: current-weather endpoint

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::STORE_FILE_NAME;

pub const ENV_PREFIX: &str = "DESKWIDGETS_";

pub const DEFAULT_WEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub store_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,
    pub weather_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: deskcore::storage::config_dir("deskwidgets").join(STORE_FILE_NAME),
            weather_api_key: None,
            weather_url: DEFAULT_WEATHER_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(Self::figment().merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Base figment holding only the defaults.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let mut config: AppConfig = figment.extract()?;
        // an empty key in the environment means "no key"
        if config.weather_api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            config.weather_api_key = None;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_store_file() {
        let config = AppConfig::from_figment(AppConfig::figment()).unwrap();
        assert!(config.store_path.ends_with(STORE_FILE_NAME));
        assert_eq!(config.weather_api_key, None);
        assert_eq!(config.weather_url, DEFAULT_WEATHER_URL);
    }

    #[test]
    fn overrides_replace_defaults() {
        let figment = AppConfig::figment()
            .merge(("store_path", "/tmp/custom.json"))
            .merge(("weather_api_key", "abc123"));
        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/custom.json"));
        assert_eq!(config.weather_api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn blank_api_key_is_none() {
        let figment = AppConfig::figment().merge(("weather_api_key", "  "));
        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.weather_api_key, None);
    }
}
