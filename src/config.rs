//! Runtime configuration read from the environment (and `.env`, loaded by the
//! binary through `dotenvy`).

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::StartupError;

pub const LIRR_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/lirr%2Fgtfs-lirr";
pub const DEFAULT_MODEL_PATH: &str = "lirr_delay_model.json";
pub const DEFAULT_COLUMNS_PATH: &str = "model_columns.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Feed URL or local file path.
    pub feed_source: String,
    pub model_path: PathBuf,
    pub columns_path: PathBuf,
    /// Optional JSON overrides for the built-in LIRR tables.
    pub static_data_path: Option<PathBuf>,
    /// Zone used to read departure times and calendar dates.
    pub timezone: Tz,
    pub fetch_timeout: Duration,
    pub display_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_source: LIRR_FEED_URL.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            columns_path: PathBuf::from(DEFAULT_COLUMNS_PATH),
            static_data_path: None,
            timezone: chrono_tz::America::New_York,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, StartupError> {
    name.parse::<Tz>()
        .map_err(|_| StartupError::UnknownTimeZone(name.to_string()))
}

impl AppConfig {
    /// Reads `FEED_URL`, `MODEL_PATH`, `MODEL_COLUMNS_PATH`, `STATIC_DATA_PATH`,
    /// `FEED_TIMEZONE`, `FETCH_TIMEOUT_SECS` and `DISPLAY_LIMIT`. Unset or
    /// unparsable numbers fall back to the defaults.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StartupError> {
        let defaults = Self::default();

        let timezone = match lookup("FEED_TIMEZONE") {
            Some(name) => parse_timezone(&name)?,
            None => defaults.timezone,
        };

        Ok(Self {
            feed_source: lookup("FEED_URL").unwrap_or(defaults.feed_source),
            model_path: lookup("MODEL_PATH").map_or(defaults.model_path, PathBuf::from),
            columns_path: lookup("MODEL_COLUMNS_PATH").map_or(defaults.columns_path, PathBuf::from),
            static_data_path: lookup("STATIC_DATA_PATH").map(PathBuf::from),
            timezone,
            fetch_timeout: lookup("FETCH_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.fetch_timeout, Duration::from_secs),
            display_limit: lookup("DISPLAY_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.display_limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.feed_source, LIRR_FEED_URL);
        assert_eq!(config.timezone, chrono_tz::America::New_York);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.display_limit, 10);
        assert!(config.static_data_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("FEED_URL", "feed.pb"),
            ("MODEL_PATH", "/models/m.json"),
            ("FEED_TIMEZONE", "UTC"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("DISPLAY_LIMIT", "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(config.feed_source, "feed.pb");
        assert_eq!(config.model_path, PathBuf::from("/models/m.json"));
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.display_limit, DEFAULT_DISPLAY_LIMIT);
    }

    #[test]
    fn test_unknown_timezone_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[("FEED_TIMEZONE", "Mars/Olympus")])).unwrap_err();
        assert!(matches!(err, StartupError::UnknownTimeZone(_)));
    }
}
