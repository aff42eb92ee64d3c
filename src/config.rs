/// Build-time configuration for the popup

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_STALE_SECS: u64 = 60;
pub const DEFAULT_MAX_PAGES: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Live,
    Fixture,
}

impl DataSourceKind {
    fn parse(raw: &str) -> Option<DataSourceKind> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "live" => Some(DataSourceKind::Live),
            "fixture" | "mock" => Some(DataSourceKind::Fixture),
            _ => None,
        }
    }

    /// Decided once at startup. Without an extension host there is no real
    /// video to analyse, so the fixture is used regardless of configuration.
    pub fn select(config: &AppConfig, has_extension_host: bool) -> DataSourceKind {
        if has_extension_host {
            config.data_source
        } else {
            DataSourceKind::Fixture
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub data_source: DataSourceKind,
    pub stale_time: Duration,
    pub max_pages: u32,
    pub log_level: log::Level,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: DEFAULT_API_URL.to_string(),
            data_source: if cfg!(debug_assertions) {
                DataSourceKind::Fixture
            } else {
                DataSourceKind::Live
            },
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            max_pages: DEFAULT_MAX_PAGES,
            log_level: log::Level::Info,
        }
    }
}

impl AppConfig {
    /// Values baked in at compile time via `GUARD_*` environment variables
    pub fn from_build_env() -> Result<AppConfig, ConfigError> {
        Self::from_lookup(|name| {
            let value = match name {
                "GUARD_API_URL" => option_env!("GUARD_API_URL"),
                "GUARD_DATA_SOURCE" => option_env!("GUARD_DATA_SOURCE"),
                "GUARD_STALE_SECS" => option_env!("GUARD_STALE_SECS"),
                "GUARD_MAX_PAGES" => option_env!("GUARD_MAX_PAGES"),
                "GUARD_LOG_LEVEL" => option_env!("GUARD_LOG_LEVEL"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(url) = lookup("GUARD_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("GUARD_DATA_SOURCE") {
            config.data_source = DataSourceKind::parse(&raw).ok_or(ConfigError::Invalid {
                name: "GUARD_DATA_SOURCE",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("GUARD_STALE_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "GUARD_STALE_SECS",
                value: raw.clone(),
            })?;
            config.stale_time = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("GUARD_MAX_PAGES") {
            config.max_pages = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|pages| *pages > 0)
                .ok_or(ConfigError::Invalid {
                    name: "GUARD_MAX_PAGES",
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup("GUARD_LOG_LEVEL") {
            config.log_level = raw.trim().parse::<log::Level>().map_err(|_| ConfigError::Invalid {
                name: "GUARD_LOG_LEVEL",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.stale_time, Duration::from_secs(60));
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.log_level, log::Level::Info);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GUARD_API_URL", "https://guard.example.com/"),
            ("GUARD_DATA_SOURCE", "LIVE"),
            ("GUARD_STALE_SECS", "30"),
            ("GUARD_MAX_PAGES", "3"),
            ("GUARD_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://guard.example.com");
        assert_eq!(config.data_source, DataSourceKind::Live);
        assert_eq!(config.stale_time, Duration::from_secs(30));
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.log_level, log::Level::Debug);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("GUARD_DATA_SOURCE", "carrier-pigeon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "GUARD_DATA_SOURCE",
                value: "carrier-pigeon".to_string()
            }
        );

        assert!(AppConfig::from_lookup(lookup_from(&[("GUARD_MAX_PAGES", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("GUARD_STALE_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_select_data_source() {
        let mut config = AppConfig::default();
        config.data_source = DataSourceKind::Live;

        assert_eq!(DataSourceKind::select(&config, true), DataSourceKind::Live);
        assert_eq!(DataSourceKind::select(&config, false), DataSourceKind::Fixture);
    }
}
