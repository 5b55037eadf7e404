use log::LevelFilter;
use std::env;
use std::str::FromStr;
use url::Url;

use crate::error::ConfigError;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub bind_addr: String,
    pub log_level: LevelFilter,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl AppConfig {
    /// Reads settings from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("API_KEY"))
            .ok_or(ConfigError::Missing {
                name: "GEMINI_API_KEY",
            })?;

        let api_base = get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if let Err(e) = Url::parse(&api_base) {
            return Err(ConfigError::Invalid {
                name: "GEMINI_API_BASE",
                value: api_base,
                reason: e.to_string(),
            });
        }

        Ok(Self {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:9999".to_string()),
            log_level: parse_or("LOG_LEVEL", get("LOG_LEVEL"), LevelFilter::Debug)?,
            rate_limit_per_second: parse_or(
                "RATE_LIMIT_PER_SECOND",
                get("RATE_LIMIT_PER_SECOND"),
                5,
            )?,
            rate_limit_burst: parse_or("RATE_LIMIT_BURST", get("RATE_LIMIT_BURST"), 10)?,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = config_from(&[("GEMINI_API_KEY", "secret")]).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, DEFAULT_BASE_URL);
        assert_eq!(config.bind_addr, "0.0.0.0:9999");
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.rate_limit_per_second, 5);
        assert_eq!(config.rate_limit_burst, 10);
    }

    #[test]
    fn legacy_api_key_name_is_accepted() {
        let config = config_from(&[("API_KEY", "legacy"), ("LOG_LEVEL", "warn")]).unwrap();
        assert_eq!(config.api_key, "legacy");
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn missing_key_is_an_error() {
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "  ")]),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn bad_numbers_and_urls_are_rejected() {
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "k"), ("RATE_LIMIT_BURST", "lots")]),
            Err(ConfigError::Invalid {
                name: "RATE_LIMIT_BURST",
                ..
            })
        ));
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "k"), ("GEMINI_API_BASE", "not a url")]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
