//! Application settings loaded from environment variables.
//!
//! `.env` is loaded by `main` before [`AppConfig::from_env`] runs, so values may come
//! from either the process environment or the file. The Discord token is deliberately
//! not part of this struct; it is read right before the client is built.

use super::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TRANSFORMATIONS_PATH: &str = "transformations.toml";
const DEFAULT_ROLEPLAY_TIMEOUT_HOURS: u64 = 72;
const DEFAULT_BEHAVIOUR_TICK_SECONDS: u64 = 60;
/// Ten years.
const MAX_ROLEPLAY_TIMEOUT_HOURS: u64 = 87_600;

/// Runtime settings shared by the bot and its behaviours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Path to the species/transformation catalog
    pub transformations_path: String,
    /// How long an active roleplay may go without messages before it is stopped
    pub roleplay_timeout: Duration,
    /// Delay between ticks of each background behaviour
    pub behaviour_tick: Duration,
    /// Guild to register commands in instead of globally (for development)
    pub dev_guild_id: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            transformations_path: DEFAULT_TRANSFORMATIONS_PATH.to_string(),
            roleplay_timeout: Duration::from_secs(DEFAULT_ROLEPLAY_TIMEOUT_HOURS * 3600),
            behaviour_tick: Duration::from_secs(DEFAULT_BEHAVIOUR_TICK_SECONDS),
            dev_guild_id: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a numeric variable is set but cannot be parsed, or
    /// if the roleplay timeout is zero or longer than ten years.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let transformations_path =
            lookup("TRANSFORMATIONS_PATH").unwrap_or(defaults.transformations_path);

        let roleplay_timeout = match parse_number(&lookup, "ROLEPLAY_TIMEOUT_HOURS")? {
            None => defaults.roleplay_timeout,
            Some(hours @ 1..=MAX_ROLEPLAY_TIMEOUT_HOURS) => Duration::from_secs(hours * 3600),
            Some(hours) => {
                return Err(Error::Config {
                    message: format!(
                        "ROLEPLAY_TIMEOUT_HOURS must be between 1 and \
                         {MAX_ROLEPLAY_TIMEOUT_HOURS}, got {hours}"
                    ),
                });
            }
        };
        let behaviour_tick = parse_number(&lookup, "BEHAVIOUR_TICK_SECONDS")?
            .map_or(defaults.behaviour_tick, Duration::from_secs);
        if behaviour_tick.is_zero() {
            return Err(Error::Config {
                message: "BEHAVIOUR_TICK_SECONDS must be greater than zero".to_string(),
            });
        }

        let dev_guild_id = parse_number(&lookup, "DEV_GUILD_ID")?;

        let config = Self {
            database_url,
            transformations_path,
            roleplay_timeout,
            behaviour_tick,
            dev_guild_id,
        };
        debug!(?config, "Loaded application configuration");
        info!("Application configuration loaded");
        Ok(config)
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<u64>().map_err(|e| Error::Config {
                message: format!("{key} must be a whole number, got '{raw}': {e}"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.roleplay_timeout, Duration::from_secs(72 * 3600));
    }

    #[test]
    fn test_values_are_read() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ROLEPLAY_TIMEOUT_HOURS", "2"),
            ("BEHAVIOUR_TICK_SECONDS", "5"),
            ("DEV_GUILD_ID", "1234"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.roleplay_timeout, Duration::from_secs(7200));
        assert_eq!(config.behaviour_tick, Duration::from_secs(5));
        assert_eq!(config.dev_guild_id, Some(1234));
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        let result = AppConfig::from_lookup(lookup_from(&[("ROLEPLAY_TIMEOUT_HOURS", "soon")]));
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = AppConfig::from_lookup(lookup_from(&[("BEHAVIOUR_TICK_SECONDS", "0")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_out_of_range_timeout_is_config_error() {
        for hours in ["0", "87601", "18446744073709551615"] {
            let result =
                AppConfig::from_lookup(lookup_from(&[("ROLEPLAY_TIMEOUT_HOURS", hours)]));
            assert!(matches!(result, Err(Error::Config { .. })), "{hours}");
        }

        let config =
            AppConfig::from_lookup(lookup_from(&[("ROLEPLAY_TIMEOUT_HOURS", "87600")])).unwrap();
        assert_eq!(config.roleplay_timeout, Duration::from_secs(87_600 * 3600));
    }
}
