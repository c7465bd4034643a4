/// Process-level configuration.
///
/// Defaults come from the constant modules; every value can be overridden
/// through the environment (`PORT`, `REAPER_INTERVAL_SECS`,
/// `SESSION_MAX_AGE_SECS`, `MATCH_GOAL_LIMIT`).
use std::time::Duration;

use thiserror::Error;

use crate::config::matchmaking::{REAPER_INTERVAL_SECS, SESSION_MAX_AGE_SECS};

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Errors raised while reading the configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Timing of the session reaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperConfig {
    /// Delay between two sweeps.
    pub interval: Duration,
    /// Sessions older than this are destroyed.
    pub max_age: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(REAPER_INTERVAL_SECS),
            max_age: Duration::from_secs(SESSION_MAX_AGE_SECS),
        }
    }
}

/// Rules applied to every match session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchRules {
    /// Goals needed to win. `None` means sessions only end on disconnect or expiry.
    pub goal_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub reaper: ReaperConfig,
    pub rules: MatchRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            reaper: ReaperConfig::default(),
            rules: MatchRules::default(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    /// Unset or empty keys keep their default value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = read(&lookup, "PORT", "a port number")? {
            config.port = port;
        }
        if let Some(secs) = read::<u64, _>(&lookup, "REAPER_INTERVAL_SECS", "a positive number of seconds")? {
            if secs == 0 {
                return Err(invalid("REAPER_INTERVAL_SECS", "0", "a positive number of seconds"));
            }
            config.reaper.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = read(&lookup, "SESSION_MAX_AGE_SECS", "a number of seconds")? {
            config.reaper.max_age = Duration::from_secs(secs);
        }
        if let Some(limit) = read::<u32, _>(&lookup, "MATCH_GOAL_LIMIT", "a number of goals")? {
            // 0 disables the limit.
            config.rules.goal_limit = (limit > 0).then_some(limit);
        }

        Ok(config)
    }
}

fn read<T, F>(lookup: &F, key: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &raw, expected)),
        _ => Ok(None),
    }
}

fn invalid(key: &'static str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        expected,
    }
}
