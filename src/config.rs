//! Process configuration, read once at startup and handed to each component.

use crate::utils::default_credentials_path;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NETATMO_API_URL: &str = "https://api.netatmo.com";
pub const DEFAULT_INFLUX_LOOKBACK: &str = "30d";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;
pub const DEFAULT_COOLDOWN_MINUTES: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the Netatmo API.
#[derive(Debug, Clone, PartialEq)]
pub struct NetatmoConfig {
    pub api_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// JSON file holding `CLIENT_ID`, `CLIENT_SECRET` and `REFRESH_TOKEN`.
    /// Environment values take precedence key by key.
    pub credentials_file: Option<PathBuf>,
    /// Upper bound for each HTTP request, including the token refresh.
    pub timeout: Duration,
}

/// Connection settings for InfluxDB v2.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    /// Flux duration bounding the cursor lookup, e.g. "30d".
    pub lookback: String,
    pub timeout: Duration,
}

/// Timing of the outer poll loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Wait after a failed station read. Longer than `interval`.
    pub cooldown: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub netatmo: NetatmoConfig,
    pub influx: InfluxConfig,
    pub poll: PollConfig,
    /// Zone the point timestamps are expressed in.
    pub timezone: Tz,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup. Values that
    /// are empty after trimming count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let timeout = match get("HTTP_TIMEOUT") {
            Some(value) => match value.parse::<u64>() {
                Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "HTTP_TIMEOUT",
                        value,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
        };

        let influx = InfluxConfig {
            url: require("INFLUX_URL")?.trim_end_matches('/').to_string(),
            token: require("INFLUX_TOKEN")?,
            org: require("INFLUX_ORG")?,
            bucket: require("INFLUX_BUCKET")?,
            lookback: match get("INFLUX_LOOKBACK") {
                Some(value) if is_flux_duration(&value) => value,
                Some(value) => {
                    return Err(ConfigError::Invalid {
                        key: "INFLUX_LOOKBACK",
                        value,
                        reason: "expected a Flux duration such as 1d or 30d".to_string(),
                    })
                }
                None => DEFAULT_INFLUX_LOOKBACK.to_string(),
            },
            timeout,
        };

        let interval = parse_minutes("READ_INTERVAL", &require("READ_INTERVAL")?)?;
        let cooldown = match get("READ_COOLDOWN") {
            Some(value) => parse_minutes("READ_COOLDOWN", &value)?,
            None => {
                let twice = interval.checked_mul(2).ok_or_else(|| ConfigError::Invalid {
                    key: "READ_INTERVAL",
                    value: (interval.as_secs() / 60).to_string(),
                    reason: "too large to derive a cooldown from".to_string(),
                })?;
                Duration::from_secs(DEFAULT_COOLDOWN_MINUTES * 60).max(twice)
            }
        };

        let timezone = match get("TIMEZONE") {
            Some(value) => value.parse::<Tz>().map_err(|e| ConfigError::Invalid {
                key: "TIMEZONE",
                value: value.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let netatmo = NetatmoConfig {
            api_url: get("NETATMO_API_URL")
                .unwrap_or_else(|| DEFAULT_NETATMO_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client_id: get("CLIENT_ID"),
            client_secret: get("CLIENT_SECRET"),
            refresh_token: get("REFRESH_TOKEN"),
            credentials_file: get("NETATMO_CREDENTIALS")
                .map(PathBuf::from)
                .or_else(default_credentials_path),
            timeout,
        };

        Ok(Config {
            netatmo,
            influx,
            poll: PollConfig { interval, cooldown },
            timezone,
        })
    }
}

fn parse_minutes(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>().ok().and_then(|m| m.checked_mul(60)) {
        Some(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a positive number of minutes within range".to_string(),
        }),
    }
}

/// Checks for a Flux duration literal (`1d`, `12h30m`, `2w`). The value is
/// interpolated into queries, so anything else is refused.
fn is_flux_duration(value: &str) -> bool {
    const UNITS: [&str; 11] = ["ns", "us", "µs", "ms", "mo", "s", "m", "h", "d", "w", "y"];
    let mut rest = value;
    if rest.is_empty() {
        return false;
    }
    while !rest.is_empty() {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &rest[digits..];
        match UNITS.iter().find(|unit| rest.starts_with(**unit)) {
            Some(unit) => rest = &rest[unit.len()..],
            None => return false,
        }
    }
    true
}
