//! Service settings from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use mailbridge_core::{FallbackPolicy, FetchOptions};

use crate::error::{Result, ServerError};

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8787";

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen address (`MAILBRIDGE_BIND`).
    pub bind: SocketAddr,
    /// Timeouts and failure policy applied to every fetch.
    pub options: FetchOptions,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] for a value that does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`. Unset and empty variables keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] for a value that does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut options = FetchOptions::default();

        let bind = match var("MAILBRIDGE_BIND") {
            Some(value) => parse("MAILBRIDGE_BIND", value, "a socket address like 0.0.0.0:8787")?,
            None => default_bind(),
        };

        if let Some(value) = var("MAILBRIDGE_STRICT") {
            options.policy = parse_policy(value)?;
        }
        if let Some(value) = var("MAILBRIDGE_CONNECT_TIMEOUT_SECS") {
            options.connect_timeout = seconds("MAILBRIDGE_CONNECT_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = var("MAILBRIDGE_IO_TIMEOUT_SECS") {
            options.io_timeout = seconds("MAILBRIDGE_IO_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = var("MAILBRIDGE_DEADLINE_SECS") {
            options.deadline = seconds("MAILBRIDGE_DEADLINE_SECS", value)?;
        }

        Ok(Self { bind, options })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            options: FetchOptions::default(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8787))
}

fn parse<T: FromStr>(name: &'static str, value: String, expected: &str) -> Result<T> {
    value.parse().map_err(|_| ServerError::Config {
        name,
        value,
        reason: format!("expected {expected}"),
    })
}

fn seconds(name: &'static str, value: String) -> Result<Duration> {
    match parse::<u64>(name, value.clone(), "a whole number of seconds")? {
        0 => Err(ServerError::Config {
            name,
            value,
            reason: "must be at least 1".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_policy(value: String) -> Result<FallbackPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(FallbackPolicy::Strict),
        "0" | "false" | "no" | "off" => Ok(FallbackPolicy::Substitute),
        _ => Err(ServerError::Config {
            name: "MAILBRIDGE_STRICT",
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}
