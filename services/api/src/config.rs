//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use home_services_core::{BookingPolicy, SlotTemplate, UserId};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Upper bound for `SESSION_TTL_DAYS`, roughly ten years.
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// How the identity of the caller is established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Validate the `session` cookie against the store.
    Session,
    /// Every request acts as the given user. For demos and tests only.
    Disabled { user_id: UserId },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// When unset, the in-memory store is used.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub cors_origin: String,
    pub auth_mode: AuthMode,
    pub session_ttl_days: i64,
    pub slot_template: SlotTemplate,
    pub booking_policy: BookingPolicy,
    /// Delay before the provider auto-reply; `None` disables auto-replies.
    pub auto_reply_delay: Option<Duration>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        // --- Load Auth Settings ---
        let auth_mode = match std::env::var("AUTH_MODE")
            .unwrap_or_else(|_| "session".to_string())
            .to_lowercase()
            .as_str()
        {
            "session" => AuthMode::Session,
            "disabled" => {
                let raw = std::env::var("DEFAULT_USER_ID").unwrap_or_else(|_| "1".to_string());
                let user_id = raw.parse::<UserId>().map_err(|e| {
                    ConfigError::InvalidValue("DEFAULT_USER_ID".to_string(), e.to_string())
                })?;
                AuthMode::Disabled { user_id }
            }
            other => {
                return Err(ConfigError::InvalidValue(
                    "AUTH_MODE".to_string(),
                    format!("'{}' is not one of 'session', 'disabled'", other),
                ))
            }
        };
        let session_ttl_days = check_session_ttl(parse_var("SESSION_TTL_DAYS", 30i64)?)?;

        // --- Load Booking Rules ---
        let slot_template = match std::env::var("SLOT_TEMPLATE") {
            Ok(raw) => {
                let entries: Vec<&str> = raw.split(',').collect();
                SlotTemplate::parse(&entries).map_err(|e| {
                    ConfigError::InvalidValue("SLOT_TEMPLATE".to_string(), e.to_string())
                })?
            }
            Err(_) => SlotTemplate::default(),
        };
        let booking_policy = BookingPolicy {
            enforce_unique_slot: parse_var("ENFORCE_UNIQUE_SLOT", true)?,
            require_future: parse_var("REQUIRE_FUTURE_BOOKINGS", false)?,
        };

        // --- Load Messaging Settings ---
        let auto_reply_enabled = parse_var("AUTO_REPLY_ENABLED", true)?;
        let auto_reply_secs = parse_var("AUTO_REPLY_DELAY_SECS", 10u64)?;
        let auto_reply_delay = auto_reply_enabled.then(|| Duration::from_secs(auto_reply_secs));

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            auth_mode,
            session_ttl_days,
            slot_template,
            booking_policy,
            auto_reply_delay,
        })
    }
}

/// Reads an optional variable, falling back to `default` when it is unset.
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Session lifetimes must be positive and small enough for timestamp arithmetic.
fn check_session_ttl(days: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::InvalidValue(
            "SESSION_TTL_DAYS".to_string(),
            format!("{} is outside 1..={}", days, MAX_SESSION_TTL_DAYS),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_accepts_the_supported_range() {
        assert_eq!(check_session_ttl(1).unwrap(), 1);
        assert_eq!(check_session_ttl(30).unwrap(), 30);
        assert_eq!(check_session_ttl(MAX_SESSION_TTL_DAYS).unwrap(), MAX_SESSION_TTL_DAYS);
    }

    #[test]
    fn session_ttl_rejects_out_of_range_values() {
        for days in [0, -5, MAX_SESSION_TTL_DAYS + 1, 100_000_000, i64::MAX] {
            let err = check_session_ttl(days).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidValue(name, _) if name == "SESSION_TTL_DAYS"),
                "{days} should be rejected"
            );
        }
    }
}
