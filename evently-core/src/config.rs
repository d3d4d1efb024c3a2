//! Environment-driven configuration
//!
//! Everything the service needs arrives through environment variables (the
//! binary calls `dotenvy::dotenv()` before this runs, so a local `.env` file
//! works too). Required values that are missing or blank fail here, at
//! startup, never later at query time.

use std::net::SocketAddr;

use thiserror::Error;

/// Default bind address for the HTTP server.
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Default JWT issuer expected on session tokens.
const DEFAULT_JWT_ISSUER: &str = "evently";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set; add it to the environment or a .env file")]
    Missing { name: &'static str },

    #[error("{name} is set but blank")]
    Blank { name: &'static str },

    #[error("{name} is not a valid socket address: '{value}'")]
    InvalidBindAddr { name: &'static str, value: String },
}

/// Service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. Required and non-empty; the connection
    /// cache re-checks this before any network attempt.
    pub database_url: String,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// HS256 secret used to verify session tokens.
    pub jwt_secret: String,

    /// Issuer expected on session tokens.
    pub jwt_issuer: String,

    /// Shared secret for identity-provider webhook deliveries. Unset
    /// disables verification (the server logs a warning at startup).
    pub webhook_secret: Option<String>,

    /// Allow any origin instead of the localhost-only default.
    pub cors_permissive: bool,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or blank,
    /// or when `EVENTLY_BIND_ADDR` does not parse.
    pub fn from_env() -> ConfigResult<Self> {
        let database_url = require("DATABASE_URL")?;
        let jwt_secret = require("EVENTLY_JWT_SECRET")?;
        let jwt_issuer =
            optional("EVENTLY_JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string());

        let bind_addr = match optional("EVENTLY_BIND_ADDR") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidBindAddr {
                name: "EVENTLY_BIND_ADDR",
                value,
            })?,
            None => SocketAddr::from(DEFAULT_BIND_ADDR),
        };

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            jwt_issuer,
            webhook_secret: optional("WEBHOOK_SECRET"),
            cors_permissive: optional("EVENTLY_CORS_PERMISSIVE")
                .map(|v| truthy(&v))
                .unwrap_or(false),
        })
    }
}

fn require(name: &'static str) -> ConfigResult<String> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::Blank { name }),
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::Missing { name }),
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so the whole flow lives in
    // one test to keep it race-free under the parallel test runner.
    #[test]
    fn from_env_round_trip() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/evently");
        std::env::set_var("EVENTLY_JWT_SECRET", "test-secret");
        std::env::set_var("EVENTLY_BIND_ADDR", "0.0.0.0:8080");
        std::env::set_var("WEBHOOK_SECRET", "whsec");
        std::env::set_var("EVENTLY_CORS_PERMISSIVE", "true");

        let config = AppConfig::from_env().expect("config should resolve");
        assert_eq!(config.database_url, "postgres://localhost/evently");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.jwt_issuer, "evently");
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec"));
        assert!(config.cors_permissive);

        std::env::set_var("EVENTLY_BIND_ADDR", "not-an-addr");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
        std::env::remove_var("EVENTLY_BIND_ADDR");

        std::env::set_var("DATABASE_URL", "   ");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Blank {
                name: "DATABASE_URL"
            })
        ));

        std::env::remove_var("DATABASE_URL");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Missing {
                name: "DATABASE_URL"
            })
        ));

        std::env::remove_var("EVENTLY_JWT_SECRET");
        std::env::remove_var("WEBHOOK_SECRET");
        std::env::remove_var("EVENTLY_CORS_PERMISSIVE");
    }

    #[test]
    fn truthy_values() {
        assert!(truthy("1"));
        assert!(truthy("true"));
        assert!(truthy(" yes "));
        assert!(!truthy("0"));
        assert!(!truthy("false"));
    }
}
