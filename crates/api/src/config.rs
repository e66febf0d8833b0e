// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! Settings for the zip-finder HTTP boundary, loaded in layers by the `config`
//! crate. Provider endpoints and the lookup deadline are compiled in and are
//! not part of this configuration.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{Result, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use external_apis::LOOKUP_DEADLINE;
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

use crate::error::{ServerError, ServerResult};

/// Prefix of the environment variables read by [`ServerConfig::load`]
pub const ENV_PREFIX: &str = "SERVER";

/// Longest request timeout accepted, in seconds
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Port the server listens on
///
/// Port 0 lets the OS pick one and is only accepted in the testing environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerPort(u16);

impl ServerPort {
    /// Default development port
    pub const DEVELOPMENT: Self = Self(3000);

    /// Ephemeral port for tests
    pub const EPHEMERAL: Self = Self(0);

    /// Wrap a port number
    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Whole-request timeout applied by the HTTP middleware
///
/// Always longer than [`LOOKUP_DEADLINE`], so a lookup that runs to its
/// deadline answers `204 No Content` before the middleware answers `408`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`
    ///
    /// # Errors
    ///
    /// Returns an error unless the timeout outlasts the lookup deadline and
    /// stays within [`MAX_TIMEOUT_SECONDS`].
    pub fn new(seconds: u64) -> Result<Self> {
        let timeout = Duration::from_secs(seconds);
        ensure!(
            timeout > LOOKUP_DEADLINE,
            "timeout must be longer than the {LOOKUP_DEADLINE:?} lookup deadline"
        );
        ensure!(
            seconds <= MAX_TIMEOUT_SECONDS,
            "timeout cannot exceed {MAX_TIMEOUT_SECONDS}"
        );
        Ok(Self(timeout))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self(Duration::from_secs(10))
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl Environment {
    /// Lowercase name, as used in `config.{name}.json`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Testing => "testing",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// zip-finder server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: ServerPort,
    /// Whole-request timeout in seconds
    pub timeout_seconds: TimeoutSeconds,
    /// Deployment environment
    pub environment: Environment,
    /// Answer 400 for zip codes with fewer than eight digits instead of looking them up
    #[serde(default)]
    pub strict_zip_validation: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::DEVELOPMENT,
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            strict_zip_validation: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from files and the environment
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration, later sources overriding earlier ones:
    ///
    /// 1. Built-in defaults
    /// 2. `config.json`, if present
    /// 3. `config.{environment}.json`, if present
    /// 4. `SERVER_*` variables (`SERVER_PORT`, `SERVER_STRICT_ZIP_VALIDATION`, ...)
    ///
    /// The environment is chosen by the `ENVIRONMENT` variable, defaulting to development.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("ENVIRONMENT")
            .map(|name| name.to_lowercase())
            .unwrap_or_else(|_| Environment::Development.as_str().to_string());

        let defaults = Self::default();
        let config: Self = Config::builder()
            .set_default("host", defaults.host.to_string())?
            .set_default("port", u64::from(defaults.port.value()))?
            .set_default("timeout_seconds", defaults.timeout_seconds.value().as_secs())?
            .set_default("strict_zip_validation", defaults.strict_zip_validation)?
            .add_source(File::with_name("config.json").required(false))
            .add_source(File::with_name(&format!("config.{environment}.json")).required(false))
            .add_source(
                ConfigEnv::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("environment", environment)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check constraints spanning several fields
    ///
    /// # Errors
    ///
    /// Returns an error when port 0 is requested outside the testing environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == ServerPort::EPHEMERAL && self.environment != Environment::Testing {
            return Err(ConfigError::Message(format!(
                "port 0 is only allowed in the testing environment, not {}",
                self.environment
            )));
        }
        Ok(())
    }

    /// Configuration for tests: loopback, ephemeral port, testing environment
    pub fn for_testing() -> Self {
        Self {
            port: ServerPort::EPHEMERAL,
            environment: Environment::Testing,
            ..Self::default()
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Result<ServerConfig, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn timeout_must_outlast_lookup_deadline() {
        assert!(TimeoutSeconds::new(0).is_err());
        assert!(TimeoutSeconds::new(1).is_err());
        assert!(TimeoutSeconds::new(MAX_TIMEOUT_SECONDS + 1).is_err());

        let shortest = TimeoutSeconds::new(2).unwrap();
        assert!(shortest.value() > LOOKUP_DEADLINE);
        assert!(TimeoutSeconds::new(MAX_TIMEOUT_SECONDS).is_ok());
        assert!(TimeoutSeconds::default().value() > LOOKUP_DEADLINE);
    }

    #[test]
    fn one_second_timeout_is_rejected_when_loaded() {
        let result = parse(serde_json::json!({
            "host": "127.0.0.1",
            "port": 8080,
            "timeout_seconds": 1,
            "environment": "development"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn ephemeral_port_only_in_testing() {
        assert!(ServerConfig::for_testing().validate().is_ok());

        let config = ServerConfig {
            port: ServerPort::EPHEMERAL,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            port: ServerPort::new(443),
            environment: Environment::Production,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn testing_config_binds_ephemeral_port() {
        let config = ServerConfig::for_testing();
        assert_eq!(config.socket_addr().port(), 0);
        assert_eq!(config.socket_addr().ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(!config.strict_zip_validation);
    }

    #[test]
    fn strict_validation_defaults_to_off() {
        let config = parse(serde_json::json!({
            "host": "0.0.0.0",
            "port": 8080,
            "timeout_seconds": 10,
            "environment": "production"
        }))
        .unwrap();

        assert!(!config.strict_zip_validation);
        assert_eq!(config.port.value(), 8080);
        assert_eq!(config.timeout_seconds.value(), Duration::from_secs(10));
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn environment_names() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Testing.as_str(), "testing");
    }
}
