//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing and companion cookie configuration
//! - `cache` - Redis flag store configuration
//! - `environment` - Environment detection and logging configuration
//!
//! Configuration is loaded once at process start and treated as immutable
//! afterwards; consumers receive it explicitly rather than through globals.

pub mod auth;
pub mod cache;
pub mod environment;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, CookieConfig, JwtConfig, SameSite};
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Prefix for environment variable overrides, e.g. `TOKENLOCK__AUTH__JWT__SECRET`
pub const ENV_PREFIX: &str = "TOKENLOCK";

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Flag store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the detected environment
    ///
    /// Reads `.env`, detects the [`Environment`], then reads its
    /// `.env.<environment>` before delegating to [`AppConfig::load_for`].
    /// Variables already set in the process are never overwritten by
    /// dotenv files.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        dotenvy::dotenv().ok();
        let environment = Environment::detect();
        dotenvy::from_filename(environment.env_file()).ok();

        Self::load_for(environment, path)
    }

    /// Load configuration for a known environment
    ///
    /// Sources are layered in order: the environment's logging preset,
    /// the file (`path`, or `tokenlock.<environment>.toml` when `None`;
    /// TOML, YAML or JSON by extension; missing files are skipped), then
    /// `TOKENLOCK__*` variables using `__` as the nesting separator.
    pub fn load_for(environment: Environment, path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let file = path.map(Path::to_path_buf).unwrap_or_else(|| environment.config_file());
        let logging = LoggingConfig::for_environment(environment);

        let config = config::Config::builder()
            .set_default("environment", environment.to_string())?
            .set_default("logging.level", logging.level)?
            .set_default("logging.format", logging.format.to_string())?
            .set_default("logging.colored", logging.colored)?
            .set_default("logging.source_location", logging.source_location)?
            .add_source(config::File::from(file.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<AppConfig>()?;

        tracing::debug!(
            environment = %config.environment,
            file = %file.display(),
            issuer = %config.auth.jwt.issuer,
            "Configuration loaded"
        );
        Ok(config)
    }
}
