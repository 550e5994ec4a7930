//! Shared configuration and logging setup for TokenLock
//!
//! This crate provides functionality used across all workspace members:
//! - Configuration types and the layered loader
//! - Tracing subscriber initialization

pub mod config;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigLoadError, CookieConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, SameSite,
};
pub use logging::init_tracing;
