//! # Infrastructure Layer
//!
//! Concrete flag store for the TokenLock core: a Redis client with retry
//! logic and the `RedisFlagStore` built on it. Any number of processes
//! pointing at the same Redis share one revocation view.

use tl_core::errors::DomainError;
use tracing::info;

/// Cache module - Redis client and flag store
pub mod cache;

/// Configuration module for infrastructure services
pub mod config {
    //! Re-exports of the shared configuration used by this crate
    pub use tl_shared::config::CacheConfig;
}

use cache::{RedisClient, RedisFlagStore};
use config::CacheConfig;

/// Connect to Redis and build a flag store on top of it
///
/// Fails when the URL cannot be parsed, the server cannot be reached
/// within the configured retries, or it does not answer PING.
pub async fn connect_flag_store(config: &CacheConfig) -> Result<RedisFlagStore, InfrastructureError> {
    info!("Initializing Redis flag store...");

    let client = RedisClient::new(config.clone()).await?;
    if !client.health_check().await? {
        return Err(InfrastructureError::General(
            "Redis did not answer PING".to_string(),
        ));
    }

    info!("Redis flag store initialized successfully");
    Ok(RedisFlagStore::new(client))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Store {
            message: error.to_string(),
        }
    }
}
