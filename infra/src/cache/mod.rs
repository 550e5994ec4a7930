//! Cache module for the Redis-backed flag store
//!
//! Provides the Redis client with retry logic and the `FlagStore`
//! implementation built on it.

pub mod flag_store;
pub mod redis_client;


pub use flag_store::RedisFlagStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use tl_shared::config::CacheConfig;
