//! Configuration for the token service

use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde_json::{Map, Value};
use tracing::warn;
use tl_shared::config::{AppConfig, CookieConfig, JwtConfig};

use crate::errors::DomainError;

use super::key_manager::{KeyFamily, KeyPair};

/// Resolved, immutable configuration for the token lifecycle
///
/// Built once from the loaded application configuration and handed to the
/// service; nothing reads configuration from globals.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Base signing secret (HMAC algorithms)
    pub secret: String,
    /// Key pair for asymmetric algorithms
    pub key_pair: Option<KeyPair>,
    /// Token lifetime in seconds
    pub expiry_seconds: i64,
    /// Expected and stamped issuer
    pub issuer: String,
    /// Expected and stamped audience
    pub audience: Option<String>,
    /// Version tag stamped as `ver`
    pub version: Option<String>,
    /// Claims merged into every new token
    pub base_claims: Map<String, Value>,
    /// Secret-split mode
    pub cookie_lock: bool,
    /// Cookie transport defaults
    pub cookie: CookieConfig,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            secret: "development-secret-please-change-in-production".to_string(),
            key_pair: None,
            expiry_seconds: 3600,
            issuer: "tokenlock".to_string(),
            audience: None,
            version: None,
            base_claims: Map::new(),
            cookie_lock: false,
            cookie: CookieConfig::default(),
        }
    }
}

impl TokenServiceConfig {
    /// Resolve the JWT and cookie sections of the application configuration
    ///
    /// Production refuses to sign with the built-in development secret;
    /// other environments only warn.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, DomainError> {
        let resolved = Self::from_jwt_config(&config.auth.jwt, &config.auth.cookie)?;

        let default_secret = KeyFamily::of(resolved.algorithm).is_symmetric()
            && config.auth.jwt.is_using_default_secret();
        if default_secret {
            if config.environment.is_production() {
                return Err(DomainError::Config {
                    message: "The default signing secret cannot be used in production".to_string(),
                });
            }
            warn!("Signing with the default development secret ({})", config.environment);
        }

        Ok(resolved)
    }

    /// Resolve a JWT configuration section
    ///
    /// Parses the algorithm name and loads asymmetric keys when needed.
    pub fn from_jwt_config(jwt: &JwtConfig, cookie: &CookieConfig) -> Result<Self, DomainError> {
        let algorithm = Algorithm::from_str(&jwt.algorithm).map_err(|_| DomainError::Config {
            message: format!("Unknown JWT algorithm: {}", jwt.algorithm),
        })?;

        let key_pair = if KeyFamily::of(algorithm).is_symmetric() {
            None
        } else {
            match (&jwt.private_key, &jwt.public_key) {
                (Some(private_key), Some(public_key)) => {
                    Some(KeyPair::from_pem_strings(algorithm, private_key, public_key)?)
                }
                _ => None,
            }
        };

        let config = Self {
            algorithm,
            secret: jwt.secret.clone(),
            key_pair,
            expiry_seconds: jwt.expiry,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            version: jwt.version.clone(),
            base_claims: jwt.base_claims.clone(),
            cookie_lock: jwt.cookie_lock,
            cookie: cookie.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the lifecycle cannot honour
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.expiry_seconds <= 0 {
            return Err(DomainError::Config {
                message: "Token expiry must be positive".to_string(),
            });
        }
        if self.issuer.is_empty() {
            return Err(DomainError::Config {
                message: "Issuer must not be empty".to_string(),
            });
        }

        if KeyFamily::of(self.algorithm).is_symmetric() {
            if self.secret.is_empty() {
                return Err(DomainError::Config {
                    message: "HMAC algorithms require a non-empty secret".to_string(),
                });
            }
        } else {
            if self.key_pair.is_none() {
                return Err(DomainError::Config {
                    message: format!("{:?} requires a private and public key", self.algorithm),
                });
            }
            if self.cookie_lock {
                return Err(DomainError::Config {
                    message: "Cookie lock is only available with HMAC algorithms".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Expiry window as an unsigned TTL for flag store records
    pub fn expiry_ttl(&self) -> u64 {
        self.expiry_seconds.max(1) as u64
    }
}
