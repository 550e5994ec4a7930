//! Token signing and companion cookie configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Secret used when nothing else is configured
pub const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing and verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Algorithm name (HS256, HS384, HS512, RS256, ES256, EdDSA, ...)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Base secret for HMAC algorithms
    #[serde(default = "default_secret")]
    pub secret: String,

    /// PEM-encoded private key, asymmetric algorithms only
    #[serde(default)]
    pub private_key: Option<String>,

    /// PEM-encoded public key, asymmetric algorithms only
    #[serde(default)]
    pub public_key: Option<String>,

    /// Token lifetime in seconds
    #[serde(default = "default_expiry")]
    pub expiry: i64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default)]
    pub audience: Option<String>,

    /// Version tag stamped into every token as `ver`.
    /// Bumping it marks every outstanding token as stale.
    #[serde(default)]
    pub version: Option<String>,

    /// Claims merged into every new token before caller overrides
    #[serde(default)]
    pub base_claims: Map<String, Value>,

    /// Split the signing key between the server secret and a per-token
    /// cookie secret
    #[serde(default)]
    pub cookie_lock: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            secret: default_secret(),
            private_key: None,
            public_key: None,
            expiry: default_expiry(),
            issuer: default_issuer(),
            audience: None,
            version: None,
            base_claims: Map::new(),
            cookie_lock: false,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set token expiry in minutes
    pub fn with_expiry_minutes(mut self, minutes: i64) -> Self {
        self.expiry = minutes * 60;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_cookie_lock(mut self, enabled: bool) -> Self {
        self.cookie_lock = enabled;
        self
    }

    /// Add a claim that every new token carries
    pub fn with_base_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.base_claims.insert(name.into(), value.into());
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// SameSite attribute for the companion cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Transport defaults for the cookie carrying the cookie secret
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Cookie name
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Cookie domain
    #[serde(default)]
    pub domain: Option<String>,

    /// Cookie path
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Secure flag (HTTPS only)
    #[serde(default)]
    pub secure: bool,

    /// HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// SameSite attribute
    #[serde(default = "default_same_site")]
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            domain: None,
            path: default_cookie_path(),
            secure: false,  // Set to true in production
            http_only: default_http_only(),
            same_site: default_same_site(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Companion cookie configuration
    #[serde(default)]
    pub cookie: CookieConfig,
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_secret() -> String {
    String::from(DEFAULT_SECRET)
}

fn default_expiry() -> i64 {
    3600  // 1 hour
}

fn default_issuer() -> String {
    String::from("tokenlock")
}

fn default_cookie_name() -> String {
    String::from("tokenlock_secret")
}

fn default_cookie_path() -> String {
    String::from("/")
}

fn default_http_only() -> bool {
    true
}

fn default_same_site() -> SameSite {
    SameSite::Lax
}
