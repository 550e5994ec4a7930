//! Transport representation of the cookie secret.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tl_shared::config::{CookieConfig, SameSite};

/// Cookie carrying a token's cookie secret to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCookie {
    pub name: String,
    pub value: String,
    /// Matches the token's `exp`
    pub expires: DateTime<Utc>,
    pub domain: Option<String>,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl TokenCookie {
    /// Build a cookie from a value, an expiry, and the configured transport options
    pub fn new(value: impl Into<String>, expires: DateTime<Utc>, options: &CookieConfig) -> Self {
        Self {
            name: options.name.clone(),
            value: value.into(),
            expires,
            domain: options.domain.clone(),
            path: options.path.clone(),
            secure: options.secure,
            http_only: options.http_only,
            same_site: options.same_site,
        }
    }
}

/// Renders a `Set-Cookie` header value
impl fmt::Display for TokenCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Expires={}; Path={}",
            self.name,
            self.value,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.path
        )?;
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        write!(f, "; SameSite={}", self.same_site)
    }
}
