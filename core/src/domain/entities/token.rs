//! In-memory token value: claims plus the secrets needed to sign them.

use std::fmt;

use super::claims::ClaimSet;

/// A bearer token held by the caller
///
/// Owns its claim set and both signing components. The only mutation is
/// rotation, which swaps claims and cookie secret in place through a
/// `&mut Token`, so every holder of the handle observes the successor.
#[derive(Clone, PartialEq)]
pub struct Token {
    claims: ClaimSet,
    secret: String,
    cookie_secret: Option<String>,
}

impl Token {
    /// Reconstruct a token from already-assembled parts
    pub fn new(claims: ClaimSet, secret: impl Into<String>, cookie_secret: Option<String>) -> Self {
        Self {
            claims,
            secret: secret.into(),
            cookie_secret,
        }
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// Mutable access to the payload
    ///
    /// Edits are not trusted: validity checks re-sign and re-verify the
    /// current claims, so a broken edit makes the token invalid.
    pub fn claims_mut(&mut self) -> &mut ClaimSet {
        &mut self.claims
    }

    /// Unique token identifier, empty if the claim is missing
    pub fn jti(&self) -> &str {
        self.claims.jti().unwrap_or_default()
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn cookie_secret(&self) -> Option<&str> {
        self.cookie_secret.as_deref()
    }

    /// Seconds until expiry measured against `now`; negative once expired
    pub fn remaining_seconds(&self, now: i64) -> Option<i64> {
        self.claims.exp().map(|exp| exp - now)
    }

    /// Replace claims and cookie secret with those of `successor`
    pub(crate) fn replace_with(&mut self, successor: Token) {
        self.claims = successor.claims;
        self.cookie_secret = successor.cookie_secret;
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("claims", &self.claims)
            .field("secret", &"<redacted>")
            .field("cookie_secret", &self.cookie_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
