//! Token lifecycle service: creation, lookup, validity, revocation, rotation

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::entities::{ClaimSet, Token, TokenCookie, ROTATION_EXCLUDED};
use crate::errors::DomainError;
use crate::repositories::FlagStore;

use super::claim_builder::ClaimBuilder;
use super::codec::SigningCodec;
use super::config::TokenServiceConfig;

/// Number of random bytes in a cookie secret (hex-encoded to twice as many chars)
pub const COOKIE_SECRET_BYTES: usize = 32;

/// Optional overrides for [`TokenService::find`]
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Base secret to verify with instead of the configured one
    pub secret: Option<String>,
    /// Cookie secret presented alongside the token
    pub cookie_secret: Option<String>,
    /// Issuer to expect instead of the configured one
    pub issuer: Option<String>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_cookie_secret(mut self, cookie_secret: impl Into<String>) -> Self {
        self.cookie_secret = Some(cookie_secret.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

/// Why a rotation did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationRefusal {
    /// The token was issued by a different trust domain
    IssuerMismatch,
    /// Another caller revoked or rotated this `jti` first
    AlreadyRevoked,
}

/// Outcome of [`TokenService::rotate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rotation {
    /// The token now holds the successor; `previous_jti` is revoked
    Rotated { previous_jti: String },
    /// The token is unchanged
    Refused(RotationRefusal),
}

impl Rotation {
    pub fn is_rotated(&self) -> bool {
        matches!(self, Rotation::Rotated { .. })
    }
}

/// Lifecycle controller for signed bearer tokens
///
/// Combines the claim builder, the signing codec and a [`FlagStore`]. The
/// configuration is fixed at construction; build a second service to model
/// a configuration change.
pub struct TokenService<S: FlagStore> {
    store: S,
    config: TokenServiceConfig,
    codec: SigningCodec,
}

impl<S: FlagStore> TokenService<S> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Flag store for revocation and rotation markers
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or `DomainError::Config` if the configuration
    /// cannot be honoured
    pub fn new(store: S, config: TokenServiceConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let codec = SigningCodec::from_config(&config);

        Ok(Self {
            store,
            config,
            codec,
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &SigningCodec {
        &self.codec
    }

    /// Creates a new token
    ///
    /// Generates a cookie secret when cookie lock is on and assembles
    /// claims from defaults, configured claims and `overrides`. No flag
    /// store interaction.
    pub fn create(&self, overrides: ClaimSet) -> Token {
        let cookie_secret = self.config.cookie_lock.then(generate_cookie_secret);
        let claims = ClaimBuilder::new(&self.config).build(overrides);
        let token = Token::new(claims, self.config.secret.clone(), cookie_secret);

        debug!("Created token {}", token.jti());
        token
    }

    /// Signs the token's current claims into its wire form
    pub fn encode(&self, token: &Token) -> Result<String, DomainError> {
        self.codec
            .encode(token.claims(), token.secret(), token.cookie_secret())
            .map_err(DomainError::from)
    }

    /// Looks up a token from its wire form
    ///
    /// Decodes first and only then asks the flag store, so forged or
    /// expired tokens never cost a round-trip.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Token))` - Token verified and not revoked
    /// * `Ok(None)` - Token failed verification, carries no `jti`, or is revoked
    /// * `Err(DomainError)` - The flag store could not be queried
    pub async fn find(&self, token: &str, options: FindOptions) -> Result<Option<Token>, DomainError> {
        let secret = options.secret.unwrap_or_else(|| self.config.secret.clone());
        let issuer = options.issuer.as_deref().unwrap_or(&self.config.issuer);

        let claims = match self.codec.decode(
            token,
            &secret,
            options.cookie_secret.as_deref(),
            issuer,
            self.config.audience.as_deref(),
        ) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Token lookup rejected: {}", e);
                return Ok(None);
            }
        };

        let token = Token::new(claims, secret, options.cookie_secret);
        if token.claims().jti().is_none() {
            warn!("Token lookup rejected: token carries no jti");
            return Ok(None);
        }
        if self.store.is_revoked(token.jti()).await? {
            info!("Token lookup rejected: {} is revoked", token.jti());
            return Ok(None);
        }

        Ok(Some(token))
    }

    /// Flags `jti` for rotation on next use
    ///
    /// Advisory only; the token stays valid. The marker lives for the full
    /// configured expiry window.
    pub async fn mark_pending_rotation(&self, jti: &str) -> Result<(), DomainError> {
        self.store.rotate(jti, self.config.expiry_ttl()).await?;
        info!("Token {} marked for rotation", jti);
        Ok(())
    }

    /// Revokes `jti` without access to the live token
    ///
    /// The exact remaining lifetime is unknown here, so the marker lives
    /// for the full configured expiry window.
    pub async fn revoke_id(&self, jti: &str) -> Result<(), DomainError> {
        self.store.revoke(jti, self.config.expiry_ttl()).await?;
        info!("Token {} revoked by id", jti);
        Ok(())
    }

    /// Revokes a live token
    ///
    /// No-op for tokens that are already invalid. Otherwise the marker's
    /// TTL is the token's remaining lifetime, so it never outlives the
    /// token it blocks.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A revocation marker was written
    /// * `Ok(false)` - The token was already invalid
    pub async fn revoke(&self, token: &Token) -> Result<bool, DomainError> {
        if self.is_invalid(token).await? {
            debug!("Skipping revocation of invalid token {}", token.jti());
            return Ok(false);
        }

        self.store.revoke(token.jti(), remaining_ttl(token)).await?;
        info!("Token {} revoked", token.jti());
        Ok(true)
    }

    /// Replaces `token` in place with a freshly issued successor
    ///
    /// Refused without any flag store write when the token's issuer is not
    /// the configured one. A predecessor that still verifies and carries a
    /// `jti` is claimed
    /// with an atomic set-if-absent revocation; if that loses to a
    /// concurrent rotation or revocation, the token is left unchanged.
    ///
    /// The successor carries `overrides` if given, otherwise every claim
    /// of the predecessor except `iss`, `aud`, `exp`, `nbf`, `iat`, `jti`.
    pub async fn rotate(
        &self,
        token: &mut Token,
        overrides: Option<ClaimSet>,
    ) -> Result<Rotation, DomainError> {
        if token.claims().iss() != Some(self.config.issuer.as_str()) {
            warn!(
                "Refusing to rotate token {} from issuer {:?}",
                token.jti(),
                token.claims().iss()
            );
            return Ok(Rotation::Refused(RotationRefusal::IssuerMismatch));
        }

        let revocable = token.claims().jti().is_some() && self.verifies(token);
        if revocable && !self.store.try_revoke(token.jti(), remaining_ttl(token)).await? {
            info!("Token {} was already revoked, not rotating", token.jti());
            return Ok(Rotation::Refused(RotationRefusal::AlreadyRevoked));
        }

        let carried = overrides.unwrap_or_else(|| token.claims().without(&ROTATION_EXCLUDED));
        let successor = self.create(carried);
        let previous_jti = token.jti().to_string();
        token.replace_with(successor);

        info!("Token {} rotated to {}", previous_jti, token.jti());
        Ok(Rotation::Rotated { previous_jti })
    }

    /// Whether `token` is flagged for rotation
    pub async fn is_pending(&self, token: &Token) -> Result<bool, DomainError> {
        self.store.is_pending(token.jti()).await
    }

    /// Whether `token` carries a live revocation marker
    pub async fn is_revoked(&self, token: &Token) -> Result<bool, DomainError> {
        self.store.is_revoked(token.jti()).await
    }

    /// Whether `token`'s `ver` differs from the configured version
    ///
    /// Pure comparison, no flag store access.
    pub fn is_version_mismatch(&self, token: &Token) -> bool {
        let token_version = token.claims().ver().map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        });
        token_version.as_deref() != self.config.version.as_deref()
    }

    /// Authoritative liveness check
    ///
    /// Re-signs the current in-memory claims and verifies the result
    /// against the current configuration, exactly as a received token
    /// would be, then checks revocation. Expiry, claim edits and issuer or
    /// audience drift are all caught this way.
    pub async fn is_valid(&self, token: &Token) -> Result<bool, DomainError> {
        if !self.verifies(token) || token.claims().jti().is_none() {
            return Ok(false);
        }
        Ok(!self.is_revoked(token).await?)
    }

    pub async fn is_invalid(&self, token: &Token) -> Result<bool, DomainError> {
        Ok(!self.is_valid(token).await?)
    }

    /// Cookie carrying the token's cookie secret
    ///
    /// `None` when the token has no cookie secret or no readable `exp`.
    pub fn to_cookie(&self, token: &Token) -> Option<TokenCookie> {
        let value = token.cookie_secret()?;
        let expires = token.claims().expires_at()?;
        Some(TokenCookie::new(value, expires, &self.config.cookie))
    }

    /// Encode-then-decode round trip under the current configuration
    fn verifies(&self, token: &Token) -> bool {
        let result = self
            .codec
            .encode(token.claims(), token.secret(), token.cookie_secret())
            .and_then(|encoded| {
                self.codec.decode(
                    &encoded,
                    token.secret(),
                    token.cookie_secret(),
                    &self.config.issuer,
                    self.config.audience.as_deref(),
                )
            });

        match result {
            Ok(_) => true,
            Err(e) => {
                debug!("Token {} no longer verifies: {}", token.jti(), e);
                false
            }
        }
    }
}

/// Seconds until the token expires, at least one
fn remaining_ttl(token: &Token) -> u64 {
    token
        .remaining_seconds(Utc::now().timestamp())
        .unwrap_or(1)
        .max(1) as u64
}

/// Fresh random cookie secret, hex-encoded
pub fn generate_cookie_secret() -> String {
    hex::encode(rand::random::<[u8; COOKIE_SECRET_BYTES]>())
}
