//! Signing codec: claim set <-> compact signed token string
//!
//! For HMAC algorithms the effective key is `secret || cookie_secret`. A
//! verifier needs both halves, so neither the token string plus cookie
//! secret nor the server secret alone is enough to forge or validate.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::domain::entities::claims::{ClaimSet, AUD, EXP, IAT, ISS};
use crate::errors::TokenError;

use super::config::TokenServiceConfig;
use super::key_manager::{KeyFamily, KeyPair};

/// Encodes and verifies signed tokens for one algorithm
#[derive(Debug, Clone)]
pub struct SigningCodec {
    algorithm: Algorithm,
    key_pair: Option<KeyPair>,
}

impl SigningCodec {
    /// Creates a codec; `key_pair` is required for asymmetric algorithms
    pub fn new(algorithm: Algorithm, key_pair: Option<KeyPair>) -> Self {
        Self { algorithm, key_pair }
    }

    pub fn from_config(config: &TokenServiceConfig) -> Self {
        Self::new(config.algorithm, config.key_pair.clone())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Sign `claims` into a compact token string
    ///
    /// Null-valued claims are dropped before signing. `cookie_secret` is
    /// appended to `secret` to form the HMAC key; asymmetric algorithms
    /// sign with the configured private key and ignore both.
    pub fn encode(
        &self,
        claims: &ClaimSet,
        secret: &str,
        cookie_secret: Option<&str>,
    ) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);
        let payload = claims.compact();

        let result = match self.asymmetric_keys()? {
            Some(pair) => encode(&header, &payload, pair.encoding_key()),
            None => encode(
                &header,
                &payload,
                &EncodingKey::from_secret(&signing_key(secret, cookie_secret)),
            ),
        };

        result.map_err(|e| TokenError::EncodingFailed {
            message: e.to_string(),
        })
    }

    /// Verify `token` and return its claims
    ///
    /// Checks signature, algorithm, `iss`, `aud` (when one is expected),
    /// `exp`, `nbf`, and that `iat` is not in the future, all with zero
    /// leeway. `sub` and the `jti` format are not inspected.
    pub fn decode(
        &self,
        token: &str,
        secret: &str,
        cookie_secret: Option<&str>,
        issuer: &str,
        audience: Option<&str>,
    ) -> Result<ClaimSet, TokenError> {
        let validation = self.validation(issuer, audience);

        let data = match self.asymmetric_keys()? {
            Some(pair) => decode::<ClaimSet>(token, pair.decoding_key(), &validation),
            None => decode::<ClaimSet>(
                token,
                &DecodingKey::from_secret(&signing_key(secret, cookie_secret)),
                &validation,
            ),
        }
        .map_err(|e| {
            let error = TokenError::from(e);
            debug!("Token verification failed: {}", error);
            error
        })?;

        check_issued_at(&data.claims)?;
        Ok(data.claims)
    }

    fn validation(&self, issuer: &str, audience: Option<&str>) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer]);

        match audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.set_required_spec_claims(&[EXP, ISS, AUD]);
            }
            None => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&[EXP, ISS]);
            }
        }
        validation
    }

    fn asymmetric_keys(&self) -> Result<Option<&KeyPair>, TokenError> {
        if KeyFamily::of(self.algorithm).is_symmetric() {
            return Ok(None);
        }
        self.key_pair
            .as_ref()
            .map(Some)
            .ok_or_else(|| TokenError::KeyLoad {
                message: format!("No key pair loaded for {:?}", self.algorithm),
            })
    }
}

/// Concatenate the base secret and the optional cookie secret
fn signing_key(secret: &str, cookie_secret: Option<&str>) -> Vec<u8> {
    let cookie_secret = cookie_secret.unwrap_or_default();
    let mut key = Vec::with_capacity(secret.len() + cookie_secret.len());
    key.extend_from_slice(secret.as_bytes());
    key.extend_from_slice(cookie_secret.as_bytes());
    key
}

fn check_issued_at(claims: &ClaimSet) -> Result<(), TokenError> {
    match claims.get(IAT) {
        None => Ok(()),
        Some(_) => match claims.iat() {
            Some(iat) if iat > Utc::now().timestamp() => Err(TokenError::IssuedInFuture),
            Some(_) => Ok(()),
            None => Err(TokenError::InvalidClaims {
                message: "iat must be an integer timestamp".to_string(),
            }),
        },
    }
}
