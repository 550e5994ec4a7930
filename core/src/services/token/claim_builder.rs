//! Claim assembly for new tokens

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::claims::{self, ClaimSet};

use super::config::TokenServiceConfig;

/// Assembles the claim set of a new token
///
/// Layers, later wins: `{nbf, iat, jti}` defaults, configured claims
/// (`iss`, `aud`, `ver`, default `exp`, then `base_claims`), caller
/// overrides. `exp` is finally normalized to integer epoch seconds.
pub struct ClaimBuilder<'a> {
    config: &'a TokenServiceConfig,
}

impl<'a> ClaimBuilder<'a> {
    pub fn new(config: &'a TokenServiceConfig) -> Self {
        Self { config }
    }

    /// Build claims stamped with the current time
    pub fn build(&self, overrides: ClaimSet) -> ClaimSet {
        self.build_at(overrides, Utc::now())
    }

    /// Build claims as of `now`
    pub fn build_at(&self, overrides: ClaimSet, now: DateTime<Utc>) -> ClaimSet {
        let mut built = ClaimSet::new();
        built.set_time(claims::NBF, now);
        built.set_time(claims::IAT, now);
        built.insert(claims::JTI, Uuid::new_v4().to_string());

        built.merge(self.configured_claims(now));
        built.merge(overrides);
        built.normalize_time(claims::EXP);
        built
    }

    fn configured_claims(&self, now: DateTime<Utc>) -> ClaimSet {
        let mut configured = ClaimSet::new();
        configured.insert(claims::ISS, self.config.issuer.clone());
        if let Some(audience) = &self.config.audience {
            configured.insert(claims::AUD, audience.clone());
        }
        if let Some(version) = &self.config.version {
            configured.insert(claims::VER, version.clone());
        }
        configured.set_time(claims::EXP, now + Duration::seconds(self.config.expiry_seconds));

        configured.merge(ClaimSet::from(self.config.base_claims.clone()));
        configured
    }
}
