//! Subcommand handlers

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use tl_core::repositories::{FlagStore, InMemoryFlagStore};
use tl_core::services::token::{FindOptions, Rotation, TokenService, TokenServiceConfig};
use tl_core::{ClaimSet, Token};
use tl_infra::cache::RedisFlagStore;
use tl_infra::connect_flag_store;
use tl_shared::AppConfig;

/// Parse `key=value` pairs into claims
///
/// Values that parse as JSON keep their type (`admin=true`, `level=3`,
/// `scopes=["a","b"]`); anything else is taken as a plain string.
pub fn parse_claims(pairs: &[String]) -> Result<ClaimSet> {
    let mut claims = ClaimSet::new();
    for pair in pairs {
        let (name, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Claim '{}' is not in key=value form", pair))?;
        if name.is_empty() {
            bail!("Claim '{}' has an empty name", pair);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        claims.insert(name, value);
    }
    Ok(claims)
}

fn token_config(config: &AppConfig) -> Result<TokenServiceConfig> {
    TokenServiceConfig::from_app_config(config).context("Invalid token configuration")
}

async fn redis_service(config: &AppConfig) -> Result<TokenService<RedisFlagStore>> {
    let store = connect_flag_store(&config.cache)
        .await
        .context("Failed to connect to the flag store")?;
    Ok(TokenService::new(store, token_config(config)?)?)
}

fn issued<S: FlagStore>(service: &TokenService<S>, token: &Token) -> Result<Value> {
    Ok(json!({
        "token": service.encode(token)?,
        "jti": token.jti(),
        "claims": token.claims(),
        "cookie": service.to_cookie(token).map(|cookie| cookie.to_string()),
    }))
}

pub fn issue(config: &AppConfig, claims: &[String], expires_in: Option<i64>) -> Result<Value> {
    let mut token_config = token_config(config)?;
    if let Some(seconds) = expires_in {
        token_config.expiry_seconds = seconds;
    }
    // issuing never touches the flag store
    let service = TokenService::new(InMemoryFlagStore::new(), token_config)?;

    let token = service.create(parse_claims(claims)?);
    info!("Issued token {}", token.jti());
    issued(&service, &token)
}

pub async fn inspect(config: &AppConfig, token: &str, cookie_secret: Option<String>) -> Result<Value> {
    let service = redis_service(config).await?;
    let options = FindOptions {
        cookie_secret,
        ..FindOptions::default()
    };

    match service.find(token, options).await? {
        Some(found) => Ok(json!({
            "usable": true,
            "jti": found.jti(),
            "claims": found.claims(),
            "pending_rotation": service.is_pending(&found).await?,
            "version_mismatch": service.is_version_mismatch(&found),
        })),
        None => Ok(json!({ "usable": false })),
    }
}

pub async fn revoke(config: &AppConfig, jti: &str) -> Result<Value> {
    let service = redis_service(config).await?;
    service.revoke_id(jti).await?;
    Ok(json!({ "jti": jti, "revoked": true }))
}

pub async fn mark_pending(config: &AppConfig, jti: &str) -> Result<Value> {
    let service = redis_service(config).await?;
    service.mark_pending_rotation(jti).await?;
    Ok(json!({ "jti": jti, "pending_rotation": true }))
}

pub async fn rotate(
    config: &AppConfig,
    token: &str,
    cookie_secret: Option<String>,
    claims: &[String],
) -> Result<Value> {
    let service = redis_service(config).await?;
    let options = FindOptions {
        cookie_secret,
        ..FindOptions::default()
    };
    let mut current = service
        .find(token, options)
        .await?
        .ok_or_else(|| anyhow!("Token is not usable; nothing to rotate"))?;

    let overrides = if claims.is_empty() {
        None
    } else {
        Some(parse_claims(claims)?)
    };

    match service.rotate(&mut current, overrides).await? {
        Rotation::Rotated { previous_jti } => {
            let mut output = issued(&service, &current)?;
            output["previous_jti"] = json!(previous_jti);
            Ok(output)
        }
        Rotation::Refused(reason) => bail!("Rotation refused: {:?}", reason),
    }
}

pub async fn status(config: &AppConfig, jti: &str) -> Result<Value> {
    let service = redis_service(config).await?;
    let store = service.store();

    Ok(json!({
        "jti": jti,
        "revoked": store.is_revoked(jti).await?,
        "revoked_ttl": store.revocation_ttl(jti).await?,
        "pending_rotation": store.is_pending(jti).await?,
        "pending_ttl": store.pending_ttl(jti).await?,
    }))
}
