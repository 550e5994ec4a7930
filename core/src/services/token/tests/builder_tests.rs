//! Tests for claim assembly

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use super::test_config;
use crate::domain::entities::ClaimSet;
use crate::services::token::ClaimBuilder;

#[test]
fn test_defaults_are_stamped() {
    let config = test_config();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let claims = ClaimBuilder::new(&config).build_at(ClaimSet::new(), now);

    assert_eq!(claims.nbf(), Some(now.timestamp()));
    assert_eq!(claims.iat(), Some(now.timestamp()));
    assert_eq!(claims.exp(), Some((now + Duration::seconds(3600)).timestamp()));
    assert_eq!(claims.iss(), Some("tokenlock-test"));
    assert!(Uuid::parse_str(claims.jti().unwrap()).is_ok());
    assert!(!claims.contains("aud"));
    assert!(!claims.contains("ver"));
}

#[test]
fn test_jti_is_fresh_per_build() {
    let config = test_config();
    let builder = ClaimBuilder::new(&config);

    let first = builder.build(ClaimSet::new());
    let second = builder.build(ClaimSet::new());

    assert_ne!(first.jti(), second.jti());
}

#[test]
fn test_configured_audience_version_and_base_claims() {
    let mut config = test_config();
    config.audience = Some("mobile".to_string());
    config.version = Some("7".to_string());
    config.base_claims.insert("tenant".to_string(), json!("acme"));

    let claims = ClaimBuilder::new(&config).build(ClaimSet::new());

    assert_eq!(claims.aud(), Some("mobile"));
    assert_eq!(claims.ver(), Some(&json!("7")));
    assert_eq!(claims.get("tenant"), Some(&json!("acme")));
}

#[test]
fn test_overrides_win_over_configuration() {
    let mut config = test_config();
    config.base_claims.insert("tenant".to_string(), json!("acme"));

    let overrides = ClaimSet::new()
        .with("tenant", "globex")
        .with("role", "admin")
        .with("jti", "fixed-id")
        .with("exp", 42i64);
    let claims = ClaimBuilder::new(&config).build(overrides);

    assert_eq!(claims.get("tenant"), Some(&json!("globex")));
    assert_eq!(claims.get("role"), Some(&json!("admin")));
    assert_eq!(claims.jti(), Some("fixed-id"));
    assert_eq!(claims.exp(), Some(42));
}

#[test]
fn test_exp_time_value_is_normalized() {
    let config = test_config();
    let expires = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    let overrides = ClaimSet::new().with("exp", expires.to_rfc3339());
    let claims = ClaimBuilder::new(&config).build(overrides);

    assert_eq!(claims.exp(), Some(expires.timestamp()));
}

#[test]
fn test_fractional_exp_is_truncated() {
    let config = test_config();

    let claims = ClaimBuilder::new(&config).build(ClaimSet::new().with("exp", 1_900_000_000.75f64));

    assert_eq!(claims.exp(), Some(1_900_000_000));
}
