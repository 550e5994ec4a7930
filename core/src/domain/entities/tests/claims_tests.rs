//! Unit tests for the claim set

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use crate::domain::entities::claims::{ClaimSet, ROTATION_EXCLUDED};

fn sample() -> ClaimSet {
    ClaimSet::new()
        .with("jti", "5b1f0c5e-0000-4000-8000-000000000000")
        .with("iss", "tokenlock")
        .with("aud", "api")
        .with("exp", 2_000_000_000i64)
        .with("iat", 1_700_000_000i64)
        .with("nbf", 1_700_000_000i64)
        .with("ver", "3")
        .with("role", "admin")
}

#[test]
fn test_reserved_accessors() {
    let claims = sample();
    assert_eq!(claims.jti(), Some("5b1f0c5e-0000-4000-8000-000000000000"));
    assert_eq!(claims.iss(), Some("tokenlock"));
    assert_eq!(claims.aud(), Some("api"));
    assert_eq!(claims.exp(), Some(2_000_000_000));
    assert_eq!(claims.iat(), Some(1_700_000_000));
    assert_eq!(claims.nbf(), Some(1_700_000_000));
    assert_eq!(claims.ver(), Some(&Value::from("3")));
    assert_eq!(
        claims.expires_at(),
        Utc.timestamp_opt(2_000_000_000, 0).single()
    );
}

#[test]
fn test_merge_overrides_win() {
    let mut base = ClaimSet::new().with("role", "user").with("tenant", "acme");
    base.merge(ClaimSet::new().with("role", "admin"));

    assert_eq!(base.get("role"), Some(&json!("admin")));
    assert_eq!(base.get("tenant"), Some(&json!("acme")));
}

#[test]
fn test_without_rotation_excluded() {
    let carried = sample().without(&ROTATION_EXCLUDED);

    assert_eq!(carried.len(), 2);
    assert_eq!(carried.get("role"), Some(&json!("admin")));
    assert_eq!(carried.get("ver"), Some(&json!("3")));
    for name in ROTATION_EXCLUDED {
        assert!(!carried.contains(name), "{} should not be carried", name);
    }
}

#[test]
fn test_compact_drops_nulls() {
    let claims = ClaimSet::new()
        .with("role", "admin")
        .with("nickname", Value::Null)
        .with("flags", json!([]));

    let compacted = claims.compact();
    assert!(!compacted.contains("nickname"));
    assert!(compacted.contains("role"));
    assert!(compacted.contains("flags"));
}

#[test]
fn test_normalize_time_from_rfc3339() {
    let mut claims = ClaimSet::new().with("exp", "2033-05-18T03:33:20Z");
    claims.normalize_time("exp");
    assert_eq!(claims.exp(), Some(2_000_000_000));
}

#[test]
fn test_normalize_time_from_fractional_seconds() {
    let mut claims = ClaimSet::new().with("exp", 2_000_000_000.75f64);
    claims.normalize_time("exp");
    assert_eq!(claims.exp(), Some(2_000_000_000));
}

#[test]
fn test_normalize_time_leaves_garbage_alone() {
    let mut claims = ClaimSet::new().with("exp", "tomorrow");
    claims.normalize_time("exp");
    assert_eq!(claims.get("exp"), Some(&json!("tomorrow")));
    assert_eq!(claims.exp(), None);
}

#[test]
fn test_set_time() {
    let mut claims = ClaimSet::new();
    let at = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
    claims.set_time("exp", at);
    assert_eq!(claims.exp(), Some(1_800_000_000));
}

#[test]
fn test_serializes_as_plain_object() {
    let claims = ClaimSet::new().with("role", "admin");
    assert_eq!(serde_json::to_value(&claims).unwrap(), json!({"role": "admin"}));

    let parsed: ClaimSet = serde_json::from_value(json!({"jti": "abc", "exp": 1})).unwrap();
    assert_eq!(parsed.jti(), Some("abc"));
}
