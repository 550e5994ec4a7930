//! Tests for the token lifecycle service

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use super::{test_config, TEST_SECRET};
use crate::domain::entities::ClaimSet;
use crate::errors::DomainError;
use crate::repositories::{FlagStore, InMemoryFlagStore};
use crate::services::token::{
    FindOptions, Rotation, RotationRefusal, TokenService, TokenServiceConfig, COOKIE_SECRET_BYTES,
};

fn service_with(config: TokenServiceConfig) -> (TokenService<InMemoryFlagStore>, InMemoryFlagStore) {
    let store = InMemoryFlagStore::new();
    let service = TokenService::new(store.clone(), config).unwrap();
    (service, store)
}

fn service() -> (TokenService<InMemoryFlagStore>, InMemoryFlagStore) {
    service_with(test_config())
}

fn cookie_locked() -> (TokenService<InMemoryFlagStore>, InMemoryFlagStore) {
    let mut config = test_config();
    config.cookie_lock = true;
    service_with(config)
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = test_config();
    config.expiry_seconds = -5;

    let result = TokenService::new(InMemoryFlagStore::new(), config);

    assert!(matches!(result, Err(DomainError::Config { .. })));
}

#[tokio::test]
async fn test_sample_scenario() {
    let (service, _) = service();
    let exp = Utc::now().timestamp() + 3600;

    let token = service.create(ClaimSet::new().with("role", "admin").with("exp", exp));
    assert!(service.is_valid(&token).await.unwrap());
    assert!(!service.is_revoked(&token).await.unwrap());

    assert!(service.revoke(&token).await.unwrap());

    assert!(service.is_revoked(&token).await.unwrap());
    assert!(!service.is_valid(&token).await.unwrap());
    assert!(service.is_invalid(&token).await.unwrap());
}

#[tokio::test]
async fn test_create_does_not_touch_store() {
    let (service, store) = service();

    let token = service.create(ClaimSet::new());

    assert_eq!(store.write_count(), 0);
    assert_eq!(token.secret(), TEST_SECRET);
    assert!(token.cookie_secret().is_none());
}

#[tokio::test]
async fn test_cookie_lock_generates_secret() {
    let (service, _) = cookie_locked();

    let first = service.create(ClaimSet::new());
    let second = service.create(ClaimSet::new());

    let cookie_secret = first.cookie_secret().unwrap();
    assert_eq!(cookie_secret.len(), COOKIE_SECRET_BYTES * 2);
    assert!(cookie_secret.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first.cookie_secret(), second.cookie_secret());
}

#[tokio::test]
async fn test_find_round_trip() {
    let (service, _) = service();
    let token = service.create(ClaimSet::new().with("sub", "user-42"));
    let encoded = service.encode(&token).unwrap();

    let found = service.find(&encoded, FindOptions::new()).await.unwrap().unwrap();

    assert_eq!(found.jti(), token.jti());
    assert_eq!(found.claims(), token.claims());
    assert_eq!(found.secret(), TEST_SECRET);
}

#[tokio::test]
async fn test_find_returns_none_for_bad_tokens() {
    let (service, store) = service();

    assert!(service.find("garbage", FindOptions::new()).await.unwrap().is_none());

    let expired = service.create(ClaimSet::new().with("exp", Utc::now().timestamp() - 1));
    let encoded = service.encode(&expired).unwrap();
    assert!(service.find(&encoded, FindOptions::new()).await.unwrap().is_none());

    let token = service.create(ClaimSet::new());
    let encoded = service.encode(&token).unwrap();
    let wrong_secret = FindOptions::new().with_secret("not-the-secret");
    assert!(service.find(&encoded, wrong_secret).await.unwrap().is_none());

    let wrong_issuer = FindOptions::new().with_issuer("elsewhere");
    assert!(service.find(&encoded, wrong_issuer).await.unwrap().is_none());

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_find_rejects_revoked_token() {
    let (service, _) = service();
    let token = service.create(ClaimSet::new());
    let encoded = service.encode(&token).unwrap();

    service.revoke_id(token.jti()).await.unwrap();

    assert!(service.find(&encoded, FindOptions::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_rejects_token_without_jti() {
    let (service, _) = service();
    let mut token = service.create(ClaimSet::new());
    token.claims_mut().remove("jti");
    let encoded = service.encode(&token).unwrap();

    assert!(service.find(&encoded, FindOptions::new()).await.unwrap().is_none());
    assert!(!service.is_valid(&token).await.unwrap());
}

#[tokio::test]
async fn test_find_with_cookie_secret() {
    let (service, _) = cookie_locked();
    let token = service.create(ClaimSet::new());
    let encoded = service.encode(&token).unwrap();
    let cookie_secret = token.cookie_secret().unwrap().to_string();

    // stolen token string alone is useless
    assert!(service.find(&encoded, FindOptions::new()).await.unwrap().is_none());

    let found = service
        .find(&encoded, FindOptions::new().with_cookie_secret(cookie_secret.clone()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.cookie_secret(), Some(cookie_secret.as_str()));
    assert!(service.is_valid(&found).await.unwrap());
}

#[tokio::test]
async fn test_expiry_boundary() {
    let (service, _) = service();
    let now = Utc::now().timestamp();

    let expired = service.create(ClaimSet::new().with("exp", now - 1));
    let long_lived = service.create(ClaimSet::new().with("exp", now + 100_000_000));

    assert!(!service.is_valid(&expired).await.unwrap());
    assert!(service.is_valid(&long_lived).await.unwrap());
}

#[tokio::test]
async fn test_claim_edits_are_reverified() {
    let (service, _) = service();
    let mut token = service.create(ClaimSet::new());
    assert!(service.is_valid(&token).await.unwrap());

    token.claims_mut().insert("iss", "forged-issuer");
    assert!(!service.is_valid(&token).await.unwrap());

    token.claims_mut().insert("iss", "tokenlock-test");
    token.claims_mut().insert("exp", "soon");
    assert!(!service.is_valid(&token).await.unwrap());
}

#[tokio::test]
async fn test_configuration_drift_invalidates() {
    let store = InMemoryFlagStore::new();
    let issuing = TokenService::new(store.clone(), test_config()).unwrap();
    let token = issuing.create(ClaimSet::new());

    let mut moved = test_config();
    moved.issuer = "new-issuer".to_string();
    let reconfigured = TokenService::new(store.clone(), moved).unwrap();
    assert!(!reconfigured.is_valid(&token).await.unwrap());

    let mut narrowed = test_config();
    narrowed.audience = Some("mobile".to_string());
    let reconfigured = TokenService::new(store, narrowed).unwrap();
    assert!(!reconfigured.is_valid(&token).await.unwrap());

    assert!(issuing.is_valid(&token).await.unwrap());
}

#[tokio::test]
async fn test_revoke_of_invalid_token_is_noop() {
    let (service, store) = service();
    let expired = service.create(ClaimSet::new().with("exp", Utc::now().timestamp() - 10));

    assert!(!service.revoke(&expired).await.unwrap());
    assert_eq!(store.write_count(), 0);

    let token = service.create(ClaimSet::new());
    assert!(service.revoke(&token).await.unwrap());
    assert!(!service.revoke(&token).await.unwrap());
    assert_eq!(store.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_revocation_self_expires() {
    let (service, store) = service();
    let token = service.create(ClaimSet::new().with("exp", Utc::now().timestamp() + 5));

    assert!(service.revoke(&token).await.unwrap());
    let ttl = store.revocation_ttl(token.jti()).await.unwrap();
    assert!(ttl <= Duration::from_secs(5));
    assert!(ttl >= Duration::from_secs(4));

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(!service.is_revoked(&token).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_class_level_markers_use_configured_expiry() {
    let (service, store) = service();

    service.revoke_id("admin-revoked").await.unwrap();
    service.mark_pending_rotation("due-for-rotation").await.unwrap();

    assert_eq!(
        store.revocation_ttl("admin-revoked").await,
        Some(Duration::from_secs(3600))
    );
    assert_eq!(
        store.pending_ttl("due-for-rotation").await,
        Some(Duration::from_secs(3600))
    );
}

#[tokio::test]
async fn test_pending_rotation_is_advisory() {
    let (service, _) = service();
    let token = service.create(ClaimSet::new());

    assert!(!service.is_pending(&token).await.unwrap());
    service.mark_pending_rotation(token.jti()).await.unwrap();

    assert!(service.is_pending(&token).await.unwrap());
    assert!(service.is_valid(&token).await.unwrap());
    assert!(!service.is_revoked(&token).await.unwrap());
}

#[tokio::test]
async fn test_rotate_replaces_token_in_place() {
    let (service, _) = cookie_locked();
    let mut token = service.create(
        ClaimSet::new()
            .with("role", "admin")
            .with("tenant", json!({"id": 7}))
            .with("aud", "legacy"),
    );
    let old_jti = token.jti().to_string();
    let old_cookie = token.cookie_secret().map(str::to_string);
    let stale = token.clone();

    let outcome = service.rotate(&mut token, None).await.unwrap();

    assert_eq!(outcome, Rotation::Rotated { previous_jti: old_jti.clone() });
    assert_ne!(token.jti(), old_jti);
    assert_ne!(token.cookie_secret().map(str::to_string), old_cookie);
    assert_eq!(token.claims().get("role"), Some(&json!("admin")));
    assert_eq!(token.claims().get("tenant"), Some(&json!({"id": 7})));
    assert!(!token.claims().contains("aud"));
    assert_eq!(token.secret(), TEST_SECRET);

    assert!(service.is_valid(&token).await.unwrap());
    assert!(service.is_revoked(&stale).await.unwrap());
    assert!(!service.is_valid(&stale).await.unwrap());
}

#[tokio::test]
async fn test_rotate_with_explicit_claims() {
    let (service, _) = service();
    let mut token = service.create(ClaimSet::new().with("role", "admin"));

    let outcome = service
        .rotate(&mut token, Some(ClaimSet::new().with("role", "viewer")))
        .await
        .unwrap();

    assert!(outcome.is_rotated());
    assert_eq!(token.claims().get("role"), Some(&json!("viewer")));
    assert_eq!(token.claims().iss(), Some("tokenlock-test"));
}

#[tokio::test]
async fn test_rotate_carries_version_tag() {
    let mut old_config = test_config();
    old_config.version = Some("1".to_string());
    let mut new_config = test_config();
    new_config.version = Some("2".to_string());

    let store = InMemoryFlagStore::new();
    let old = TokenService::new(store.clone(), old_config).unwrap();
    let new = TokenService::new(store, new_config).unwrap();

    let mut token = old.create(ClaimSet::new());
    assert!(new.is_version_mismatch(&token));

    new.rotate(&mut token, None).await.unwrap();
    assert_eq!(token.claims().ver(), Some(&json!("1")));
    assert!(new.is_version_mismatch(&token));
}

#[tokio::test]
async fn test_rotate_refuses_foreign_issuer() {
    let (service, store) = service();
    let mut token = service.create(ClaimSet::new().with("iss", "other-domain"));
    let before = token.clone();

    let outcome = service.rotate(&mut token, None).await.unwrap();

    assert_eq!(outcome, Rotation::Refused(RotationRefusal::IssuerMismatch));
    assert_eq!(token, before);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_rotate_refuses_revoked_token() {
    let (service, store) = service();
    let mut token = service.create(ClaimSet::new());
    service.revoke_id(token.jti()).await.unwrap();
    let before = token.clone();

    let outcome = service.rotate(&mut token, None).await.unwrap();

    assert_eq!(outcome, Rotation::Refused(RotationRefusal::AlreadyRevoked));
    assert_eq!(token, before);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_rotate_expired_token_skips_store() {
    let (service, store) = service();
    let mut token = service.create(
        ClaimSet::new()
            .with("exp", Utc::now().timestamp() - 30)
            .with("role", "admin"),
    );
    let old_jti = token.jti().to_string();

    let outcome = service.rotate(&mut token, None).await.unwrap();

    assert!(outcome.is_rotated());
    assert_ne!(token.jti(), old_jti);
    assert_eq!(token.claims().get("role"), Some(&json!("admin")));
    assert!(service.is_valid(&token).await.unwrap());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_rotate_without_jti_skips_store() {
    let (service, store) = service();
    let mut first = service.create(ClaimSet::new().with("role", "admin"));
    first.claims_mut().remove("jti");
    let mut second = service.create(ClaimSet::new().with("role", "viewer"));
    second.claims_mut().remove("jti");

    let outcome = service.rotate(&mut first, None).await.unwrap();
    assert!(outcome.is_rotated());
    assert!(!store.is_revoked("").await.unwrap());

    let outcome = service.rotate(&mut second, None).await.unwrap();
    assert!(outcome.is_rotated());

    assert_eq!(store.write_count(), 0);
    assert!(service.is_valid(&first).await.unwrap());
    assert!(service.is_valid(&second).await.unwrap());
    assert_ne!(first.jti(), second.jti());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotation_has_one_winner() {
    let (service, _) = service();
    let service = Arc::new(service);
    let original = service.create(ClaimSet::new().with("role", "admin"));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&service);
        let mut copy = original.clone();
        handles.push(tokio::spawn(async move {
            let outcome = service.rotate(&mut copy, None).await.unwrap();
            (outcome, copy)
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        let (outcome, token) = handle.await.unwrap();
        match outcome {
            Rotation::Rotated { .. } => winners.push(token),
            Rotation::Refused(reason) => {
                assert_eq!(reason, RotationRefusal::AlreadyRevoked);
                assert_eq!(token, original);
            }
        }
    }

    assert_eq!(winners.len(), 1);
    assert!(service.is_valid(&winners[0]).await.unwrap());
    assert!(service.is_revoked(&original).await.unwrap());
}

#[tokio::test]
async fn test_version_mismatch() {
    let mut config = test_config();
    config.version = Some("2".to_string());
    let (service, _) = service_with(config);

    let current = service.create(ClaimSet::new());
    assert!(!service.is_version_mismatch(&current));

    let older = service.create(ClaimSet::new().with("ver", "1"));
    assert!(service.is_version_mismatch(&older));
    assert!(service.is_valid(&older).await.unwrap());
    assert!(!service.is_revoked(&older).await.unwrap());

    let numeric = service.create(ClaimSet::new().with("ver", 2));
    assert!(!service.is_version_mismatch(&numeric));

    let unversioned = service.create(ClaimSet::new().with("ver", serde_json::Value::Null));
    assert!(service.is_version_mismatch(&unversioned));
}

#[tokio::test]
async fn test_version_mismatch_without_configured_version() {
    let (service, _) = service();

    assert!(!service.is_version_mismatch(&service.create(ClaimSet::new())));
    assert!(service.is_version_mismatch(&service.create(ClaimSet::new().with("ver", "1"))));
}

#[tokio::test]
async fn test_to_cookie() {
    let (locked, _) = cookie_locked();
    let token = locked.create(ClaimSet::new());

    let cookie = locked.to_cookie(&token).unwrap();

    assert_eq!(cookie.value, token.cookie_secret().unwrap());
    assert_eq!(Some(cookie.expires), token.claims().expires_at());
    assert_eq!(cookie.name, "tokenlock_secret");
    assert!(cookie.http_only);

    let (plain, _) = service();
    assert!(plain.to_cookie(&plain.create(ClaimSet::new())).is_none());
}

struct UnavailableStore;

#[async_trait::async_trait]
impl FlagStore for UnavailableStore {
    async fn revoke(&self, _id: &str, _ttl_seconds: u64) -> Result<(), DomainError> {
        Err(DomainError::Store { message: "connection refused".to_string() })
    }

    async fn rotate(&self, _id: &str, _ttl_seconds: u64) -> Result<(), DomainError> {
        Err(DomainError::Store { message: "connection refused".to_string() })
    }

    async fn is_revoked(&self, _id: &str) -> Result<bool, DomainError> {
        Err(DomainError::Store { message: "connection refused".to_string() })
    }

    async fn is_pending(&self, _id: &str) -> Result<bool, DomainError> {
        Err(DomainError::Store { message: "connection refused".to_string() })
    }
}

#[tokio::test]
async fn test_store_failures_propagate() {
    let service = TokenService::new(UnavailableStore, test_config()).unwrap();
    let token = service.create(ClaimSet::new());
    let encoded = service.encode(&token).unwrap();

    assert!(matches!(
        service.find(&encoded, FindOptions::new()).await,
        Err(DomainError::Store { .. })
    ));
    assert!(service.is_valid(&token).await.is_err());
    assert!(service.revoke_id(token.jti()).await.is_err());

    // a token that fails verification never reaches the store
    assert!(service.find("garbage", FindOptions::new()).await.unwrap().is_none());
}
