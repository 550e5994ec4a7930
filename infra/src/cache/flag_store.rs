//! Redis-backed flag store
//!
//! Markers live under `<prefix>:revoked:<jti>` and `<prefix>:pending:<jti>`
//! with a native Redis TTL, so they vanish on their own.

use async_trait::async_trait;
use tracing::debug;

use tl_core::errors::DomainError;
use tl_core::repositories::FlagStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

const REVOKED_NAMESPACE: &str = "revoked";
const PENDING_NAMESPACE: &str = "pending";
const MARKER: &str = "1";

/// Flag store shared by every node pointing at the same Redis
#[derive(Clone)]
pub struct RedisFlagStore {
    client: RedisClient,
}

impl RedisFlagStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Key holding the revocation marker for `id`
    pub fn revoked_key(&self, id: &str) -> String {
        self.client
            .config()
            .make_key(&format!("{}:{}", REVOKED_NAMESPACE, id))
    }

    /// Key holding the pending-rotation marker for `id`
    pub fn pending_key(&self, id: &str) -> String {
        self.client
            .config()
            .make_key(&format!("{}:{}", PENDING_NAMESPACE, id))
    }

    /// Seconds left on the revocation marker, if any
    pub async fn revocation_ttl(&self, id: &str) -> Result<Option<i64>, DomainError> {
        Ok(self.client.ttl(&self.revoked_key(id)).await?)
    }

    /// Seconds left on the pending-rotation marker, if any
    pub async fn pending_ttl(&self, id: &str) -> Result<Option<i64>, DomainError> {
        Ok(self.client.ttl(&self.pending_key(id)).await?)
    }

    /// PING the backing Redis
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        self.client.health_check().await
    }
}

#[async_trait]
impl FlagStore for RedisFlagStore {
    async fn revoke(&self, id: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        debug!("Writing revocation marker for {} ({}s)", id, ttl_seconds);
        self.client
            .set_with_expiry(&self.revoked_key(id), MARKER, ttl_seconds.max(1))
            .await?;
        Ok(())
    }

    async fn rotate(&self, id: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        debug!("Writing pending-rotation marker for {} ({}s)", id, ttl_seconds);
        self.client
            .set_with_expiry(&self.pending_key(id), MARKER, ttl_seconds.max(1))
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.revoked_key(id)).await?)
    }

    async fn is_pending(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&self.pending_key(id)).await?)
    }

    async fn try_revoke(&self, id: &str, ttl_seconds: u64) -> Result<bool, DomainError> {
        let claim = claim_marker();
        Ok(self
            .client
            .set_if_absent_with_expiry(&self.revoked_key(id), &claim, ttl_seconds.max(1))
            .await?)
    }
}

/// Marker value unique to one `try_revoke` call
pub(crate) fn claim_marker() -> String {
    uuid::Uuid::new_v4().to_string()
}
