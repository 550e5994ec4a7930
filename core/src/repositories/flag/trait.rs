//! Flag store trait: TTL-bounded revocation and pending-rotation markers.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Key-value store holding per-token markers with a time-to-live
///
/// Keys are opaque token identifiers (`jti` values). Implementations must
/// provide atomic per-key writes and read-your-writes on the same key; no
/// cross-key transaction is required.
///
/// Every call may be a network round-trip. Errors propagate to the caller,
/// since a revocation check that cannot be answered must not pass.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Mark `id` as revoked for `ttl_seconds`
    ///
    /// Idempotent: revoking an already-revoked id refreshes the marker.
    ///
    /// # Example
    /// ```no_run
    /// # use tl_core::repositories::FlagStore;
    /// # async fn example(store: &impl FlagStore) -> Result<(), Box<dyn std::error::Error>> {
    /// store.revoke("0b7e6a1c-6c1f-4bd4-9f8a-1f0a7b2f1c11", 3600).await?;
    /// assert!(store.is_revoked("0b7e6a1c-6c1f-4bd4-9f8a-1f0a7b2f1c11").await?);
    /// # Ok(())
    /// # }
    /// ```
    async fn revoke(&self, id: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Mark `id` as due for rotation for `ttl_seconds`
    async fn rotate(&self, id: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Whether a live revocation marker exists for `id`
    async fn is_revoked(&self, id: &str) -> Result<bool, DomainError>;

    /// Whether a live pending-rotation marker exists for `id`
    async fn is_pending(&self, id: &str) -> Result<bool, DomainError>;

    /// Revoke `id` only if it is not revoked yet
    ///
    /// Returns `true` when this call placed the marker. Stores with an
    /// atomic set-if-absent should override this; the default is a
    /// check-then-write and therefore racy.
    async fn try_revoke(&self, id: &str, ttl_seconds: u64) -> Result<bool, DomainError> {
        if self.is_revoked(id).await? {
            return Ok(false);
        }
        self.revoke(id, ttl_seconds).await?;
        Ok(true)
    }
}
