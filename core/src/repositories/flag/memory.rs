//! In-process flag store for tests and single-node development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::DomainError;

use super::r#trait::FlagStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlagKind {
    Revoked,
    Pending,
}

/// Flag store backed by a `HashMap` of deadlines
///
/// Deadlines use `tokio::time::Instant`, so a paused test runtime can
/// advance past a marker's TTL without sleeping. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryFlagStore {
    flags: Arc<RwLock<HashMap<(FlagKind, String), Instant>>>,
    writes: Arc<AtomicU64>,
}

impl InMemoryFlagStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of marker writes performed so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Time left on the revocation marker for `id`
    pub async fn revocation_ttl(&self, id: &str) -> Option<Duration> {
        self.remaining(FlagKind::Revoked, id).await
    }

    /// Time left on the pending-rotation marker for `id`
    pub async fn pending_ttl(&self, id: &str) -> Option<Duration> {
        self.remaining(FlagKind::Pending, id).await
    }

    /// Drop expired markers, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut flags = self.flags.write().await;
        let before = flags.len();
        flags.retain(|_, deadline| *deadline > now);
        before - flags.len()
    }

    async fn set(&self, kind: FlagKind, id: &str, ttl_seconds: u64) {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        self.flags.write().await.insert((kind, id.to_string()), deadline);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    async fn is_set(&self, kind: FlagKind, id: &str) -> bool {
        self.remaining(kind, id).await.is_some()
    }

    async fn remaining(&self, kind: FlagKind, id: &str) -> Option<Duration> {
        let now = Instant::now();
        let flags = self.flags.read().await;
        flags
            .get(&(kind, id.to_string()))
            .filter(|deadline| **deadline > now)
            .map(|deadline| *deadline - now)
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn revoke(&self, id: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        self.set(FlagKind::Revoked, id, ttl_seconds).await;
        Ok(())
    }

    async fn rotate(&self, id: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        self.set(FlagKind::Pending, id, ttl_seconds).await;
        Ok(())
    }

    async fn is_revoked(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.is_set(FlagKind::Revoked, id).await)
    }

    async fn is_pending(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.is_set(FlagKind::Pending, id).await)
    }

    async fn try_revoke(&self, id: &str, ttl_seconds: u64) -> Result<bool, DomainError> {
        let now = Instant::now();
        let key = (FlagKind::Revoked, id.to_string());
        let mut flags = self.flags.write().await;

        if flags.get(&key).is_some_and(|deadline| *deadline > now) {
            return Ok(false);
        }
        flags.insert(key, now + Duration::from_secs(ttl_seconds));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}
