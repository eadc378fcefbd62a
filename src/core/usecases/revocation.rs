//! Use case: token revocation.
//!
//! Access tokens go on a short-TTL deny list (the JWT `exp` remains
//! authoritative; the list is a best-effort belt and fails open on storage
//! trouble). Refresh tokens are removed outright; family-wide invalidation
//! clears everything under the subject's refresh prefix.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::core::error::{CoreError, StorageError};
use crate::core::token::{RevokedAccessToken, REVOCATION_TTL_SECONDS};
use crate::core::usecases::ports::{storage_key, Clock, Storage};

pub struct RevocationService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    revocation_ttl: Duration,
}

impl RevocationService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            revocation_ttl: Duration::from_secs(REVOCATION_TTL_SECONDS),
        }
    }

    pub fn with_revocation_ttl(mut self, ttl: Duration) -> Self {
        self.revocation_ttl = ttl;
        self
    }

    fn denylist_key(token_id: &str) -> String {
        storage_key(&["oauth", "revoked", "access", token_id])
    }

    fn refresh_key(subject: &str, token_id: &str) -> String {
        storage_key(&["oauth", "refresh", subject, token_id])
    }

    fn refresh_prefix(subject: &str) -> String {
        format!("oauth:refresh:{}:", subject)
    }

    /// Deny-list an access token until its JWT naturally expires.
    pub async fn revoke_access_token(&self, token_id: &str) -> Result<(), CoreError> {
        let entry = RevokedAccessToken {
            revoked_at: self.clock.now(),
        };
        let value = serde_json::to_value(&entry)
            .map_err(|e| StorageError::serialization(format!("encode revocation failed: {}", e)))?;
        self.storage
            .set(&Self::denylist_key(token_id), value, Some(self.revocation_ttl))
            .await?;
        Ok(())
    }

    /// Deny-list check. Fails open: a storage error reads as "not revoked"
    /// because verifiers rely primarily on JWT `exp`.
    pub async fn is_access_token_revoked(&self, token_id: &str) -> bool {
        match self.storage.get(&Self::denylist_key(token_id)).await {
            Ok(hit) => hit.is_some(),
            Err(e) => {
                warn!(token_id, error = %e, "deny-list read failed; failing open");
                false
            }
        }
    }

    /// Remove one refresh token.
    pub async fn revoke_refresh_token(
        &self,
        subject: &str,
        token_id: &str,
    ) -> Result<bool, CoreError> {
        let removed = self
            .storage
            .remove(&Self::refresh_key(subject, token_id))
            .await?;
        Ok(removed.is_some())
    }

    /// Family-wide invalidation: remove every refresh token of a subject.
    /// Returns how many were removed.
    pub async fn revoke_all_refresh_tokens(&self, subject: &str) -> Result<usize, CoreError> {
        let hits = self.storage.scan(&Self::refresh_prefix(subject)).await?;
        let mut removed = 0;
        for (key, _) in hits {
            if self.storage.remove(&key).await?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Sweep deny-list entries older than the revocation TTL.
    pub async fn clean_expired_revocations(&self) -> Result<usize, CoreError> {
        let now = self.clock.now();
        let hits = self.storage.scan("oauth:revoked:access:").await?;
        let mut removed = 0;
        for (key, value) in hits {
            let stale = serde_json::from_value::<RevokedAccessToken>(value)
                .map(|entry| entry.is_stale(now, self.revocation_ttl.as_secs()))
                .unwrap_or(true);
            if stale && self.storage.remove(&key).await?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::core::usecases::ports::SystemClock;

    fn service() -> RevocationService {
        RevocationService::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_deny_list_round_trip() {
        let service = service();
        assert!(!service.is_access_token_revoked("tok-1").await);
        service.revoke_access_token("tok-1").await.unwrap();
        assert!(service.is_access_token_revoked("tok-1").await);
    }

    #[tokio::test]
    async fn test_family_revocation_clears_subject_prefix() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let service = RevocationService::new(storage.clone(), Arc::new(SystemClock));

        for token_id in ["t1", "t2", "t3"] {
            storage
                .set(
                    &format!("oauth:refresh:u1:{}", token_id),
                    serde_json::json!({}),
                    None,
                )
                .await
                .unwrap();
        }
        storage
            .set("oauth:refresh:u2:t9", serde_json::json!({}), None)
            .await
            .unwrap();

        assert_eq!(service.revoke_all_refresh_tokens("u1").await.unwrap(), 3);
        assert!(storage.scan("oauth:refresh:u1:").await.unwrap().is_empty());
        // Another subject's family is untouched.
        assert_eq!(storage.scan("oauth:refresh:u2:").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_refresh_revocation() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let service = RevocationService::new(storage.clone(), Arc::new(SystemClock));
        storage
            .set("oauth:refresh:u1:t1", serde_json::json!({}), None)
            .await
            .unwrap();

        assert!(service.revoke_refresh_token("u1", "t1").await.unwrap());
        assert!(!service.revoke_refresh_token("u1", "t1").await.unwrap());
    }
}
