//! Port for ordered key-value storage.
//!
//! The KV store is the authoritative read store for the hot path: sessions,
//! authorization codes, refresh-token families, the revocation deny list,
//! and the RBAC permission cache all live here. Admin enumeration goes to
//! the SQL mirror instead.
//!
//! Adapters must provide ordered iteration: `scan` returns entries in
//! ascending key order, which prefix layouts rely on.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::error::StorageError;

/// Contract for ordered key-value storage with per-key TTL.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch a value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Store a value, replacing any previous one. `ttl = None` means no expiry.
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>;

    /// Remove a key, returning the previous value if one was live.
    ///
    /// The return value is load-bearing: authorization-code redemption
    /// relies on "first remove wins" to stay single-use under races.
    async fn remove(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// All live entries whose key starts with `prefix`, in ascending key order.
    async fn scan(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, serde_json::Value)>, StorageError>;

    /// Reap expired entries; returns how many were dropped. Driven by the
    /// maintenance sweep, not by request paths.
    async fn purge_expired(&self) -> Result<usize, StorageError>;
}

/// Join key segments with the `:` separator used across the KV layout.
pub fn storage_key(segments: &[&str]) -> String {
    segments.join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        assert_eq!(
            storage_key(&["session", "browser", "acme", "sess-1"]),
            "session:browser:acme:sess-1"
        );
        assert_eq!(storage_key(&["oauth", "code", "abc"]), "oauth:code:abc");
    }
}
