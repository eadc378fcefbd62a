use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default deny-list entry lifetime; only needs to outlive the JWT itself.
pub const REVOCATION_TTL_SECONDS: u64 = 15 * 60;

/// Deny-list entry behind `oauth:revoked:access:<tokenId>`.
///
/// The deny list is a best-effort belt on top of JWT `exp`: verifiers fail
/// open when the list is unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedAccessToken {
    pub revoked_at: DateTime<Utc>,
}

impl RevokedAccessToken {
    pub fn now() -> Self {
        Self {
            revoked_at: Utc::now(),
        }
    }

    /// Entries older than the revocation TTL are sweep candidates.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl_seconds: u64) -> bool {
        (now - self.revoked_at).num_seconds() >= ttl_seconds as i64
    }
}
