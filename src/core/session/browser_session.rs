use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cookie-anchored container of up to N logged-in accounts for one browser.
///
/// Invariant: `active_user_id` is either `None` or names the user of exactly
/// one account session within this browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSession {
    pub id: String,
    pub tenant_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Absolute expiry; sliding refresh never extends past this bound
    pub expires_at: DateTime<Utc>,
    pub user_agent: String,
    pub ip_address: String,
    pub active_user_id: Option<String>,
    /// Bumped on every mutation; last-writer-wins on the KV
    pub version: u64,
}

impl BrowserSession {
    /// Create a fresh session with a 128-bit random id and an absolute TTL.
    pub fn new(
        tenant_id: impl Into<String>,
        user_agent: impl Into<String>,
        ip_address: impl Into<String>,
        lifetime_seconds: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            created_at: now,
            last_activity: now,
            expires_at: now + Duration::seconds(lifetime_seconds),
            user_agent: user_agent.into(),
            ip_address: ip_address.into(),
            active_user_id: None,
            version: 1,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Sliding-window refresh: update `last_activity` and extend the expiry,
    /// capped at the absolute bound set at creation.
    pub fn touch(&mut self, now: DateTime<Utc>, window_seconds: i64, absolute_bound: DateTime<Utc>) {
        self.last_activity = now;
        let extended = now + Duration::seconds(window_seconds);
        self.expires_at = extended.min(absolute_bound);
        self.version += 1;
    }

    /// Remaining TTL in whole seconds, zero once expired.
    pub fn ttl_seconds(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_random_id_and_no_active_user() {
        let a = BrowserSession::new("acme", "UA", "10.0.0.1", 3600);
        let b = BrowserSession::new("acme", "UA", "10.0.0.1", 3600);
        assert_ne!(a.id, b.id);
        assert!(a.active_user_id.is_none());
        assert_eq!(a.version, 1);
    }

    #[test]
    fn test_touch_respects_absolute_bound() {
        let mut session = BrowserSession::new("acme", "UA", "10.0.0.1", 60);
        let absolute = session.expires_at;
        let now = Utc::now();
        session.touch(now, 86_400, absolute);
        assert_eq!(session.expires_at, absolute);
        assert_eq!(session.version, 2);
    }

    #[test]
    fn test_touch_extends_within_bound() {
        let mut session = BrowserSession::new("acme", "UA", "10.0.0.1", 86_400 * 7);
        let absolute = session.expires_at;
        let now = Utc::now();
        session.touch(now, 3600, absolute);
        assert!(session.expires_at < absolute);
        assert_eq!(session.ttl_seconds(now), 3600);
    }
}
