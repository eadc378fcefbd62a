use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of the encrypted browser-session cookie.
///
/// The cookie value on the wire is an AEAD blob over this structure; a blob
/// that fails decryption or parsing means "no session present", never an
/// error surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub session_id: String,
    pub tenant_id: String,
    pub issued_at: DateTime<Utc>,
}

impl SessionCookie {
    pub fn new(session_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            tenant_id: tenant_id.into(),
            issued_at: Utc::now(),
        }
    }

    /// A cookie binds to one tenant; a mismatch is treated as absent.
    pub fn belongs_to(&self, tenant_id: &str) -> bool {
        self.tenant_id == tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_round_trips_through_json() {
        let cookie = SessionCookie::new("sess-1", "acme");
        let json = serde_json::to_string(&cookie).unwrap();
        let back: SessionCookie = serde_json::from_str(&json).unwrap();
        assert_eq!(cookie, back);
    }

    #[test]
    fn test_cookie_tenant_binding() {
        let cookie = SessionCookie::new("sess-1", "acme");
        assert!(cookie.belongs_to("acme"));
        assert!(!cookie.belongs_to("globex"));
    }
}
