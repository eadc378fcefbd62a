use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged-in user within a browser session.
///
/// Invariants, enforced by the session service:
/// - at most `max_accounts_per_session` per browser session
/// - exactly zero or one account has `is_active = true`
/// - `(browser_session_id, user_id)` unique; re-authentication updates in place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSession {
    pub id: String,
    pub browser_session_id: String,
    pub user_id: String,
    pub subject_type: String,
    pub subject_properties: serde_json::Value,
    /// Client that authenticated this account
    pub client_id: String,
    /// Session-scoped opaque refresh token; distinct from OAuth refresh tokens
    pub refresh_token: String,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Input for adding (or re-authenticating) an account in a browser session.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: String,
    pub subject_type: String,
    pub subject_properties: serde_json::Value,
    pub refresh_token: String,
    pub client_id: String,
    pub ttl_seconds: i64,
}

impl AccountSession {
    pub fn from_new(browser_session_id: &str, input: NewAccount) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            browser_session_id: browser_session_id.to_string(),
            user_id: input.user_id,
            subject_type: input.subject_type,
            subject_properties: input.subject_properties,
            client_id: input.client_id,
            refresh_token: input.refresh_token,
            authenticated_at: now,
            expires_at: now + Duration::seconds(input.ttl_seconds),
            is_active: false,
        }
    }

    /// Case-insensitive email match against subject properties, used for
    /// `login_hint` resolution.
    pub fn email_matches(&self, email: &str) -> bool {
        self.subject_properties
            .get("email")
            .and_then(|v| v.as_str())
            .map(|e| e.eq_ignore_ascii_case(email))
            .unwrap_or(false)
    }
}

/// Pick the account to promote after the active one is removed: the most
/// recently authenticated of those remaining.
pub fn promotion_candidate(accounts: &[AccountSession]) -> Option<&AccountSession> {
    accounts.iter().max_by_key(|a| a.authenticated_at)
}

/// Pick the account to evict when the session is at capacity: the least
/// recently authenticated account that is not active.
pub fn eviction_candidate(accounts: &[AccountSession]) -> Option<&AccountSession> {
    accounts
        .iter()
        .filter(|a| !a.is_active)
        .min_by_key(|a| a.authenticated_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(user_id: &str, authed_secs_ago: i64, is_active: bool) -> AccountSession {
        let mut account = AccountSession::from_new(
            "bs-1",
            NewAccount {
                user_id: user_id.to_string(),
                subject_type: "user".to_string(),
                subject_properties: json!({"email": format!("{}@example.com", user_id)}),
                refresh_token: "rt".to_string(),
                client_id: "app-1".to_string(),
                ttl_seconds: 3600,
            },
        );
        account.authenticated_at = Utc::now() - Duration::seconds(authed_secs_ago);
        account.is_active = is_active;
        account
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let account = account("u1", 0, false);
        assert!(account.email_matches("U1@Example.COM"));
        assert!(!account.email_matches("other@example.com"));
    }

    #[test]
    fn test_promotion_picks_most_recent() {
        let accounts = vec![account("old", 300, false), account("new", 10, false)];
        assert_eq!(promotion_candidate(&accounts).unwrap().user_id, "new");
    }

    #[test]
    fn test_eviction_skips_active_account() {
        let accounts = vec![
            account("oldest-but-active", 500, true),
            account("old", 300, false),
            account("new", 10, false),
        ];
        assert_eq!(eviction_candidate(&accounts).unwrap().user_id, "old");
    }

    #[test]
    fn test_eviction_none_when_all_active() {
        let accounts = vec![account("only", 10, true)];
        assert!(eviction_candidate(&accounts).is_none());
    }
}
