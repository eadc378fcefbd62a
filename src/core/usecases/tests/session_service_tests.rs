//! Browser-session state machine: account cap, single-active invariant,
//! in-place re-authentication, promotion on removal.

use serde_json::json;

use crate::core::error::{CoreError, SessionError};
use crate::core::session::NewAccount;
use crate::core::usecases::testing::{fixture, TEST_TENANT};

fn new_account(user_id: &str) -> NewAccount {
    NewAccount {
        user_id: user_id.to_string(),
        subject_type: "user".to_string(),
        subject_properties: json!({"email": format!("{}@example.com", user_id)}),
        refresh_token: format!("rt-{}", user_id),
        client_id: "app-1".to_string(),
        ttl_seconds: 3600,
    }
}

#[tokio::test]
async fn test_add_account_makes_it_active() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();

    let (account, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();
    assert!(account.is_active);
    assert_eq!(session.active_user_id.as_deref(), Some("u1"));

    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u2"))
        .await
        .unwrap();
    assert_eq!(session.active_user_id.as_deref(), Some("u2"));

    // Exactly one account is active.
    let accounts = f.sessions.list_accounts(&session.id).await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts.iter().filter(|a| a.is_active).count(), 1);
    assert!(accounts.iter().find(|a| a.user_id == "u2").unwrap().is_active);
}

#[tokio::test]
async fn test_reauthentication_updates_in_place() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();

    let (first, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u2"))
        .await
        .unwrap();

    let mut again = new_account("u1");
    again.subject_properties = json!({"email": "u1@example.com", "name": "Updated"});
    let (updated, session) = f
        .sessions
        .add_account_to_session(&session, again)
        .await
        .unwrap();

    // Same row, refreshed contents, count unchanged.
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.subject_properties["name"], "Updated");
    assert_eq!(f.sessions.list_accounts(&session.id).await.unwrap().len(), 2);
    assert_eq!(session.active_user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_cap_evicts_least_recently_authenticated_inactive() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();

    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u2"))
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u3"))
        .await
        .unwrap();

    // Fourth distinct account: u1 (oldest, not active) is evicted.
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u4"))
        .await
        .unwrap();

    let accounts = f.sessions.list_accounts(&session.id).await.unwrap();
    let users: Vec<&str> = accounts.iter().map(|a| a.user_id.as_str()).collect();
    assert_eq!(accounts.len(), 3);
    assert!(!users.contains(&"u1"));
    assert!(users.contains(&"u4"));
}

#[tokio::test]
async fn test_switch_to_unknown_user_fails() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();

    let err = f
        .sessions
        .switch_active_account(&session, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::AccountNotFound { .. })
    ));
}

#[tokio::test]
async fn test_remove_active_promotes_most_recent() {
    // Scenario: add u1 then u2 (active = u2), switch to u1, remove u1.
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u2"))
        .await
        .unwrap();

    let session = f
        .sessions
        .switch_active_account(&session, "u1")
        .await
        .unwrap();
    assert_eq!(session.active_user_id.as_deref(), Some("u1"));

    let session = f.sessions.remove_account(&session, "u1").await.unwrap();
    assert_eq!(session.active_user_id.as_deref(), Some("u2"));

    let accounts = f.sessions.list_accounts(&session.id).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].is_active);
}

#[tokio::test]
async fn test_removing_last_account_clears_active_pointer() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();

    let session = f.sessions.remove_account(&session, "u1").await.unwrap();
    assert!(session.active_user_id.is_none());
    assert!(f.sessions.list_accounts(&session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_destroy_clears_kv_and_mirror() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();

    f.sessions
        .destroy_browser_session(&session.id, TEST_TENANT)
        .await
        .unwrap();

    assert!(f
        .sessions
        .get_browser_session(&session.id, TEST_TENANT)
        .await
        .unwrap()
        .is_none());
    assert!(f.mirror.browsers.lock().unwrap().is_empty());
    assert!(f.mirror.accounts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dual_write_mirrors_sessions() {
    let f = fixture();
    let session = f
        .sessions
        .create_browser_session(TEST_TENANT, "UA", "10.0.0.1")
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(&session, new_account("u1"))
        .await
        .unwrap();

    let mirrored = f.mirror.browsers.lock().unwrap().get(&session.id).cloned();
    assert_eq!(
        mirrored.unwrap().active_user_id.as_deref(),
        Some("u1")
    );
    assert!(f
        .mirror
        .accounts
        .lock()
        .unwrap()
        .contains_key(&(session.id.clone(), "u1".to_string())));
}
