//! Admin session service: tenant-scoped enumeration, revocation with KV
//! clearing, stats.

use serde_json::json;

use crate::core::error::{CoreError, SessionError};
use crate::core::session::NewAccount;
use crate::core::usecases::testing::{fixture, Fixture, TEST_TENANT};
use crate::core::usecases::AdminSessionService;

fn admin(f: &Fixture) -> AdminSessionService {
    AdminSessionService::new(f.mirror.clone(), f.storage.clone())
}

async fn seed_session(f: &Fixture, tenant: &str, user: &str) -> String {
    let session = f
        .sessions
        .create_browser_session(tenant, "UA", "10.0.0.1")
        .await
        .unwrap();
    let (_, session) = f
        .sessions
        .add_account_to_session(
            &session,
            NewAccount {
                user_id: user.to_string(),
                subject_type: "user".to_string(),
                subject_properties: json!({}),
                refresh_token: "rt".to_string(),
                client_id: "app-1".to_string(),
                ttl_seconds: 3600,
            },
        )
        .await
        .unwrap();
    session.id
}

#[tokio::test]
async fn test_list_user_sessions_is_tenant_scoped() {
    let f = fixture();
    let admin = admin(&f);
    seed_session(&f, TEST_TENANT, "u1").await;
    seed_session(&f, "globex", "u1").await;

    let rows = admin
        .list_user_sessions("u1", TEST_TENANT, 50, 0)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|r| r.browser.tenant_id == TEST_TENANT));
}

#[tokio::test]
async fn test_revoke_session_clears_kv_and_mirror() {
    let f = fixture();
    let admin = admin(&f);
    let session_id = seed_session(&f, TEST_TENANT, "u1").await;

    let accounts_revoked = admin.revoke_session(&session_id, TEST_TENANT).await.unwrap();
    assert_eq!(accounts_revoked, 1);

    // Hot path no longer sees the session.
    assert!(f
        .sessions
        .get_browser_session(&session_id, TEST_TENANT)
        .await
        .unwrap()
        .is_none());
    assert!(f.sessions.list_accounts(&session_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_revoke_unknown_session_is_not_found() {
    let f = fixture();
    let admin = admin(&f);
    let err = admin.revoke_session("ghost", TEST_TENANT).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::SessionNotFound { .. })
    ));
}

#[tokio::test]
async fn test_revoke_session_enforces_tenant() {
    let f = fixture();
    let admin = admin(&f);
    let session_id = seed_session(&f, "globex", "u1").await;

    // Acme admin cannot revoke a globex session; the globex KV record is
    // keyed under its own tenant and the mirror refuses the mismatch.
    let result = admin.revoke_session(&session_id, TEST_TENANT).await;
    assert!(result.is_err());
    assert!(f
        .sessions
        .get_browser_session(&session_id, "globex")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_revoke_all_user_sessions() {
    let f = fixture();
    let admin = admin(&f);
    let first = seed_session(&f, TEST_TENANT, "u1").await;
    let second = seed_session(&f, TEST_TENANT, "u1").await;
    seed_session(&f, TEST_TENANT, "u2").await;

    let revoked = admin
        .revoke_all_user_sessions("u1", TEST_TENANT)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    for session_id in [first, second] {
        assert!(f
            .sessions
            .get_browser_session(&session_id, TEST_TENANT)
            .await
            .unwrap()
            .is_none());
    }
    // u2 is untouched.
    assert_eq!(
        admin.session_stats(Some(TEST_TENANT)).await.unwrap().unique_users,
        1
    );
}

#[tokio::test]
async fn test_session_stats_scoping() {
    let f = fixture();
    let admin = admin(&f);
    seed_session(&f, TEST_TENANT, "u1").await;
    seed_session(&f, TEST_TENANT, "u2").await;
    seed_session(&f, "globex", "u3").await;

    let acme = admin.session_stats(Some(TEST_TENANT)).await.unwrap();
    assert_eq!(acme.total_browser_sessions, 2);
    assert_eq!(acme.total_account_sessions, 2);
    assert_eq!(acme.unique_users, 2);
    assert_eq!(acme.active_sessions_last_24h, 2);

    let all = admin.session_stats(None).await.unwrap();
    assert_eq!(all.total_browser_sessions, 3);
}
