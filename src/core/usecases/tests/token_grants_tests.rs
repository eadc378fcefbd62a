//! `/token` grants: one-shot code redemption, PKCE, refresh rotation with
//! family revocation on reuse, client credentials.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::core::audit::AuditEventType;
use crate::core::error::{CoreError, FlowError};
use crate::core::oauth::{AuthorizationCode, PkceChallenge, Subject};
use crate::core::usecases::ports::{SecretVerifier, Storage, TokenSigner};
use crate::core::usecases::testing::{
    fixture, fixture_with_clients, test_client, Fixture, TEST_TENANT,
};
use crate::core::usecases::TokenRequest;

async fn seed_code(f: &Fixture, code: &str, pkce: Option<PkceChallenge>) {
    let record = AuthorizationCode {
        subject: Subject::new(
            "user",
            "u1",
            json!({"email": "u1@example.com", "roles": ["editor"], "permissions": ["posts:read"]}),
        ),
        redirect_uri: "https://app/cb".to_string(),
        client_id: "app-1".to_string(),
        tenant_id: TEST_TENANT.to_string(),
        pkce,
        nonce: Some("n-1".to_string()),
        scope: Some("openid".to_string()),
        audience: None,
        access_ttl_seconds: 3600,
        refresh_ttl_seconds: 86_400,
    };
    f.storage
        .set(
            &format!("oauth:code:{}", code),
            serde_json::to_value(&record).unwrap(),
            None,
        )
        .await
        .unwrap();
}

fn code_request(code: &str) -> TokenRequest {
    TokenRequest {
        grant_type: "authorization_code".to_string(),
        code: Some(code.to_string()),
        redirect_uri: Some("https://app/cb".to_string()),
        client_id: "app-1".to_string(),
        ..Default::default()
    }
}

fn refresh_request(token: &str) -> TokenRequest {
    TokenRequest {
        grant_type: "refresh_token".to_string(),
        refresh_token: Some(token.to_string()),
        client_id: "app-1".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_code_redemption_is_single_use() {
    let f = fixture();
    seed_code(&f, "code-1", None).await;

    let response = f.grants.token(code_request("code-1"), TEST_TENANT).await.unwrap();
    assert_eq!(response.token_type, "Bearer");
    assert!(response.refresh_token.is_some());

    // Claims carry the enriched subject.
    let claims = f.signer.verify_access(&response.access_token).unwrap();
    assert_eq!(claims.sub, "u1");
    assert_eq!(claims.roles, vec!["editor"]);
    assert_eq!(claims.permissions, vec!["posts:read"]);
    assert_eq!(claims.tenant_id, TEST_TENANT);
    assert_eq!(claims.nonce.as_deref(), Some("n-1"));

    // Second redemption: the record is gone.
    let err = f
        .grants
        .token(code_request("code-1"), TEST_TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidGrant { .. })));
}

#[tokio::test]
async fn test_redirect_uri_mismatch_rejected() {
    let f = fixture();
    seed_code(&f, "code-1", None).await;

    let mut request = code_request("code-1");
    request.redirect_uri = Some("https://other/cb".to_string());
    let err = f.grants.token(request, TEST_TENANT).await.unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidGrant { .. })));
}

#[tokio::test]
async fn test_pkce_s256_enforced() {
    let f = fixture();
    let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
    seed_code(
        &f,
        "code-1",
        Some(PkceChallenge {
            challenge,
            method: "S256".to_string(),
        }),
    )
    .await;

    // Wrong verifier fails and burns the code.
    let mut bad = code_request("code-1");
    bad.code_verifier = Some("wrong".to_string());
    let err = f.grants.token(bad, TEST_TENANT).await.unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidGrant { .. })));

    // A fresh code with the right verifier succeeds.
    let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
    seed_code(
        &f,
        "code-2",
        Some(PkceChallenge {
            challenge,
            method: "S256".to_string(),
        }),
    )
    .await;
    let mut good = code_request("code-2");
    good.code_verifier = Some(verifier.to_string());
    assert!(f.grants.token(good, TEST_TENANT).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rotation_then_reuse_revokes_family() {
    let f = fixture();
    seed_code(&f, "code-1", None).await;

    // Redeem code -> (access1, refresh1).
    let first = f.grants.token(code_request("code-1"), TEST_TENANT).await.unwrap();
    let refresh1 = first.refresh_token.unwrap();

    // Rotate refresh1 -> refresh2.
    let second = f
        .grants
        .token(refresh_request(&refresh1), TEST_TENANT)
        .await
        .unwrap();
    let refresh2 = second.refresh_token.unwrap();
    assert_ne!(refresh1, refresh2);

    // Replaying refresh1 is reuse: invalid_grant, family revoked, audited.
    let err = f
        .grants
        .token(refresh_request(&refresh1), TEST_TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidGrant { .. })));

    // refresh2 died with the family.
    let err = f
        .grants
        .token(refresh_request(&refresh2), TEST_TENANT)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidGrant { .. })));

    // No records left under the subject's refresh prefix.
    assert!(f.storage.scan("oauth:refresh:u1:").await.unwrap().is_empty());

    // A reused audit event exists.
    let records = f.audit_sink.records.lock().unwrap();
    assert!(records
        .iter()
        .any(|r| r.event_type == AuditEventType::Reused && r.subject == "u1"));
}

#[tokio::test]
async fn test_rotation_chains_and_audits() {
    let f = fixture();
    seed_code(&f, "code-1", None).await;
    let first = f.grants.token(code_request("code-1"), TEST_TENANT).await.unwrap();

    let second = f
        .grants
        .token(refresh_request(&first.refresh_token.unwrap()), TEST_TENANT)
        .await
        .unwrap();
    assert!(second.refresh_token.is_some());

    let records = f.audit_sink.records.lock().unwrap();
    assert!(records
        .iter()
        .any(|r| r.event_type == AuditEventType::Generated));
    assert!(records
        .iter()
        .any(|r| r.event_type == AuditEventType::Refreshed));
}

#[tokio::test]
async fn test_unsupported_grant_type() {
    let f = fixture();
    let request = TokenRequest {
        grant_type: "password".to_string(),
        client_id: "app-1".to_string(),
        ..Default::default()
    };
    let err = f.grants.token(request, TEST_TENANT).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Flow(FlowError::UnsupportedGrantType { .. })
    ));
}

#[tokio::test]
async fn test_client_credentials_grant() {
    let secrets = crate::adapters::crypto::ClientSecretHasher::new().unwrap();
    let hash = secrets.hash("svc-secret").unwrap();
    let f = fixture_with_clients(vec![test_client(Some(hash))]);

    let request = TokenRequest {
        grant_type: "client_credentials".to_string(),
        client_id: "app-1".to_string(),
        client_secret: Some("svc-secret".to_string()),
        scope: Some("read write".to_string()),
        ..Default::default()
    };
    let response = f.grants.token(request, TEST_TENANT).await.unwrap();

    let claims = f.m2m.verify_m2m_token(&response.access_token, None).unwrap();
    assert!(claims.is_m2m());
    assert_eq!(claims.client_id, "app-1");
    assert!(claims.has_all_scopes(&["read", "write"]));
    assert_eq!(claims.tenant_id.as_deref(), Some(TEST_TENANT));
}

#[tokio::test]
async fn test_client_credentials_rejects_unregistered_scope() {
    let secrets = crate::adapters::crypto::ClientSecretHasher::new().unwrap();
    let hash = secrets.hash("svc-secret").unwrap();
    let f = fixture_with_clients(vec![test_client(Some(hash))]);

    let request = TokenRequest {
        grant_type: "client_credentials".to_string(),
        client_id: "app-1".to_string(),
        client_secret: Some("svc-secret".to_string()),
        scope: Some("read delete-everything".to_string()),
        ..Default::default()
    };
    let err = f.grants.token(request, TEST_TENANT).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Flow(FlowError::InvalidRequest { .. })
    ));
}

#[tokio::test]
async fn test_bad_secret_and_unknown_client_fail_alike() {
    let secrets = crate::adapters::crypto::ClientSecretHasher::new().unwrap();
    let hash = secrets.hash("svc-secret").unwrap();
    let f = fixture_with_clients(vec![test_client(Some(hash))]);

    let mut bad_secret = TokenRequest {
        grant_type: "client_credentials".to_string(),
        client_id: "app-1".to_string(),
        client_secret: Some("wrong".to_string()),
        ..Default::default()
    };
    let err = f.grants.token(bad_secret.clone(), TEST_TENANT).await.unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidClient { .. })));

    bad_secret.client_id = "ghost".to_string();
    let err = f.grants.token(bad_secret, TEST_TENANT).await.unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidClient { .. })));
}

#[tokio::test]
async fn test_cross_tenant_code_rejected() {
    let f = fixture();
    seed_code(&f, "code-1", None).await;

    // The same client id resolved under another tenant must not redeem.
    let err = f
        .grants
        .token(code_request("code-1"), "globex")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Flow(FlowError::InvalidClient { .. })));
}
