//! RBAC service: cache behavior, enrichment caps, and the assignment
//! guards.

use chrono::Utc;

use crate::core::error::{CoreError, RbacError};
use crate::core::rbac::{Permission, Role, UserRole};
use crate::core::usecases::testing::{fixture, Fixture, TEST_TENANT};

fn seed_editor_with_posts_read(f: &Fixture, user_id: &str) {
    let role = Role::new("r1", TEST_TENANT, "editor");
    f.rbac_repo.roles.lock().unwrap().insert("r1".into(), role);
    f.rbac_repo
        .permissions
        .lock()
        .unwrap()
        .insert("p1".into(), Permission::new("p1", "app-1", "posts", "read"));
    f.rbac_repo
        .grants
        .lock()
        .unwrap()
        .insert("r1".into(), vec!["p1".into()]);
    f.rbac_repo.assignments.lock().unwrap().push(UserRole {
        user_id: user_id.into(),
        role_id: "r1".into(),
        tenant_id: TEST_TENANT.into(),
        assigned_at: Utc::now(),
        assigned_by: "admin-1".into(),
        expires_at: None,
    });
}

#[tokio::test]
async fn test_check_permission_and_batch() {
    let f = fixture();
    seed_editor_with_posts_read(&f, "u1");

    assert!(f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:read")
        .await
        .unwrap());
    assert!(!f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:delete")
        .await
        .unwrap());

    let results = f
        .rbac
        .check_permissions(
            TEST_TENANT,
            "u1",
            "app-1",
            &["posts:read".to_string(), "posts:delete".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(results["posts:read"], true);
    assert_eq!(results["posts:delete"], false);
}

#[tokio::test]
async fn test_stale_cache_until_invalidation() {
    let f = fixture();
    seed_editor_with_posts_read(&f, "u1");

    // Warm the cache.
    assert!(f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:read")
        .await
        .unwrap());

    // Remove the grant behind the cache's back.
    f.rbac_repo.assignments.lock().unwrap().clear();

    // Still true inside the TTL window; that staleness is by contract.
    assert!(f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:read")
        .await
        .unwrap());

    // Invalidation makes the next check resolve fresh.
    f.rbac.invalidate_user(TEST_TENANT, "u1").await;
    assert!(!f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:read")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_enrichment_dedupes_and_caps() {
    let f = fixture();
    // Two roles sharing one permission plus 59 more.
    {
        let mut roles = f.rbac_repo.roles.lock().unwrap();
        roles.insert("r1".into(), Role::new("r1", TEST_TENANT, "editor"));
        roles.insert("r2".into(), Role::new("r2", TEST_TENANT, "writer"));
    }
    {
        let mut permissions = f.rbac_repo.permissions.lock().unwrap();
        let mut grants = f.rbac_repo.grants.lock().unwrap();
        let mut r1_grants = vec![];
        for i in 0..60 {
            let id = format!("p{}", i);
            permissions.insert(
                id.clone(),
                Permission::new(&id, "app-1", "res", format!("a{}", i)),
            );
            r1_grants.push(id);
        }
        grants.insert("r1".into(), r1_grants);
        // r2 shares p0, to prove dedupe.
        grants.insert("r2".into(), vec!["p0".into()]);
    }
    {
        let mut assignments = f.rbac_repo.assignments.lock().unwrap();
        for role_id in ["r1", "r2"] {
            assignments.push(UserRole {
                user_id: "u1".into(),
                role_id: role_id.into(),
                tenant_id: TEST_TENANT.into(),
                assigned_at: Utc::now(),
                assigned_by: "admin-1".into(),
                expires_at: None,
            });
        }
    }

    let claims = f
        .rbac
        .enrich_token_claims(TEST_TENANT, "u1", "app-1")
        .await
        .unwrap();
    assert_eq!(claims.roles, vec!["editor", "writer"]);
    assert_eq!(claims.permissions.len(), 50);
    assert!(claims.truncated);
    // No duplicates survived.
    let unique: std::collections::HashSet<&String> = claims.permissions.iter().collect();
    assert_eq!(unique.len(), claims.permissions.len());
}

#[tokio::test]
async fn test_self_assignment_rejected() {
    let f = fixture();
    f.rbac_repo
        .roles
        .lock()
        .unwrap()
        .insert("r1".into(), Role::new("r1", TEST_TENANT, "editor"));

    let err = f
        .rbac
        .assign_role_to_user(TEST_TENANT, "u1", "r1", "u1", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Rbac(RbacError::SelfAssignment { .. })
    ));
}

#[tokio::test]
async fn test_system_role_requires_holder_assigner() {
    let f = fixture();
    let mut role = Role::new("r1", TEST_TENANT, "super-admin");
    role.is_system_role = true;
    f.rbac_repo.roles.lock().unwrap().insert("r1".into(), role);

    // admin-1 does not hold super-admin.
    let err = f
        .rbac
        .assign_role_to_user(TEST_TENANT, "u1", "r1", "admin-1", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Rbac(RbacError::PrivilegeEscalation { .. })
    ));

    // Grant admin-1 the role out of band; assignment now passes.
    f.rbac_repo.assignments.lock().unwrap().push(UserRole {
        user_id: "admin-1".into(),
        role_id: "r1".into(),
        tenant_id: TEST_TENANT.into(),
        assigned_at: Utc::now(),
        assigned_by: "bootstrap".into(),
        expires_at: None,
    });
    assert!(f
        .rbac
        .assign_role_to_user(TEST_TENANT, "u1", "r1", "admin-1", None)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_system_role_cannot_be_updated_or_deleted() {
    let f = fixture();
    let mut role = Role::new("r1", TEST_TENANT, "super-admin");
    role.is_system_role = true;
    f.rbac_repo
        .roles
        .lock()
        .unwrap()
        .insert("r1".into(), role.clone());

    role.description = Some("renamed".into());
    let err = f.rbac.update_role(role).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Rbac(RbacError::CannotModifySystemRole { .. })
    ));

    let err = f.rbac.delete_role("r1").await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Rbac(RbacError::CannotModifySystemRole { .. })
    ));
}

#[tokio::test]
async fn test_invalid_role_name_rejected() {
    let f = fixture();
    let role = Role::new("r1", TEST_TENANT, "not a valid name");
    let err = f.rbac.create_role(role).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Rbac(RbacError::InvalidRoleName { .. })
    ));
}

#[tokio::test]
async fn test_permission_grant_invalidates_holder_caches() {
    let f = fixture();
    seed_editor_with_posts_read(&f, "u1");

    // Warm cache: posts:write not yet granted.
    assert!(!f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:write")
        .await
        .unwrap());

    f.rbac_repo
        .permissions
        .lock()
        .unwrap()
        .insert("p2".into(), Permission::new("p2", "app-1", "posts", "write"));
    f.rbac
        .assign_permission_to_role(TEST_TENANT, "r1", "p2")
        .await
        .unwrap();

    // Invalidation happened inside the call; fresh resolve sees the grant.
    assert!(f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:write")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_expired_assignment_does_not_resolve() {
    let f = fixture();
    seed_editor_with_posts_read(&f, "u1");
    f.rbac_repo
        .assignments
        .lock()
        .unwrap()
        .iter_mut()
        .for_each(|a| a.expires_at = Some(Utc::now() - chrono::Duration::days(1)));

    assert!(!f
        .rbac
        .check_permission(TEST_TENANT, "u1", "app-1", "posts:read")
        .await
        .unwrap());
}
