//! End-to-end identity scenarios over the in-memory node store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use keystone_identity_repository::RepositoryError;
use keystone_identity_store::NodeStore;
use keystone_identity_test_fixtures::{
    memory_identity, patch, test_role, test_tenant, test_user,
};
use keystone_identity_types::{Metadata, UserRecord};
use serde_json::json;

#[tokio::test]
async fn test_bootstrap_scenario() {
    let (identity, _) = memory_identity();

    identity.create_role(test_role("admin")).await.unwrap();
    identity.create_user(test_user("123", "joe")).await.unwrap();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();
    identity.add_user_to_tenant("abc", "123").await.unwrap();
    identity.add_role_to_user_and_tenant("123", "abc", "admin").await.unwrap();

    assert_eq!(identity.get_roles_for_user_and_tenant("123", "abc").await.unwrap(), vec!["admin"]);
    assert_eq!(identity.get_tenants_for_user("123").await.unwrap(), vec!["abc"]);
    assert_eq!(identity.get_user_by_name("joe").await.unwrap().unwrap().id, "123");
    assert_eq!(identity.get_tenant_by_name("accounting").await.unwrap().unwrap().id, "abc");
    assert_eq!(identity.get_role("admin").await.unwrap().unwrap().name, "admin");
    assert_eq!(identity.get_role_by_name("admin").await.unwrap().unwrap().id, "admin");
    assert!(identity.get_role_by_name("owner").await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_round_trip_hides_password() {
    let (identity, store) = memory_identity();
    let mut record = test_user("123", "joe");
    record.attributes.insert("email".into(), json!("joe@example.com"));
    record.attributes.insert("enabled".into(), json!(true));

    let created = identity.create_user(record).await.unwrap();
    let fetched = identity.get_user("123").await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(
        serde_json::to_value(&fetched).unwrap(),
        json!({"id": "123", "name": "joe", "email": "joe@example.com", "enabled": true})
    );

    // The stored node carries a hash, never the plaintext
    let raw = store.get("/keystone/user/123").await.unwrap().unwrap();
    let stored: UserRecord = serde_json::from_slice(&raw).unwrap();
    let hash = stored.password.unwrap();
    assert!(hash.starts_with("$argon2id$v=19$"));
    assert!(!hash.contains("joe-password"));
}

#[tokio::test]
async fn test_duplicate_names_and_ids() {
    let (identity, _) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();

    let err = identity.create_user(test_user("456", "joe")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateName(_)));

    let err = identity.create_user(test_user("123", "someone-else")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateId(_)));

    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();
    let err = identity.create_tenant(test_tenant("xyz", "accounting")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateName(_)));
}

#[tokio::test]
async fn test_membership_add_and_remove() {
    let (identity, _) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();

    identity.add_user_to_tenant("abc", "123").await.unwrap();
    assert!(identity.get_tenants_for_user("123").await.unwrap().contains(&"abc".to_string()));
    assert!(identity.get_users_for_tenant("abc").await.unwrap().contains(&"123".to_string()));

    identity.remove_user_from_tenant("abc", "123").await.unwrap();
    assert!(identity.get_tenants_for_user("123").await.unwrap().is_empty());
    assert!(identity.get_users_for_tenant("abc").await.unwrap().is_empty());

    identity.remove_user_from_tenant("abc", "123").await.unwrap();
    identity.remove_user_from_tenant("nope", "nobody").await.unwrap();
}

#[tokio::test]
async fn test_update_metadata_reconciles_roles() {
    let (identity, _) = memory_identity();
    identity.add_user_to_tenant("abc", "123").await.unwrap();
    identity.create_metadata("123", "abc", Metadata::new()).await.unwrap();
    identity.add_role_to_user_and_tenant("123", "abc", "r3").await.unwrap();

    identity.update_metadata("123", "abc", Metadata::with_roles(["r1", "r2"])).await.unwrap();
    assert_eq!(
        identity.get_roles_for_user_and_tenant("123", "abc").await.unwrap(),
        vec!["r1", "r2"]
    );

    identity.update_metadata("123", "abc", Metadata::with_roles(["r2"])).await.unwrap();
    assert_eq!(identity.get_roles_for_user_and_tenant("123", "abc").await.unwrap(), vec!["r2"]);
    assert_eq!(
        identity.get_metadata("123", "abc").await.unwrap(),
        Some(Metadata::with_roles(["r2"]))
    );
}

#[tokio::test]
async fn test_direct_role_changes_drift_from_metadata() {
    let (identity, _) = memory_identity();
    identity.create_metadata("123", "abc", Metadata::new()).await.unwrap();
    identity.update_metadata("123", "abc", Metadata::with_roles(["r1"])).await.unwrap();

    identity.add_role_to_user_and_tenant("123", "abc", "r2").await.unwrap();

    let metadata = identity.get_metadata("123", "abc").await.unwrap().unwrap();
    assert_eq!(metadata.role_ids(), vec!["r1"]);
    assert_eq!(
        identity.get_roles_for_user_and_tenant("123", "abc").await.unwrap(),
        vec!["r1", "r2"]
    );
}

#[tokio::test]
async fn test_authenticate_requires_membership() {
    let (identity, _) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();
    identity.create_tenant(test_tenant("xyz", "sales")).await.unwrap();
    identity.add_user_to_tenant("abc", "123").await.unwrap();

    let auth = identity.authenticate("123", Some("abc"), "joe-password").await.unwrap();
    assert_eq!(auth.user.id, "123");
    assert!(!auth.user.attributes.contains_key("password"));
    assert_eq!(auth.tenant.unwrap().id, "abc");

    let err = identity.authenticate("123", Some("xyz"), "joe-password").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Authentication(_)));

    let err = identity.authenticate("123", Some("abc"), "wrong").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Authentication(_)));
}

#[tokio::test]
async fn test_delete_user_leaves_orphans() {
    let (identity, _) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();
    identity.add_user_to_tenant("abc", "123").await.unwrap();
    identity.add_role_to_user_and_tenant("123", "abc", "admin").await.unwrap();

    identity.delete_user("123").await.unwrap();

    assert!(identity.list_users().await.unwrap().is_empty());
    assert!(identity.get_user("123").await.unwrap().is_none());
    assert_eq!(identity.get_users_for_tenant("abc").await.unwrap(), vec!["123"]);
    assert_eq!(identity.get_roles_for_user_and_tenant("123", "abc").await.unwrap(), vec!["admin"]);
    // The resolving listing skips the orphan
    assert!(identity.users_in_tenant("abc").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_can_be_created_after_membership() {
    let (identity, _) = memory_identity();
    identity.add_user_to_tenant("abc", "123").await.unwrap();
    assert!(identity.get_user("123").await.unwrap().is_none());

    identity.create_user(test_user("123", "joe")).await.unwrap();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();

    assert_eq!(identity.get_tenants_for_user("123").await.unwrap(), vec!["abc"]);
    let auth = identity.authenticate("123", Some("abc"), "joe-password").await.unwrap();
    assert_eq!(auth.tenant.unwrap().name, "accounting");
}

#[tokio::test]
async fn test_updates_merge_and_fail_on_missing_base() {
    let (identity, _) = memory_identity();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();

    let tenant = identity.update_tenant("abc", patch(json!({"enabled": false}))).await.unwrap();
    assert_eq!(tenant.name, "accounting");
    assert_eq!(tenant.attributes["enabled"], json!(false));

    let err = identity.update_tenant("missing", patch(json!({"x": 1}))).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
    let err = identity.update_user("missing", patch(json!({"x": 1}))).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
    let err = identity.update_role("missing", patch(json!({"x": 1}))).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
    assert!(identity.get_tenant("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_updated_password_authenticates() {
    let (identity, _) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();

    identity.update_user("123", patch(json!({"password": "rotated"}))).await.unwrap();

    identity.authenticate("123", None, "rotated").await.unwrap();
    let err = identity.authenticate("123", None, "joe-password").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Authentication(_)));
}

#[tokio::test]
async fn test_store_failures_are_not_absence() {
    let (identity, store) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();
    store.disconnect();

    assert!(matches!(identity.get_user("123").await, Err(RepositoryError::StoreUnavailable(_))));
    assert!(matches!(
        identity.get_user_by_name("joe").await,
        Err(RepositoryError::StoreUnavailable(_))
    ));
    assert!(matches!(identity.list_users().await, Err(RepositoryError::StoreUnavailable(_))));
    assert!(matches!(
        identity.authenticate("123", None, "joe-password").await,
        Err(RepositoryError::StoreUnavailable(_))
    ));
    assert!(matches!(
        identity.remove_user_from_tenant("abc", "123").await,
        Err(RepositoryError::StoreUnavailable(_))
    ));

    store.connect();
    assert_eq!(identity.get_user("123").await.unwrap().unwrap().name, "joe");
}

#[tokio::test]
async fn test_purge_clears_namespace() {
    let (identity, _) = memory_identity();
    identity.create_user(test_user("123", "joe")).await.unwrap();
    identity.create_tenant(test_tenant("abc", "accounting")).await.unwrap();
    identity.create_role(test_role("admin")).await.unwrap();

    identity.purge().await.unwrap();

    assert!(identity.list_users().await.unwrap().is_empty());
    assert!(identity.list_tenants().await.unwrap().is_empty());
    assert!(identity.list_roles().await.unwrap().is_empty());
    identity.create_user(test_user("123", "joe")).await.unwrap();
}
