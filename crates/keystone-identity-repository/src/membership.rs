//! User-tenant memberships and per-membership role assignments.
//!
//! A membership is stored twice so either direction lists without a scan:
//!
//! - `{root}/user/{uid}/tenant/{tid}` → `null`
//! - `{root}/tenant/{tid}/user/{uid}` → `null`
//!
//! Role assignments hang off the tenant-side mirror:
//!
//! - `{root}/tenant/{tid}/user/{uid}/role/{rid}` → `null`
//!
//! The store has no transactions. The two mirror writes are independent, so a
//! failure between them leaves a half-written pair. It is logged and
//! reported, never rolled back. Nothing here checks that the referenced users,
//! tenants or roles exist.

use keystone_identity_store::NodeStore;

use crate::{
    error::RepositoryResult,
    node::NodeClient,
    paths::{tenant, user},
};

/// Relationship index over the membership and role-assignment nodes.
pub struct MembershipIndex<S: NodeStore> {
    client: NodeClient<S>,
}

impl<S: NodeStore> MembershipIndex<S> {
    pub fn new(client: NodeClient<S>) -> Self {
        Self { client }
    }

    /// Record that `user_id` belongs to `tenant_id`, user side first.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if either mirror already exists. If the tenant-side
    /// write fails the user-side mirror stays in place.
    pub async fn add_membership(&self, tenant_id: &str, user_id: &str) -> RepositoryResult<()> {
        self.client.create(&user::tenant(user_id, tenant_id), &()).await?;

        if let Err(e) = self.client.create(&tenant::user(tenant_id, user_id), &()).await {
            tracing::warn!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                error = %e,
                "Membership half-written: user side stored, tenant side failed"
            );
            return Err(e);
        }

        tracing::debug!(tenant_id = %tenant_id, user_id = %user_id, "Added membership");
        Ok(())
    }

    /// Remove both mirrors. Removing the tenant-side mirror also drops the
    /// pair's role assignments and metadata. Missing mirrors are ignored.
    pub async fn remove_membership(&self, tenant_id: &str, user_id: &str) -> RepositoryResult<()> {
        self.client.delete(&user::tenant(user_id, tenant_id)).await?;

        if let Err(e) = self.client.delete(&tenant::user(tenant_id, user_id)).await {
            tracing::warn!(
                tenant_id = %tenant_id,
                user_id = %user_id,
                error = %e,
                "Membership half-removed: user side deleted, tenant side failed"
            );
            return Err(e);
        }

        tracing::debug!(tenant_id = %tenant_id, user_id = %user_id, "Removed membership");
        Ok(())
    }

    /// Tenant ids recorded on the user side. May name tenants that no longer
    /// exist.
    pub async fn tenants_for_user(&self, user_id: &str) -> RepositoryResult<Vec<String>> {
        self.client.list(&user::tenants(user_id)).await
    }

    /// User ids recorded on the tenant side. May name users that no longer
    /// exist.
    pub async fn users_for_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<String>> {
        self.client.list(&tenant::users(tenant_id)).await
    }

    pub async fn is_member(&self, tenant_id: &str, user_id: &str) -> RepositoryResult<bool> {
        self.client.holds_value(&user::tenant(user_id, tenant_id)).await
    }

    /// Role ids assigned to `user_id` within `tenant_id`.
    pub async fn roles_for(&self, user_id: &str, tenant_id: &str) -> RepositoryResult<Vec<String>> {
        self.client.list(&tenant::roles(tenant_id, user_id)).await
    }

    /// Assign `role_id`. `Conflict` if already assigned.
    pub async fn add_role(&self, user_id: &str, tenant_id: &str, role_id: &str) -> RepositoryResult<()> {
        self.client.create(&tenant::role(tenant_id, user_id, role_id), &()).await?;
        tracing::debug!(tenant_id = %tenant_id, user_id = %user_id, role_id = %role_id, "Assigned role");
        Ok(())
    }

    /// Unassign `role_id`. Unassigning a role that is not assigned succeeds.
    pub async fn remove_role(&self, user_id: &str, tenant_id: &str, role_id: &str) -> RepositoryResult<()> {
        self.client.delete(&tenant::role(tenant_id, user_id, role_id)).await?;
        tracing::debug!(tenant_id = %tenant_id, user_id = %user_id, role_id = %role_id, "Unassigned role");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use keystone_identity_store::MemoryNodeStore;

    use super::*;
    use crate::{error::RepositoryError, paths::Namespace};

    fn create_index() -> (MembershipIndex<MemoryNodeStore>, MemoryNodeStore) {
        let store = MemoryNodeStore::new();
        (MembershipIndex::new(NodeClient::new(store.clone(), Namespace::default())), store)
    }

    #[tokio::test]
    async fn test_membership_is_mirrored() {
        let (index, store) = create_index();
        index.add_membership("abc", "123").await.unwrap();

        assert_eq!(index.tenants_for_user("123").await.unwrap(), vec!["abc"]);
        assert_eq!(index.users_for_tenant("abc").await.unwrap(), vec!["123"]);
        assert!(index.is_member("abc", "123").await.unwrap());
        assert_eq!(store.get("/keystone/user/123/tenant/abc").await.unwrap(), Some(b"null".to_vec()));
        assert_eq!(store.get("/keystone/tenant/abc/user/123").await.unwrap(), Some(b"null".to_vec()));
    }

    #[tokio::test]
    async fn test_add_membership_twice_conflicts() {
        let (index, _) = create_index();
        index.add_membership("abc", "123").await.unwrap();

        let err = index.add_membership("abc", "123").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_remove_membership_is_idempotent() {
        let (index, _) = create_index();
        index.add_membership("abc", "123").await.unwrap();

        index.remove_membership("abc", "123").await.unwrap();
        index.remove_membership("abc", "123").await.unwrap();
        index.remove_membership("never", "existed").await.unwrap();

        assert!(index.tenants_for_user("123").await.unwrap().is_empty());
        assert!(index.users_for_tenant("abc").await.unwrap().is_empty());
        assert!(!index.is_member("abc", "123").await.unwrap());
    }

    #[tokio::test]
    async fn test_half_written_membership_stays() {
        let (index, store) = create_index();
        // The tenant-side mirror already exists, so the second write fails
        store.create("/keystone/tenant/abc/user/123", b"null".to_vec()).await.unwrap();

        let err = index.add_membership("abc", "123").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(index.tenants_for_user("123").await.unwrap(), vec!["abc"]);
    }

    #[tokio::test]
    async fn test_role_assignment() {
        let (index, _) = create_index();
        index.add_membership("abc", "123").await.unwrap();

        index.add_role("123", "abc", "admin").await.unwrap();
        index.add_role("123", "abc", "member").await.unwrap();
        assert_eq!(index.roles_for("123", "abc").await.unwrap(), vec!["admin", "member"]);

        let err = index.add_role("123", "abc", "admin").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        index.remove_role("123", "abc", "admin").await.unwrap();
        index.remove_role("123", "abc", "admin").await.unwrap();
        assert_eq!(index.roles_for("123", "abc").await.unwrap(), vec!["member"]);
    }

    #[tokio::test]
    async fn test_remove_membership_drops_role_assignments() {
        let (index, _) = create_index();
        index.add_membership("abc", "123").await.unwrap();
        index.add_role("123", "abc", "admin").await.unwrap();

        index.remove_membership("abc", "123").await.unwrap();
        assert!(index.roles_for("123", "abc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roles_for_unknown_pair_is_empty() {
        let (index, _) = create_index();
        assert!(index.roles_for("nobody", "nowhere").await.unwrap().is_empty());
    }
}
