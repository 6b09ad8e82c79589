//! Identity facade.
//!
//! [`IdentityStore`] combines the entity repositories, the membership index
//! and the metadata reconciler behind one set of driver operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    IdentityStore<S>                     │
//! │   (authentication + every identity driver operation)    │
//! ├──────────┬──────────┬──────────┬────────────┬───────────┤
//! │  Users   │ Tenants  │  Roles   │ Membership │ Metadata  │
//! ├──────────┴──────────┴──────────┴────────────┴───────────┤
//! │              NodeClient (namespace + JSON)              │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//!                      NodeStore (S)
//! ```

use std::sync::Arc;

use keystone_identity_store::{MetricsSnapshot, NodeStore};
use keystone_identity_types::{Attributes, Metadata, Role, Tenant, User, UserRecord};

use crate::{
    error::{RepositoryError, RepositoryResult},
    membership::MembershipIndex,
    metadata::MetadataRepository,
    node::NodeClient,
    password::{Argon2Hasher, PasswordHasher},
    paths::Namespace,
    role::RoleRepository,
    tenant::TenantRepository,
    user::UserRepository,
};

/// Result of a successful [`IdentityStore::authenticate`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// The user, without password.
    pub user: User,
    /// The requested tenant, if one was requested and it still exists.
    pub tenant: Option<Tenant>,
    /// Metadata for the (user, tenant) pair; empty when there is none.
    pub metadata: Metadata,
}

/// Identity operations over a hierarchical node store.
///
/// # Example
///
/// ```ignore
/// use keystone_identity_store::MemoryNodeStore;
/// use keystone_identity_repository::IdentityStore;
///
/// let identity = IdentityStore::builder().backend(MemoryNodeStore::new()).build();
/// let user = identity.create_user(record).await?;
/// ```
pub struct IdentityStore<S: NodeStore> {
    client: NodeClient<S>,
    users: UserRepository<S>,
    tenants: TenantRepository<S>,
    roles: RoleRepository<S>,
    memberships: MembershipIndex<S>,
    metadata: MetadataRepository<S>,
    hasher: Arc<dyn PasswordHasher>,
}

fn default_hasher() -> Arc<dyn PasswordHasher> {
    Arc::new(Argon2Hasher::default())
}

#[bon::bon]
impl<S: NodeStore + Clone> IdentityStore<S> {
    /// Build the facade over `backend`. Every repository shares the same
    /// store handle and namespace.
    #[builder]
    pub fn new(
        backend: S,
        #[builder(default)] namespace: Namespace,
        #[builder(default = default_hasher())] hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let client = NodeClient::new(backend, namespace);
        Self {
            users: UserRepository::new(client.clone(), Arc::clone(&hasher)),
            tenants: TenantRepository::new(client.clone()),
            roles: RoleRepository::new(client.clone()),
            memberships: MembershipIndex::new(client.clone()),
            metadata: MetadataRepository::new(client.clone()),
            client,
            hasher,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check a user's password and, optionally, its membership in a tenant.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the user is unknown, has no password, the
    /// password does not match, or the user is not a member of `tenant_id`.
    /// Store failures propagate as themselves.
    pub async fn authenticate(
        &self,
        user_id: &str,
        tenant_id: Option<&str>,
        password: &str,
    ) -> RepositoryResult<AuthenticatedUser> {
        let invalid_credentials =
            || RepositoryError::Authentication("Invalid user / password".to_string());

        let account = self.users.get_account(user_id).await?.ok_or_else(invalid_credentials)?;
        let verified = account
            .record
            .password
            .as_deref()
            .is_some_and(|stored| self.hasher.verify(password, stored));
        if !verified {
            tracing::debug!(user_id = %user_id, "Authentication rejected");
            return Err(invalid_credentials());
        }

        let (tenant, metadata) = match tenant_id {
            None => (None, Metadata::new()),
            Some(tenant_id) => {
                if !account.tenant_ids.iter().any(|t| t == tenant_id) {
                    tracing::debug!(user_id = %user_id, tenant_id = %tenant_id, "Not a member");
                    return Err(RepositoryError::Authentication("Invalid tenant".to_string()));
                }
                match self.tenants.get(tenant_id).await? {
                    Some(tenant) => {
                        let metadata =
                            self.metadata.get(user_id, tenant_id).await?.unwrap_or_default();
                        (Some(tenant), metadata)
                    },
                    None => (None, Metadata::new()),
                }
            },
        };

        Ok(AuthenticatedUser { user: User::from(account.record), tenant, metadata })
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn create_user(&self, record: UserRecord) -> RepositoryResult<User> {
        self.users.create(record).await
    }

    pub async fn get_user(&self, user_id: &str) -> RepositoryResult<Option<User>> {
        self.users.get(user_id).await
    }

    pub async fn get_user_by_name(&self, name: &str) -> RepositoryResult<Option<User>> {
        self.users.get_by_name(name).await
    }

    pub async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.users.list().await
    }

    pub async fn update_user(&self, user_id: &str, patch: Attributes) -> RepositoryResult<User> {
        self.users.update(user_id, patch).await
    }

    /// Delete a user. Tenant-side membership mirrors, role assignments and
    /// metadata for the user remain.
    pub async fn delete_user(&self, user_id: &str) -> RepositoryResult<()> {
        self.users.delete(user_id).await
    }

    // =========================================================================
    // Tenants
    // =========================================================================

    pub async fn create_tenant(&self, tenant: Tenant) -> RepositoryResult<Tenant> {
        self.tenants.create(tenant).await
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> RepositoryResult<Option<Tenant>> {
        self.tenants.get(tenant_id).await
    }

    pub async fn get_tenant_by_name(&self, name: &str) -> RepositoryResult<Option<Tenant>> {
        self.tenants.get_by_name(name).await
    }

    pub async fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>> {
        self.tenants.list().await
    }

    pub async fn update_tenant(
        &self,
        tenant_id: &str,
        patch: Attributes,
    ) -> RepositoryResult<Tenant> {
        self.tenants.update(tenant_id, patch).await
    }

    /// Delete a tenant with its member subtree. User-side mirrors remain.
    pub async fn delete_tenant(&self, tenant_id: &str) -> RepositoryResult<()> {
        self.tenants.delete(tenant_id).await
    }

    // =========================================================================
    // Roles
    // =========================================================================

    pub async fn create_role(&self, role: Role) -> RepositoryResult<Role> {
        self.roles.create(role).await
    }

    pub async fn get_role(&self, role_id: &str) -> RepositoryResult<Option<Role>> {
        self.roles.get(role_id).await
    }

    /// First role in store order with this name. Role names may repeat.
    pub async fn get_role_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        self.roles.get_by_name(name).await
    }

    pub async fn list_roles(&self) -> RepositoryResult<Vec<Role>> {
        self.roles.list().await
    }

    pub async fn update_role(&self, role_id: &str, patch: Attributes) -> RepositoryResult<Role> {
        self.roles.update(role_id, patch).await
    }

    pub async fn delete_role(&self, role_id: &str) -> RepositoryResult<()> {
        self.roles.delete(role_id).await
    }

    // =========================================================================
    // Memberships
    // =========================================================================

    pub async fn add_user_to_tenant(&self, tenant_id: &str, user_id: &str) -> RepositoryResult<()> {
        self.memberships.add_membership(tenant_id, user_id).await
    }

    pub async fn remove_user_from_tenant(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> RepositoryResult<()> {
        self.memberships.remove_membership(tenant_id, user_id).await
    }

    /// Tenant ids the user is recorded under, including dangling ones.
    pub async fn get_tenants_for_user(&self, user_id: &str) -> RepositoryResult<Vec<String>> {
        self.memberships.tenants_for_user(user_id).await
    }

    /// User ids recorded under the tenant, including dangling ones.
    pub async fn get_users_for_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<String>> {
        self.memberships.users_for_tenant(tenant_id).await
    }

    /// Tenants the user belongs to that still exist.
    pub async fn tenants_of_user(&self, user_id: &str) -> RepositoryResult<Vec<Tenant>> {
        let ids = self.memberships.tenants_for_user(user_id).await?;
        self.tenants.resolve(&ids).await
    }

    /// Members of the tenant that still exist.
    pub async fn users_in_tenant(&self, tenant_id: &str) -> RepositoryResult<Vec<User>> {
        let ids = self.memberships.users_for_tenant(tenant_id).await?;
        self.users.resolve(&ids).await
    }

    // =========================================================================
    // Role assignments
    // =========================================================================

    pub async fn add_role_to_user_and_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
        role_id: &str,
    ) -> RepositoryResult<()> {
        self.memberships.add_role(user_id, tenant_id, role_id).await
    }

    pub async fn remove_role_from_user_and_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
        role_id: &str,
    ) -> RepositoryResult<()> {
        self.memberships.remove_role(user_id, tenant_id, role_id).await
    }

    pub async fn get_roles_for_user_and_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        self.memberships.roles_for(user_id, tenant_id).await
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub async fn create_metadata(
        &self,
        user_id: &str,
        tenant_id: &str,
        metadata: Metadata,
    ) -> RepositoryResult<Metadata> {
        self.metadata.create(user_id, tenant_id, &metadata).await
    }

    pub async fn get_metadata(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> RepositoryResult<Option<Metadata>> {
        self.metadata.get(user_id, tenant_id).await
    }

    /// Replace metadata and make the pair's role assignments equal its
    /// `roles` list.
    pub async fn update_metadata(
        &self,
        user_id: &str,
        tenant_id: &str,
        metadata: Metadata,
    ) -> RepositoryResult<Metadata> {
        self.metadata.update(user_id, tenant_id, &metadata).await
    }

    pub async fn delete_metadata(&self, user_id: &str, tenant_id: &str) -> RepositoryResult<()> {
        self.metadata.delete(user_id, tenant_id).await
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Delete everything under the namespace root.
    pub async fn purge(&self) -> RepositoryResult<()> {
        self.client.purge().await?;
        tracing::info!(namespace = %self.client.namespace().root(), "Purged identity namespace");
        Ok(())
    }

    pub fn namespace(&self) -> &Namespace {
        self.client.namespace()
    }

    /// Operation metrics of the underlying store, if it records any.
    pub fn store_metrics(&self) -> Option<MetricsSnapshot> {
        self.client.store().metrics()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use keystone_identity_store::MemoryNodeStore;
    use serde_json::json;

    use super::*;

    fn create_identity() -> IdentityStore<MemoryNodeStore> {
        IdentityStore::builder()
            .backend(MemoryNodeStore::new())
            .hasher(Arc::new(Argon2Hasher::new(1, 8, 16).unwrap()))
            .build()
    }

    async fn seed(identity: &IdentityStore<MemoryNodeStore>) {
        identity
            .create_user(
                UserRecord::builder().id("123").name("joe").password("secret".to_string()).build(),
            )
            .await
            .unwrap();
        identity
            .create_tenant(Tenant::builder().id("abc").name("accounting").build())
            .await
            .unwrap();
        identity.add_user_to_tenant("abc", "123").await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_without_tenant() {
        let identity = create_identity();
        seed(&identity).await;

        let auth = identity.authenticate("123", None, "secret").await.unwrap();
        assert_eq!(auth.user.id, "123");
        assert!(!auth.user.attributes.contains_key("password"));
        assert!(auth.tenant.is_none());
        assert!(auth.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_with_tenant_returns_metadata() {
        let identity = create_identity();
        seed(&identity).await;
        let mut metadata = Metadata::with_roles(["admin"]);
        metadata.attributes.insert("theme".into(), json!("dark"));
        identity.create_metadata("123", "abc", metadata.clone()).await.unwrap();

        let auth = identity.authenticate("123", Some("abc"), "secret").await.unwrap();
        assert_eq!(auth.tenant.unwrap().name, "accounting");
        assert_eq!(auth.metadata, metadata);
    }

    #[tokio::test]
    async fn test_authenticate_rejections() {
        let identity = create_identity();
        seed(&identity).await;
        identity
            .create_tenant(Tenant::builder().id("xyz").name("sales").build())
            .await
            .unwrap();
        identity
            .create_user(UserRecord::builder().id("456").name("nopass").build())
            .await
            .unwrap();

        for (user, tenant, password) in [
            ("123", None, "wrong"),
            ("999", None, "secret"),
            ("456", None, ""),
            ("123", Some("xyz"), "secret"),
        ] {
            let err = identity.authenticate(user, tenant, password).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Authentication(_)), "{user} {tenant:?}");
        }
    }

    #[tokio::test]
    async fn test_authenticate_member_of_deleted_tenant() {
        let identity = create_identity();
        seed(&identity).await;
        identity.delete_tenant("abc").await.unwrap();

        let auth = identity.authenticate("123", Some("abc"), "secret").await.unwrap();
        assert!(auth.tenant.is_none());
        assert!(auth.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_resolving_listings_skip_dangling_ids() {
        let identity = create_identity();
        seed(&identity).await;
        identity.add_user_to_tenant("ghost-tenant", "123").await.unwrap();
        identity.add_user_to_tenant("abc", "ghost-user").await.unwrap();

        let tenant_ids = identity.get_tenants_for_user("123").await.unwrap();
        assert_eq!(tenant_ids, vec!["abc", "ghost-tenant"]);
        let tenants = identity.tenants_of_user("123").await.unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].id, "abc");

        let users = identity.users_in_tenant("abc").await.unwrap();
        assert_eq!(users.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(), vec!["123"]);
        // The placeholder for the ghost user is not a user
        assert!(identity.get_user("ghost-user").await.unwrap().is_none());
        assert_eq!(identity.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_metrics_are_exposed() {
        let identity = create_identity();
        seed(&identity).await;

        let metrics = identity.store_metrics().unwrap();
        assert!(metrics.write_count > 0);
        assert!(metrics.get_count > 0);
    }

    #[tokio::test]
    async fn test_custom_namespace() {
        let store = MemoryNodeStore::new();
        let identity = IdentityStore::builder()
            .backend(store.clone())
            .namespace(Namespace::new("/apps/identity").unwrap())
            .build();

        identity.create_role(Role::builder().id("admin").name("Admin").build()).await.unwrap();
        assert!(store.get("/apps/identity/role/admin").await.unwrap().is_some());
        assert_eq!(identity.namespace().root(), "/apps/identity");

        identity.purge().await.unwrap();
        assert!(store.get("/apps/identity").await.unwrap().is_none());
        assert!(store.get("/apps").await.unwrap().is_some());
    }
}
