//! Repository for tenants.
//!
//! # Node Schema
//!
//! - `{root}/tenant/{tid}` → JSON `Tenant`
//! - `{root}/tenant/{tid}/user/...` → membership mirrors, role assignments and
//!   metadata for each member

use keystone_identity_store::NodeStore;
use keystone_identity_types::{Attributes, Entity, Tenant};

use crate::{
    collection::{Collection, patched_name},
    error::RepositoryResult,
    node::NodeClient,
    paths::Segment,
};

/// Repository for tenant entity operations. Tenant names are unique.
pub struct TenantRepository<S: NodeStore> {
    tenants: Collection<S, Tenant>,
}

impl<S: NodeStore> TenantRepository<S> {
    pub fn new(client: NodeClient<S>) -> Self {
        Self { tenants: Collection::new(client, Segment::Tenant) }
    }

    /// Create a new tenant.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a tenant with the same id exists, `DuplicateName`
    /// if another tenant has the same name.
    pub async fn create(&self, mut tenant: Tenant) -> RepositoryResult<Tenant> {
        self.tenants.ensure_id_free(&tenant.id).await?;
        self.tenants.ensure_name_free(&tenant.name, None).await?;

        tenant.strip_reserved();
        self.tenants.insert(&tenant).await?;
        tracing::debug!(tenant_id = %tenant.id, "Created tenant");
        Ok(tenant)
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Option<Tenant>> {
        self.tenants.get(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> RepositoryResult<Option<Tenant>> {
        self.tenants.find_by_name(name).await
    }

    pub async fn list(&self) -> RepositoryResult<Vec<Tenant>> {
        self.tenants.list().await
    }

    /// Resolve `ids` to tenants, skipping ids with no stored tenant.
    pub async fn resolve(&self, ids: &[String]) -> RepositoryResult<Vec<Tenant>> {
        self.tenants.resolve(ids).await
    }

    /// Merge `patch` into the stored tenant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no tenant is stored under `id`, `DuplicateName`
    /// if the patch renames it to a name in use.
    pub async fn update(&self, id: &str, patch: Attributes) -> RepositoryResult<Tenant> {
        if let Some(name) = patched_name(&patch)? {
            self.tenants.ensure_name_free(name, Some(id)).await?;
        }

        let tenant = self.tenants.merged(id, patch).await?;
        self.tenants.replace(&tenant).await?;
        tracing::debug!(tenant_id = %id, "Updated tenant");
        Ok(tenant)
    }

    /// Delete the tenant node and everything under it: member mirrors, role
    /// assignments and metadata. User-side mirrors are left in place.
    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.tenants.delete(id).await
    }
}
