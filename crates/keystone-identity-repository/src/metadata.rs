//! Per-membership metadata and its reconciliation with role assignments.
//!
//! - `{root}/tenant/{tid}/user/{uid}/metadata` → JSON `Metadata`
//!
//! The `roles` list inside the metadata is a denormalized copy of the role
//! assignment nodes. [`MetadataRepository::update`] makes the assignment
//! subtree match the list before writing the new value. Direct role
//! mutations through [`MembershipIndex`] do not touch the metadata, so the two
//! can drift until the next update.

use keystone_identity_store::NodeStore;
use keystone_identity_types::Metadata;

use crate::{
    error::{RepositoryError, RepositoryResult},
    membership::MembershipIndex,
    node::NodeClient,
    paths::tenant,
};

pub struct MetadataRepository<S: NodeStore> {
    client: NodeClient<S>,
    memberships: MembershipIndex<S>,
}

impl<S: NodeStore + Clone> MetadataRepository<S> {
    pub fn new(client: NodeClient<S>) -> Self {
        Self { memberships: MembershipIndex::new(client.clone()), client }
    }

    pub async fn get(&self, user_id: &str, tenant_id: &str) -> RepositoryResult<Option<Metadata>> {
        self.client.get(&tenant::metadata(tenant_id, user_id)).await
    }

    /// Write the first metadata value for the pair. Role assignments are not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if metadata already exists.
    pub async fn create(
        &self,
        user_id: &str,
        tenant_id: &str,
        metadata: &Metadata,
    ) -> RepositoryResult<Metadata> {
        self.client.create(&tenant::metadata(tenant_id, user_id), metadata).await?;
        tracing::debug!(tenant_id = %tenant_id, user_id = %user_id, "Created metadata");
        Ok(metadata.clone())
    }

    /// Replace the metadata for the pair and reconcile role assignments with
    /// its `roles` list. A missing `roles` list means no roles.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the pair has no metadata and `Validation` if any
    /// listed role id cannot name a node. Both are raised before any role
    /// assignment is touched.
    pub async fn update(
        &self,
        user_id: &str,
        tenant_id: &str,
        metadata: &Metadata,
    ) -> RepositoryResult<Metadata> {
        let path = tenant::metadata(tenant_id, user_id);
        if !self.client.holds_value(&path).await? {
            return Err(RepositoryError::NotFound(format!(
                "metadata for user '{}' in tenant '{}'",
                user_id, tenant_id
            )));
        }

        let desired = metadata.role_ids();
        for role_id in &desired {
            self.client.namespace().path(&tenant::role(tenant_id, user_id, role_id))?;
        }
        let current = self.memberships.roles_for(user_id, tenant_id).await?;

        for role_id in desired.iter().filter(|r| !current.iter().any(|c| c.as_str() == **r)) {
            match self.memberships.add_role(user_id, tenant_id, role_id).await {
                Ok(()) => {},
                Err(RepositoryError::Conflict(_)) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        user_id = %user_id,
                        role_id = %role_id,
                        "Role assigned concurrently during reconciliation"
                    );
                },
                Err(e) => return Err(e),
            }
        }

        for role_id in current.iter().filter(|c| !desired.contains(&c.as_str())) {
            self.memberships.remove_role(user_id, tenant_id, role_id).await?;
        }

        self.client.set(&path, metadata).await?;
        tracing::debug!(
            tenant_id = %tenant_id,
            user_id = %user_id,
            roles = desired.len(),
            "Updated metadata"
        );
        Ok(metadata.clone())
    }

    /// Delete the metadata node. Missing metadata is not an error and role
    /// assignments are kept.
    pub async fn delete(&self, user_id: &str, tenant_id: &str) -> RepositoryResult<()> {
        self.client.delete(&tenant::metadata(tenant_id, user_id)).await
    }
}
