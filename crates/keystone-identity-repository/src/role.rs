//! Repository for roles.
//!
//! - `{root}/role/{rid}` → JSON `Role`
//!
//! Role names are not checked for uniqueness.

use keystone_identity_store::NodeStore;
use keystone_identity_types::{Attributes, Entity, Role};

use crate::{collection::Collection, error::RepositoryResult, node::NodeClient, paths::Segment};

pub struct RoleRepository<S: NodeStore> {
    roles: Collection<S, Role>,
}

impl<S: NodeStore> RoleRepository<S> {
    pub fn new(client: NodeClient<S>) -> Self {
        Self { roles: Collection::new(client, Segment::Role) }
    }

    /// Create a new role.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a role with the same id exists.
    pub async fn create(&self, mut role: Role) -> RepositoryResult<Role> {
        self.roles.ensure_id_free(&role.id).await?;

        role.strip_reserved();
        self.roles.insert(&role).await?;
        tracing::debug!(role_id = %role.id, "Created role");
        Ok(role)
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Option<Role>> {
        self.roles.get(id).await
    }

    /// First role (in store order) named `name`. Names may repeat, so later
    /// roles with the same name are not reachable here.
    pub async fn get_by_name(&self, name: &str) -> RepositoryResult<Option<Role>> {
        self.roles.find_by_name(name).await
    }

    pub async fn list(&self) -> RepositoryResult<Vec<Role>> {
        self.roles.list().await
    }

    /// Merge `patch` into the stored role. `NotFound` if there is none.
    pub async fn update(&self, id: &str, patch: Attributes) -> RepositoryResult<Role> {
        let role = self.roles.merged(id, patch).await?;
        self.roles.replace(&role).await?;
        tracing::debug!(role_id = %id, "Updated role");
        Ok(role)
    }

    /// Delete the role node. Assignments referencing it are left in place.
    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.roles.delete(id).await
    }
}
