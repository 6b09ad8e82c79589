//! Repository for users.
//!
//! # Node Schema
//!
//! - `{root}/user/{uid}` → JSON `UserRecord` (password stored as a hash)
//! - `{root}/user/{uid}/tenant/{tid}` → membership marker, see
//!   [`MembershipIndex`](crate::membership::MembershipIndex)
//!
//! Names are unique across users. Uniqueness is checked by scanning the
//! collection, so two concurrent creates with the same name can both succeed.

use std::sync::Arc;

use keystone_identity_store::NodeStore;
use keystone_identity_types::{Attributes, Entity, User, UserRecord, Value, user::TENANTS_KEY};

use crate::{
    collection::{Collection, patched_name},
    error::RepositoryResult,
    node::NodeClient,
    password::PasswordHasher,
    paths::{self, Segment},
};

/// A stored user together with the tenants it belongs to. Carries the
/// password hash, so it never leaves the crate.
#[derive(Debug, Clone)]
pub(crate) struct UserAccount {
    pub record: UserRecord,
    pub tenant_ids: Vec<String>,
}

/// Repository for user entity operations.
pub struct UserRepository<S: NodeStore> {
    users: Collection<S, UserRecord>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<S: NodeStore> UserRepository<S> {
    pub fn new(client: NodeClient<S>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users: Collection::new(client, Segment::User), hasher }
    }

    /// Create a new user, hashing its password.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a user with the same id exists, `DuplicateName`
    /// if another user has the same name.
    pub async fn create(&self, mut record: UserRecord) -> RepositoryResult<User> {
        self.users.ensure_id_free(&record.id).await?;
        self.users.ensure_name_free(&record.name, None).await?;

        record.strip_reserved();
        record.attributes.shift_remove(TENANTS_KEY);
        if let Some(plain) = record.password.take() {
            record.password = Some(self.hasher.hash(&plain)?);
        }

        self.users.insert(&record).await?;
        tracing::debug!(user_id = %record.id, "Created user");
        Ok(User::from(record))
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.get(id).await?.map(User::from))
    }

    /// Unfiltered record plus derived tenant ids.
    pub(crate) async fn get_account(&self, id: &str) -> RepositoryResult<Option<UserAccount>> {
        let Some(record) = self.users.get(id).await? else {
            return Ok(None);
        };
        let tenant_ids = self.users.client().list(&paths::user::tenants(id)).await?;
        Ok(Some(UserAccount { record, tenant_ids }))
    }

    /// First user (in store order) named `name`. Scans all users.
    pub async fn get_by_name(&self, name: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users.find_by_name(name).await?.map(User::from))
    }

    pub async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.list().await?.into_iter().map(User::from).collect())
    }

    /// Resolve `ids` to users, skipping ids with no stored user.
    pub async fn resolve(&self, ids: &[String]) -> RepositoryResult<Vec<User>> {
        Ok(self.users.resolve(ids).await?.into_iter().map(User::from).collect())
    }

    /// Merge `patch` into the stored user. A `password` in the patch is
    /// re-hashed; a `name` is re-checked for uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user is stored under `id`.
    pub async fn update(&self, id: &str, mut patch: Attributes) -> RepositoryResult<User> {
        if let Some(name) = patched_name(&patch)? {
            self.users.ensure_name_free(name, Some(id)).await?;
        }

        patch.shift_remove(TENANTS_KEY);
        let hashed = match patch.get("password") {
            Some(Value::String(plain)) => Some(self.hasher.hash(plain)?),
            _ => None,
        };
        if let Some(hashed) = hashed {
            patch.insert("password".to_string(), Value::String(hashed));
        }

        let mut record = self.users.merged(id, patch).await?;
        record.attributes.shift_remove(TENANTS_KEY);
        self.users.replace(&record).await?;
        tracing::debug!(user_id = %id, "Updated user");
        Ok(User::from(record))
    }

    /// Delete the user node and its membership mirrors. Tenant-side mirrors and
    /// role assignments are left in place.
    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.users.delete(id).await
    }
}
