//! Generic storage for one kind of entity.
//!
//! Every entity kind lives under `{root}/{kind}/{id}`. [`Collection`] holds
//! the shared mechanics: existence checks, resolving listings, the linear
//! name scan used for uniqueness, and merge-style partial updates.

use std::marker::PhantomData;

use keystone_identity_store::NodeStore;
use keystone_identity_types::{Attributes, Entity, Value};

use crate::{
    error::{RepositoryError, RepositoryResult},
    node::NodeClient,
    paths::Segment,
};

#[derive(Clone)]
pub struct Collection<S: NodeStore, T: Entity> {
    client: NodeClient<S>,
    kind: Segment<'static>,
    _entity: PhantomData<fn() -> T>,
}

impl<S: NodeStore, T: Entity> Collection<S, T> {
    pub fn new(client: NodeClient<S>, kind: Segment<'static>) -> Self {
        Self { client, kind, _entity: PhantomData }
    }

    pub fn client(&self) -> &NodeClient<S> {
        &self.client
    }

    fn by_id<'a>(&self, id: &'a str) -> [Segment<'a>; 2] {
        [self.kind, Segment::Id(id)]
    }

    pub async fn get(&self, id: &str) -> RepositoryResult<Option<T>> {
        self.client.get(&self.by_id(id)).await
    }

    /// Whether an entity (not just a placeholder) is stored under `id`.
    pub async fn exists(&self, id: &str) -> RepositoryResult<bool> {
        self.client.holds_value(&self.by_id(id)).await
    }

    /// Ids of every child node, including placeholders and dangling ids.
    pub async fn ids(&self) -> RepositoryResult<Vec<String>> {
        self.client.list(&[self.kind]).await
    }

    /// All stored entities in store order.
    pub async fn list(&self) -> RepositoryResult<Vec<T>> {
        self.resolve(self.ids().await?).await
    }

    /// Fetch each id in order, skipping the ones that hold no entity.
    pub async fn resolve<I>(&self, ids: I) -> RepositoryResult<Vec<T>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut out = Vec::new();
        for id in ids {
            if let Some(entity) = self.get(id.as_ref()).await? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// First entity in store order whose name equals `name`. Scans the whole
    /// collection.
    pub async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<T>> {
        let ids = self.ids().await?;
        tracing::debug!(kind = T::KIND, candidates = ids.len(), "Scanning for name");
        for id in ids {
            if let Some(entity) = self.get(&id).await? {
                if entity.name() == name {
                    return Ok(Some(entity));
                }
            }
        }
        Ok(None)
    }

    /// Fail with `DuplicateName` if another entity already uses `name`.
    /// An entity with id `owner` may keep its own name.
    pub async fn ensure_name_free(&self, name: &str, owner: Option<&str>) -> RepositoryResult<()> {
        match self.find_by_name(name).await? {
            Some(existing) if Some(existing.id()) != owner => Err(RepositoryError::DuplicateName(
                format!("{} name '{}' is used by '{}'", T::KIND, name, existing.id()),
            )),
            _ => Ok(()),
        }
    }

    /// Fail with `DuplicateId` if an entity is stored under `id`.
    pub async fn ensure_id_free(&self, id: &str) -> RepositoryResult<()> {
        if self.exists(id).await? {
            return Err(RepositoryError::DuplicateId(format!("{} '{}' already exists", T::KIND, id)));
        }
        Ok(())
    }

    /// Persist a new entity. An id that already holds an entity is
    /// `DuplicateId`. An id left as a placeholder is filled without a
    /// version check, so concurrent creates over it can both succeed.
    ///
    /// See [`NodeClient::create`].
    pub async fn insert(&self, entity: &T) -> RepositoryResult<()> {
        match self.client.create(&self.by_id(entity.id()), entity).await {
            Err(RepositoryError::Conflict(_)) => Err(RepositoryError::DuplicateId(format!(
                "{} '{}' already exists",
                T::KIND,
                entity.id()
            ))),
            other => other,
        }
    }

    /// Overwrite an existing entity.
    pub async fn replace(&self, entity: &T) -> RepositoryResult<()> {
        self.client.set(&self.by_id(entity.id()), entity).await
    }

    /// Overlay `patch` on the stored record of `id` and return the merged
    /// entity without persisting it. `id` always wins over a patched `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored under `id`; `Validation` if the merged
    /// record no longer has the entity's shape.
    pub async fn merged(&self, id: &str, patch: Attributes) -> RepositoryResult<T> {
        let mut base: Attributes = self
            .client
            .get(&self.by_id(id))
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{} '{}'", T::KIND, id)))?;

        for (key, value) in patch {
            base.insert(key, value);
        }
        base.insert("id".to_string(), Value::String(id.to_string()));

        let mut entity: T = serde_json::from_value(Value::Object(base))
            .map_err(|e| RepositoryError::Validation(format!("{} '{}': {}", T::KIND, id, e)))?;
        entity.strip_reserved();
        Ok(entity)
    }

    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.client.delete(&self.by_id(id)).await
    }
}

/// The `name` a patch would set, if any.
pub(crate) fn patched_name(patch: &Attributes) -> RepositoryResult<Option<&str>> {
    match patch.get("name") {
        None => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(other) => Err(RepositoryError::Validation(format!("name must be a string, got {}", other))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use keystone_identity_store::MemoryNodeStore;
    use keystone_identity_types::Tenant;
    use serde_json::json;

    use super::*;
    use crate::paths::Namespace;

    fn tenants() -> Collection<MemoryNodeStore, Tenant> {
        Collection::new(NodeClient::new(MemoryNodeStore::new(), Namespace::default()), Segment::Tenant)
    }

    fn tenant(id: &str, name: &str) -> Tenant {
        Tenant::builder().id(id).name(name).build()
    }

    fn patch(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[tokio::test]
    async fn test_find_by_name_skips_placeholders() {
        let tenants = tenants();
        tenants
            .client()
            .create(&crate::paths::tenant::user("ghost", "u1"), &())
            .await
            .unwrap();
        tenants.insert(&tenant("abc", "accounting")).await.unwrap();

        let found = tenants.find_by_name("accounting").await.unwrap().unwrap();
        assert_eq!(found.id, "abc");
        assert!(tenants.find_by_name("nobody").await.unwrap().is_none());
        assert_eq!(tenants.ids().await.unwrap(), vec!["abc", "ghost"]);
        assert_eq!(tenants.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_name_free_allows_owner() {
        let tenants = tenants();
        tenants.insert(&tenant("abc", "accounting")).await.unwrap();

        tenants.ensure_name_free("accounting", Some("abc")).await.unwrap();
        let err = tenants.ensure_name_free("accounting", Some("xyz")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateName(_)));
        let err = tenants.ensure_name_free("accounting", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_insert_twice_is_duplicate_id() {
        let tenants = tenants();
        tenants.insert(&tenant("abc", "accounting")).await.unwrap();

        let err = tenants.insert(&tenant("abc", "other")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateId(_)));
    }

    #[tokio::test]
    async fn test_insert_fills_placeholder_once() {
        let tenants = tenants();
        tenants.client().create(&crate::paths::tenant::user("abc", "u1"), &()).await.unwrap();
        assert!(!tenants.exists("abc").await.unwrap());

        tenants.insert(&tenant("abc", "accounting")).await.unwrap();
        assert_eq!(tenants.get("abc").await.unwrap().unwrap().name, "accounting");

        let err = tenants.insert(&tenant("abc", "other")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateId(_)));
        assert_eq!(tenants.get("abc").await.unwrap().unwrap().name, "accounting");
    }

    #[tokio::test]
    async fn test_merged_overlays_patch_and_forces_id() {
        let tenants = tenants();
        let mut original = tenant("abc", "accounting");
        original.attributes.insert("enabled".into(), json!(true));
        original.attributes.insert("region".into(), json!("eu"));
        tenants.insert(&original).await.unwrap();

        let merged = tenants
            .merged("abc", patch(json!({"id": "evil", "enabled": false, "tier": 2})))
            .await
            .unwrap();

        assert_eq!(merged.id, "abc");
        assert_eq!(merged.name, "accounting");
        assert_eq!(merged.attributes["enabled"], json!(false));
        assert_eq!(merged.attributes["region"], json!("eu"));
        assert_eq!(merged.attributes["tier"], json!(2));
        assert!(!merged.attributes.contains_key("id"));
    }

    #[tokio::test]
    async fn test_merged_absent_base_is_not_found() {
        let err = tenants().merged("abc", Attributes::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_merged_rejects_shape_breaking_patch() {
        let tenants = tenants();
        tenants.insert(&tenant("abc", "accounting")).await.unwrap();

        let err = tenants.merged("abc", patch(json!({"name": 5}))).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[test]
    fn test_patched_name() {
        assert_eq!(patched_name(&patch(json!({"x": 1}))).unwrap(), None);
        assert_eq!(patched_name(&patch(json!({"name": "a"}))).unwrap(), Some("a"));
        assert!(patched_name(&patch(json!({"name": null}))).is_err());
    }
}
