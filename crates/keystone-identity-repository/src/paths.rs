//! Node path encoding for identity storage.
//!
//! Paths are built from typed segments and rooted at a [`Namespace`]
//! (`/keystone` by default):
//!
//! - `{root}/user/{uid}` - User by id
//! - `{root}/user/{uid}/tenant/{tid}` - Membership, user side
//! - `{root}/tenant/{tid}` - Tenant by id
//! - `{root}/tenant/{tid}/user/{uid}` - Membership, tenant side
//! - `{root}/tenant/{tid}/user/{uid}/role/{rid}` - Role assignment
//! - `{root}/tenant/{tid}/user/{uid}/metadata` - Metadata for the pair
//! - `{root}/role/{rid}` - Role by id
//!
//! Ids are opaque, but an id that is empty, contains `/`, or is `.`/`..` would
//! change the shape of the tree and is rejected.

use crate::error::{RepositoryError, RepositoryResult};

/// Default namespace root node name.
pub const DEFAULT_NAMESPACE: &str = "keystone";

/// One component of a node path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    User,
    Tenant,
    Role,
    Metadata,
    Id(&'a str),
}

impl<'a> Segment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::User => "user",
            Segment::Tenant => "tenant",
            Segment::Role => "role",
            Segment::Metadata => "metadata",
            Segment::Id(id) => *id,
        }
    }
}

fn validate_component(component: &str) -> RepositoryResult<()> {
    if component.is_empty() {
        return Err(RepositoryError::Validation("path component must not be empty".to_string()));
    }
    if component.contains('/') {
        return Err(RepositoryError::Validation(format!(
            "path component '{}' must not contain '/'",
            component
        )));
    }
    if component == "." || component == ".." {
        return Err(RepositoryError::Validation(format!(
            "path component '{}' is reserved",
            component
        )));
    }
    Ok(())
}

/// The root under which all identity nodes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    root: String,
}

impl Namespace {
    /// Create a namespace from a root such as `keystone` or `/apps/keystone`.
    pub fn new(root: &str) -> RepositoryResult<Self> {
        let trimmed = root.strip_prefix('/').unwrap_or(root);
        for component in trimmed.split('/') {
            validate_component(component)?;
        }
        Ok(Self { root: format!("/{}", trimmed) })
    }

    /// Absolute path of the namespace root node.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Join segments under the namespace root.
    pub fn path(&self, segments: &[Segment<'_>]) -> RepositoryResult<String> {
        if segments.is_empty() {
            return Err(RepositoryError::Validation("empty path segment list".to_string()));
        }
        let mut out = String::with_capacity(self.root.len() + segments.len() * 12);
        out.push_str(&self.root);
        for segment in segments {
            let part = segment.as_str();
            validate_component(part)?;
            out.push('/');
            out.push_str(part);
        }
        Ok(out)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self { root: format!("/{}", DEFAULT_NAMESPACE) }
    }
}

/// Segment lists for user nodes.
pub mod user {
    use super::Segment;

    /// `user`
    #[inline]
    pub fn collection() -> [Segment<'static>; 1] {
        [Segment::User]
    }

    /// `user/{uid}`
    #[inline]
    pub fn by_id(user_id: &str) -> [Segment<'_>; 2] {
        [Segment::User, Segment::Id(user_id)]
    }

    /// `user/{uid}/tenant`
    #[inline]
    pub fn tenants(user_id: &str) -> [Segment<'_>; 3] {
        [Segment::User, Segment::Id(user_id), Segment::Tenant]
    }

    /// `user/{uid}/tenant/{tid}`
    #[inline]
    pub fn tenant<'a>(user_id: &'a str, tenant_id: &'a str) -> [Segment<'a>; 4] {
        [Segment::User, Segment::Id(user_id), Segment::Tenant, Segment::Id(tenant_id)]
    }
}

/// Segment lists for tenant nodes and everything hanging off a membership.
pub mod tenant {
    use super::Segment;

    /// `tenant`
    #[inline]
    pub fn collection() -> [Segment<'static>; 1] {
        [Segment::Tenant]
    }

    /// `tenant/{tid}`
    #[inline]
    pub fn by_id(tenant_id: &str) -> [Segment<'_>; 2] {
        [Segment::Tenant, Segment::Id(tenant_id)]
    }

    /// `tenant/{tid}/user`
    #[inline]
    pub fn users(tenant_id: &str) -> [Segment<'_>; 3] {
        [Segment::Tenant, Segment::Id(tenant_id), Segment::User]
    }

    /// `tenant/{tid}/user/{uid}`
    #[inline]
    pub fn user<'a>(tenant_id: &'a str, user_id: &'a str) -> [Segment<'a>; 4] {
        [Segment::Tenant, Segment::Id(tenant_id), Segment::User, Segment::Id(user_id)]
    }

    /// `tenant/{tid}/user/{uid}/role`
    #[inline]
    pub fn roles<'a>(tenant_id: &'a str, user_id: &'a str) -> [Segment<'a>; 5] {
        [Segment::Tenant, Segment::Id(tenant_id), Segment::User, Segment::Id(user_id), Segment::Role]
    }

    /// `tenant/{tid}/user/{uid}/role/{rid}`
    #[inline]
    pub fn role<'a>(tenant_id: &'a str, user_id: &'a str, role_id: &'a str) -> [Segment<'a>; 6] {
        [
            Segment::Tenant,
            Segment::Id(tenant_id),
            Segment::User,
            Segment::Id(user_id),
            Segment::Role,
            Segment::Id(role_id),
        ]
    }

    /// `tenant/{tid}/user/{uid}/metadata`
    #[inline]
    pub fn metadata<'a>(tenant_id: &'a str, user_id: &'a str) -> [Segment<'a>; 5] {
        [
            Segment::Tenant,
            Segment::Id(tenant_id),
            Segment::User,
            Segment::Id(user_id),
            Segment::Metadata,
        ]
    }
}

/// Segment lists for role nodes.
pub mod role {
    use super::Segment;

    /// `role`
    #[inline]
    pub fn collection() -> [Segment<'static>; 1] {
        [Segment::Role]
    }

    /// `role/{rid}`
    #[inline]
    pub fn by_id(role_id: &str) -> [Segment<'_>; 2] {
        [Segment::Role, Segment::Id(role_id)]
    }
}
