//! Identity repositories over a hierarchical node store.
//!
//! This crate maps users, tenants, roles and their associations onto a
//! ZooKeeper-style tree of nodes. The store offers only node-level
//! get/list/create/set/delete, so uniqueness, bidirectional relations and the
//! metadata-to-role-assignment sync are all built here.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  IdentityStore                   │
//! │        (authentication, driver operations)       │
//! ├──────────────────────────────────────────────────┤
//! │                Repository Layer                  │
//! │  UserRepository  │ TenantRepository │ RoleRepo   │
//! │  MembershipIndex │ MetadataRepository            │
//! ├──────────────────────────────────────────────────┤
//! │        NodeClient + paths (namespace, JSON)      │
//! ├──────────────────────────────────────────────────┤
//! │           keystone-identity-store                │
//! │               NodeStore trait                    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Consistency
//!
//! Nothing here is transactional. Name checks race with concurrent creates,
//! membership mirrors are written one after the other, and deleting an entity
//! leaves relations pointing at it. Readers treat such dangling ids as absent.
//!
//! # Error Handling
//!
//! Every operation returns [`RepositoryResult<T>`]. A read that finds nothing
//! is `Ok(None)`; a store that cannot be reached is always an error.

#![deny(unsafe_code)]

pub mod collection;
pub mod error;
pub mod identity;
pub mod membership;
pub mod metadata;
pub mod node;
pub mod password;
pub mod paths;
pub mod role;
pub mod tenant;
pub mod user;

pub use error::{RepositoryError, RepositoryResult};
pub use identity::{AuthenticatedUser, IdentityStore};
pub use membership::MembershipIndex;
pub use metadata::MetadataRepository;
pub use node::NodeClient;
pub use password::{Argon2Hasher, PasswordHasher};
pub use paths::Namespace;
pub use role::RoleRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;
