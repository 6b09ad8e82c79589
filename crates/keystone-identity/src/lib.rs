//! # Keystone Identity
//!
//! Composes the identity layer from configuration: the store handle is built
//! once by [`IdentityService`], owned by it, and handed to the
//! [`IdentityStore`] facade. Nothing connects lazily.
//!
//! ```no_run
//! use keystone_identity::IdentityService;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let service = IdentityService::bootstrap("config/identity.yaml")?;
//! service.connect().await?;
//! let users = service.identity().list_users().await?;
//! service.disconnect().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod service;

pub use keystone_identity_config::Config;
pub use keystone_identity_repository::{
    AuthenticatedUser, IdentityStore, RepositoryError, RepositoryResult,
};
pub use keystone_identity_types::{Attributes, Metadata, Role, Tenant, User, UserRecord};
pub use service::{IdentityService, SharedIdentityStore};
