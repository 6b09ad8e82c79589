//! # Keystone Identity Types
//!
//! Entity and value types shared by the identity repository, its composing
//! service and the test fixtures.
//!
//! Every entity carries a caller-supplied string `id`, a `name`, and an
//! open-ended bag of extra [`Attributes`] that is stored and returned
//! verbatim. The bag is an insertion-ordered JSON map, so callers see their
//! fields back in the order they wrote them.

#![deny(unsafe_code)]

use serde::{Serialize, de::DeserializeOwned};

pub mod metadata;
pub mod role;
pub mod tenant;
pub mod user;

pub use metadata::Metadata;
pub use role::Role;
pub use tenant::Tenant;
pub use user::{User, UserRecord};

/// Dynamic value bag attached to entities and metadata.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Re-export of the value type held in [`Attributes`].
pub use serde_json::Value;

/// An identity entity addressed by id and stored as one node.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Collection name, also used as the path segment for the collection.
    const KIND: &'static str;

    /// Field names owned by the typed struct. They never live in the
    /// attribute bag.
    const RESERVED_KEYS: &'static [&'static str] = &["id", "name"];

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Mutable access to the extra attribute bag.
    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Drop attribute entries that collide with typed fields.
    fn strip_reserved(&mut self) {
        let attributes = self.attributes_mut();
        for key in Self::RESERVED_KEYS {
            attributes.shift_remove(*key);
        }
    }
}
