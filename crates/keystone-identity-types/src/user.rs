//! User types
//!
//! [`UserRecord`] is what gets written to the store and carries the password
//! (plaintext on the way in, a hash once stored). [`User`] is the public view
//! handed to callers; it can never carry a password.

use serde::{Deserialize, Serialize};

use crate::{Attributes, Entity};

/// Key of the convenience field listing a user's tenants. Stripped from every
/// public view.
pub const TENANTS_KEY: &str = "tenants";

/// A user as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
#[builder(on(String, into))]
pub struct UserRecord {
    pub id: String,

    /// Unique across all users, case-sensitive.
    pub name: String,

    /// Plaintext on input to `create`/`update`, a hash once stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(flatten)]
    #[builder(default)]
    pub attributes: Attributes,
}

impl Entity for UserRecord {
    const KIND: &'static str = "user";
    const RESERVED_KEYS: &'static [&'static str] = &["id", "name", "password"];

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

/// Public view of a user: no password, no derived tenant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let mut attributes = record.attributes;
        attributes.shift_remove("password");
        attributes.shift_remove(TENANTS_KEY);
        Self { id: record.id, name: record.name, attributes }
    }
}
