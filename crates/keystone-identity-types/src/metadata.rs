//! Per-(user, tenant) metadata
//!
//! Metadata is a free-form bag with one well-known field, `roles`, which
//! mirrors the role assignments of the pair. Everything else is preserved
//! verbatim.

use serde::{Deserialize, Serialize};

use crate::Attributes;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Role ids granted to the user within the tenant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Metadata {
    /// Empty metadata without a `roles` field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata carrying exactly the given roles.
    pub fn with_roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self { roles: Some(roles.into_iter().map(Into::into).collect()), attributes: Attributes::new() }
    }

    /// The role ids listed, first occurrence wins, duplicates dropped.
    /// A missing `roles` field yields an empty list.
    pub fn role_ids(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for role in self.roles.iter().flatten() {
            if !out.contains(&role.as_str()) {
                out.push(role);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_none() && self.attributes.is_empty()
    }
}
