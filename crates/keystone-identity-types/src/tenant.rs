//! Tenant type
//!
//! A tenant (organization) that users are members of.

use serde::{Deserialize, Serialize};

use crate::{Attributes, Entity};

/// A tenant. Its `name` is unique across all tenants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
#[builder(on(String, into))]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    #[builder(default)]
    pub attributes: Attributes,
}

impl Entity for Tenant {
    const KIND: &'static str = "tenant";

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
