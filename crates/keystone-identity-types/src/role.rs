//! Role type

use serde::{Deserialize, Serialize};

use crate::{Attributes, Entity};

/// A role that can be granted to a user within a tenant.
///
/// Role names are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
#[builder(on(String, into))]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    #[builder(default)]
    pub attributes: Attributes,
}

impl Entity for Role {
    const KIND: &'static str = "role";

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
