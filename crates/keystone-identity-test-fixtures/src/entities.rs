//! Entity builders with predictable defaults.

use keystone_identity_types::{Attributes, Role, Tenant, UserRecord, Value};

/// A user whose password is `"{name}-password"`.
pub fn test_user(id: &str, name: &str) -> UserRecord {
    UserRecord::builder().id(id).name(name).password(format!("{}-password", name)).build()
}

pub fn test_tenant(id: &str, name: &str) -> Tenant {
    Tenant::builder().id(id).name(name).build()
}

pub fn test_role(id: &str) -> Role {
    Role::builder().id(id).name(id).build()
}

/// Turn a JSON object literal into an update patch.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn patch(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("patch must be a JSON object, got {}", other),
    }
}
