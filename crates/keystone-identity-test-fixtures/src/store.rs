//! In-memory identity stores for tests.

use std::sync::Arc;

use keystone_identity_repository::{Argon2Hasher, IdentityStore};
use keystone_identity_store::MemoryNodeStore;

/// A hasher at Argon2's minimum cost, so tests that create many users stay
/// fast.
pub fn fast_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::new(1, 8, 16).expect("minimum argon2 parameters are valid"))
}

/// An identity facade over a fresh in-memory store. The store handle is
/// returned too, for inspecting raw nodes or simulating a lost session.
pub fn memory_identity() -> (IdentityStore<MemoryNodeStore>, MemoryNodeStore) {
    let store = MemoryNodeStore::new();
    let identity = IdentityStore::builder().backend(store.clone()).hasher(fast_hasher()).build();
    (identity, store)
}
