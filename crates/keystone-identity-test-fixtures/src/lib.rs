//! Test fixtures for the keystone identity crates
//!
//! Shared entity builders, ready-made in-memory identity stores, and the
//! proptest configuration used by every property test in the workspace.

#![deny(unsafe_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod entities;
pub mod proptest_config;
pub mod store;

pub use entities::{patch, test_role, test_tenant, test_user};
pub use store::{fast_hasher, memory_identity};
