//! Observability for the keystone identity service.
//!
//! Library crates only emit `tracing` events. This crate installs the
//! subscriber and provides span helpers for the service layer.

#![deny(unsafe_code)]

pub mod logging;

pub use logging::{LogConfig, LogFormat, init_logging};
