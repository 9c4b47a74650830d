//! Versioned configuration store served over HTTP.
//!
//! Every create, update and rollback appends an immutable version to a
//! per-name history and advances the configuration's current version in the
//! same SQLite transaction.

pub mod config;
pub mod http;
pub mod service;
pub mod storage;
