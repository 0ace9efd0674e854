//! # HTTP Cache
//!
//! This crate provides a time-bounded store for raw HTTP responses, keyed by request signature.
//! Entries persist on disk between runs so repeated invocations do not hit the remote API again
//! until the entries expire.

/// Cache trait, stored response type and errors.
pub mod types;
pub use types::*;

/// Sqlite-backed cache that persists between runs.
pub mod sqlite;
pub use sqlite::SqliteCache;

/// In-process cache with the same expiry semantics.
pub mod memory;
pub use memory::MemoryCache;
