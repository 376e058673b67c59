//! Storage implementations
//!
//! Concrete implementations of the storage traits:
//!
//! - `fs/` - filesystem blob storage at md5-sharded paths
//! - `memory/` - in-memory stores for testing and composition
//! - `sqlite/` - SQLite metadata storage (requires the `sqlite` feature)

pub mod fs;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;
