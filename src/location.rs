//! Standard storage locations
//!
//! Maps the small set of conventional base locations to concrete platform
//! directories. Resolution is best-effort: a location that cannot be
//! determined on this platform yields `None`, and callers pick their own
//! fallback or pass an explicit root instead.

use std::path::PathBuf;

/// A conventional base location for asset storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// User documents directory
    Documents,
    /// User cache directory
    Caches,
    /// Application data/support directory
    ApplicationSupport,
    /// System temporary directory
    Temporary,
    /// A named shared location under the application data directory
    SharedGroup(String),
}

impl StorageLocation {
    /// Resolve to a concrete platform directory
    pub fn resolve(&self) -> Option<PathBuf> {
        match self {
            StorageLocation::Documents => dirs::document_dir(),
            StorageLocation::Caches => dirs::cache_dir(),
            StorageLocation::ApplicationSupport => dirs::data_dir(),
            StorageLocation::Temporary => Some(std::env::temp_dir()),
            StorageLocation::SharedGroup(group) => dirs::data_dir().map(|dir| dir.join(group)),
        }
    }
}
