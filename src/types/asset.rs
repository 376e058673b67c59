//! Asset record and asset type

use crate::error::{Error, Result};
use crate::helper::unix_timestamp;
use crate::ids::AssetId;
use crate::types::metadata::AssetMetadata;
use std::fmt;

/// Category of a stored asset
///
/// Four built-in categories plus an open escape hatch for caller-defined ones.
/// `name()` is the single canonical string form, used identically for
/// persistence and for directory naming; `from_name` is its inverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetType {
    Photo,
    Video,
    Document,
    Audio,
    /// Caller-defined category
    Custom(String),
}

impl AssetType {
    /// Canonical string form of this type
    pub fn name(&self) -> &str {
        match self {
            AssetType::Photo => "photo",
            AssetType::Video => "video",
            AssetType::Document => "document",
            AssetType::Audio => "audio",
            AssetType::Custom(name) => name,
        }
    }

    /// Parse a type from its canonical name
    ///
    /// Built-in names map back to the built-in variants, so a custom type can
    /// never shadow one. The empty string cannot name a type.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "" => Err(Error::InvalidAssetType(name.to_string())),
            "photo" => Ok(AssetType::Photo),
            "video" => Ok(AssetType::Video),
            "document" => Ok(AssetType::Document),
            "audio" => Ok(AssetType::Audio),
            other => Ok(AssetType::Custom(other.to_string())),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A stored asset's metadata record
///
/// The binary payload lives in a [`BlobStore`](crate::traits::BlobStore) under
/// the same id; this record is the authoritative existence signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Unique identifier, stable for the asset's lifetime
    pub id: AssetId,

    /// Category of the asset
    pub asset_type: AssetType,

    /// When the asset was created (unix timestamp ms), immutable
    pub created_at: i64,

    /// When the asset was last updated (unix timestamp ms); `None` until the
    /// first update
    pub modified_at: Option<i64>,

    /// Byte length of the associated blob, recomputed on every write
    pub file_size: i64,

    /// Arbitrary caller annotations
    pub metadata: Option<AssetMetadata>,
}

impl Asset {
    /// Create a new asset record stamped with the current time
    pub fn new(id: AssetId, asset_type: AssetType, file_size: i64) -> Self {
        Self {
            id,
            asset_type,
            created_at: unix_timestamp(),
            modified_at: None,
            file_size,
            metadata: None,
        }
    }

    /// Attach caller metadata
    pub fn with_metadata(mut self, metadata: AssetMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Override the creation timestamp (for loading and for deterministic tests)
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }
}
