//! Error types for asset storage
//!
//! Every public operation surfaces one of the kinds below; storage-layer causes
//! (filesystem, database, serialization) are preserved as error sources rather
//! than flattened into strings.

use crate::ids::AssetId;
use thiserror::Error;

/// Boxed originating cause for storage failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Asset storage error type
#[derive(Error, Debug)]
pub enum Error {
    /// An asset with this id is already present in the metadata store
    #[error("asset already exists: {0}")]
    AlreadyExists(AssetId),

    /// No asset record with this id exists
    #[error("asset not found: {0}")]
    NotFound(AssetId),

    /// The asset record exists but its blob is missing, or a blob operation
    /// targeted an id with no stored bytes
    #[error("asset data not found: {0}")]
    DataNotFound(AssetId),

    /// An asset URL did not match the `nest-asset` scheme
    #[error("invalid asset url: {0}")]
    InvalidAssetUrl(String),

    /// Bytes handed to the image convenience API are not a known image format
    #[error("invalid image format")]
    InvalidImageFormat,

    /// An asset type name that cannot name a type (currently: the empty string)
    #[error("invalid asset type: {0:?}")]
    InvalidAssetType(String),

    /// Metadata could not be converted to or from its persisted JSON form
    #[error("unable to convert asset data: {0}")]
    UnableToConvertData(#[from] serde_json::Error),

    /// A blob or metadata write failed
    #[error("write failed: {0}")]
    WriteFailed(#[source] Cause),

    /// A blob or metadata read failed
    #[error("read failed: {0}")]
    ReadFailed(#[source] Cause),

    /// A blob or metadata delete failed
    #[error("delete failed: {0}")]
    DeleteFailed(#[source] Cause),

    /// Anything that does not fit the taxonomy above
    #[error("unknown storage error: {0}")]
    Unknown(String),
}

impl Error {
    pub(crate) fn write(cause: impl Into<Cause>) -> Self {
        Error::WriteFailed(cause.into())
    }

    pub(crate) fn read(cause: impl Into<Cause>) -> Self {
        Error::ReadFailed(cause.into())
    }

    pub(crate) fn delete(cause: impl Into<Cause>) -> Self {
        Error::DeleteFailed(cause.into())
    }
}

/// Result type for asset storage operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
