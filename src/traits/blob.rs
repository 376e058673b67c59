//! BlobStore trait for id-addressed binary storage

use crate::error::Result;
use crate::ids::AssetId;
use async_trait::async_trait;

/// Id-addressed blob storage trait
///
/// Blobs live at deterministic paths derived from their asset id; the store
/// owns directory creation and cleanup. The metadata store, not the blob
/// store, is the authority on asset existence.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write blob data for an asset id
    ///
    /// Creates parent directories as needed and overwrites any existing blob.
    /// A concurrent reader never observes a partially-written file.
    async fn write(&self, data: &[u8], id: &AssetId) -> Result<()>;

    /// Read the exact bytes previously written for an id
    ///
    /// Fails with [`Error::DataNotFound`](crate::Error::DataNotFound) when no
    /// blob exists.
    async fn read(&self, id: &AssetId) -> Result<Vec<u8>>;

    /// Delete the blob for an id
    ///
    /// Deleting an absent blob fails with
    /// [`Error::DataNotFound`](crate::Error::DataNotFound); the coordinator is
    /// the one place that recovers from it.
    async fn delete(&self, id: &AssetId) -> Result<()>;

    /// Check whether a blob exists; never errors
    async fn exists(&self, id: &AssetId) -> bool;

    /// Remove the entire storage root, shard directories included; idempotent
    async fn delete_all(&self) -> Result<()>;
}
