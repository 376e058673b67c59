//! Filesystem blob storage
//!
//! Blobs are stored under a two-level md5-sharded directory layout derived
//! from the asset id (see [`crate::shard`]). Writes go to a temp file in the
//! destination shard and are renamed into place, so a concurrent reader never
//! observes a partially-written blob; writes are additionally serialized
//! behind a store-wide lock. Deletes may leave empty shard directories behind;
//! those are not reaped.

use crate::error::{Error, Result};
use crate::ids::AssetId;
use crate::shard::shard_relative_path;
use crate::traits::BlobStore;
use crate::types::AssetType;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Blob storage on the local filesystem
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    partition: Option<AssetType>,
    write_lock: Mutex<()>,
}

impl FsBlobStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            partition: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store whose shard paths carry a fixed type folder prefix
    ///
    /// Only useful when every asset in this store shares one immutable type;
    /// the default store derives paths from the id alone, since an asset's
    /// type can change on update while its path must not.
    pub fn partitioned(root: impl Into<PathBuf>, asset_type: AssetType) -> Self {
        Self {
            root: root.into(),
            partition: Some(asset_type),
            write_lock: Mutex::new(()),
        }
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the filesystem path for an asset's blob
    pub fn path_for(&self, id: &AssetId) -> PathBuf {
        self.root
            .join(shard_relative_path(id.as_str(), self.partition.as_ref()))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, data: &[u8], id: &AssetId) -> Result<()> {
        let path = self.path_for(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(Error::write)?;
        }

        let _guard = self.write_lock.lock().await;

        // Write to a temp file in the destination shard, then rename into place
        let temp_path = path.with_file_name(format!("{id}.tmp"));
        let mut file = fs::File::create(&temp_path).await.map_err(Error::write)?;
        file.write_all(data).await.map_err(Error::write)?;
        file.sync_all().await.map_err(Error::write)?;
        fs::rename(&temp_path, &path).await.map_err(Error::write)?;

        Ok(())
    }

    async fn read(&self, id: &AssetId) -> Result<Vec<u8>> {
        let path = self.path_for(id);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::DataNotFound(id.clone()))
            }
            Err(err) => Err(Error::read(err)),
        }
    }

    async fn delete(&self, id: &AssetId) -> Result<()> {
        let path = self.path_for(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::DataNotFound(id.clone()))
            }
            Err(err) => Err(Error::delete(err)),
        }
    }

    async fn exists(&self, id: &AssetId) -> bool {
        fs::try_exists(self.path_for(id)).await.unwrap_or(false)
    }

    async fn delete_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            // An absent root means there is nothing to remove
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::delete(err)),
        }
    }
}
