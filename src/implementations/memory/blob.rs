//! In-memory BlobStore implementation

use crate::error::{Error, Result};
use crate::ids::AssetId;
use crate::traits::BlobStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory blob store for testing
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, data: &[u8], id: &AssetId) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap();
        blobs.insert(id.as_str().to_string(), data.to_vec());
        Ok(())
    }

    async fn read(&self, id: &AssetId) -> Result<Vec<u8>> {
        let blobs = self.blobs.lock().unwrap();
        blobs
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| Error::DataNotFound(id.clone()))
    }

    async fn delete(&self, id: &AssetId) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap();
        match blobs.remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(Error::DataNotFound(id.clone())),
        }
    }

    async fn exists(&self, id: &AssetId) -> bool {
        self.blobs.lock().unwrap().contains_key(id.as_str())
    }

    async fn delete_all(&self) -> Result<()> {
        self.blobs.lock().unwrap().clear();
        Ok(())
    }
}
