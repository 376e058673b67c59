//! Asset coordinator - orchestrates the blob and metadata stores
//!
//! The coordinator implements create/update/delete/fetch of assets as a whole
//! and fixes the ordering of the two-store steps, since there is no shared
//! transaction between the filesystem and the database:
//!
//! - Create and update write the blob **before** the metadata record. A failed
//!   blob write aborts cleanly; a failed metadata write after a successful blob
//!   write leaves an orphan blob behind (invisible to every read path, logged,
//!   not reaped).
//! - Delete attempts the blob first, swallows only "blob already absent", and
//!   then removes the metadata record; the metadata store is the authority on
//!   asset existence.
//!
//! The window between the two steps is an accepted trade-off; tests assert the
//! ordering, not atomicity.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::helper::unix_timestamp;
use crate::ids::AssetId;
use crate::media;
use crate::notify::StoreChange;
use crate::traits::{BlobStore, MetadataStore, StorageTypes};
use crate::types::{Asset, AssetIdentifier, AssetMetadata, AssetType, QueryFilter};

/// Coordinates the blob store and the metadata store.
///
/// Generic over `S: StorageTypes` which bundles the storage type associations.
pub struct AssetCoordinator<S: StorageTypes> {
    blob_store: Arc<S::Blob>,
    metadata_store: Arc<S::Metadata>,
}

impl<S: StorageTypes> AssetCoordinator<S> {
    /// Create a coordinator from store instances
    ///
    /// Custom instances are fully independent; build a fresh pair per test
    /// instead of sharing global state.
    pub fn new(blob_store: Arc<S::Blob>, metadata_store: Arc<S::Metadata>) -> Self {
        Self {
            blob_store,
            metadata_store,
        }
    }

    /// Store new binary data as an asset
    ///
    /// Generates the id, stamps the creation time and records the byte length;
    /// the blob is written before the metadata record.
    pub async fn create_asset(
        &self,
        data: &[u8],
        asset_type: AssetType,
        metadata: Option<AssetMetadata>,
    ) -> Result<Asset> {
        let mut asset = Asset::new(AssetId::new(), asset_type, data.len() as i64);
        asset.metadata = metadata;

        self.blob_store.write(data, &asset.id).await?;
        if let Err(err) = self.metadata_store.add(&asset).await {
            tracing::warn!(
                "metadata add failed after blob write, orphan blob {}: {}",
                asset.id,
                err
            );
            return Err(err);
        }

        tracing::debug!("created asset {} ({} bytes)", asset.id, asset.file_size);
        Ok(asset)
    }

    /// Store new image data as a photo asset
    ///
    /// Convenience over [`create_asset`](Self::create_asset) that rejects bytes
    /// which are not a recognizable image format.
    pub async fn create_image_asset(
        &self,
        data: &[u8],
        metadata: Option<AssetMetadata>,
    ) -> Result<Asset> {
        if media::detect_image(data).is_none() {
            return Err(Error::InvalidImageFormat);
        }
        self.create_asset(data, AssetType::Photo, metadata).await
    }

    /// Replace an asset's data, type and metadata
    ///
    /// `asset_type: None` keeps the existing type; the metadata argument
    /// replaces wholesale. Id and creation time are preserved.
    pub async fn update_asset(
        &self,
        identifier: &AssetIdentifier,
        data: &[u8],
        asset_type: Option<AssetType>,
        metadata: Option<AssetMetadata>,
    ) -> Result<Asset> {
        let id = identifier.resolve()?;
        let existing = self
            .metadata_store
            .fetch(&id)
            .await?
            .ok_or_else(|| Error::NotFound(id.clone()))?;

        let updated = Asset {
            id: existing.id,
            asset_type: asset_type.unwrap_or(existing.asset_type),
            created_at: existing.created_at,
            modified_at: Some(unix_timestamp()),
            file_size: data.len() as i64,
            metadata,
        };

        self.blob_store.write(data, &updated.id).await?;
        self.metadata_store.update(&updated).await?;

        tracing::debug!("updated asset {} ({} bytes)", updated.id, updated.file_size);
        Ok(updated)
    }

    /// Delete an asset
    ///
    /// The blob delete runs first; a blob that is already absent is tolerated
    /// (the metadata record is still the authority), every other blob failure
    /// aborts. The metadata record is removed last.
    pub async fn delete_asset(&self, identifier: &AssetIdentifier) -> Result<()> {
        let id = identifier.resolve()?;
        if self.metadata_store.fetch(&id).await?.is_none() {
            return Err(Error::NotFound(id));
        }

        match self.blob_store.delete(&id).await {
            Ok(()) => {}
            Err(Error::DataNotFound(_)) => {
                tracing::debug!("blob already absent while deleting asset {}", id);
            }
            Err(err) => return Err(err),
        }

        self.metadata_store.delete(&id).await
    }

    /// Fetch an asset's metadata record
    pub async fn fetch_asset(&self, identifier: &AssetIdentifier) -> Result<Asset> {
        let id = identifier.resolve()?;
        self.metadata_store
            .fetch(&id)
            .await?
            .ok_or(Error::NotFound(id))
    }

    /// Fetch an asset's binary data
    ///
    /// Resolves through the metadata record first, so a missing record is
    /// `NotFound` while a record whose blob is gone (the detectable
    /// inconsistency) is `DataNotFound`.
    pub async fn fetch_asset_data(&self, identifier: &AssetIdentifier) -> Result<Vec<u8>> {
        let asset = self.fetch_asset(identifier).await?;
        self.blob_store.read(&asset.id).await
    }

    /// List assets, optionally restricted to one type
    pub async fn fetch_assets(
        &self,
        asset_type: Option<&AssetType>,
        ascending: bool,
    ) -> Result<Vec<Asset>> {
        let filters = type_filters(asset_type);
        self.metadata_store.fetch_all(&filters, ascending).await
    }

    /// List assets matching any of the given filters
    pub async fn fetch_assets_filtered(
        &self,
        filters: &[QueryFilter],
        ascending: bool,
    ) -> Result<Vec<Asset>> {
        self.metadata_store.fetch_all(filters, ascending).await
    }

    /// List a page of assets matching any of the given filters
    ///
    /// `limit == 0` means no cap; `offset` still applies.
    pub async fn fetch_assets_page(
        &self,
        limit: u32,
        offset: u32,
        filters: &[QueryFilter],
        ascending: bool,
    ) -> Result<Vec<Asset>> {
        self.metadata_store
            .fetch_page(limit, offset, filters, ascending)
            .await
    }

    /// Count assets, optionally restricted to a set of types
    pub async fn fetch_count(&self, types: Option<&[AssetType]>) -> Result<u64> {
        self.metadata_store.fetch_count(types).await
    }

    /// Remove every asset: the blob root first, then all metadata records
    pub async fn delete_all(&self) -> Result<()> {
        self.blob_store.delete_all().await?;
        self.metadata_store.delete_all().await
    }

    /// Subscribe to the metadata store's coalesced change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.metadata_store.subscribe()
    }
}

fn type_filters(asset_type: Option<&AssetType>) -> Vec<QueryFilter> {
    match asset_type {
        Some(asset_type) => vec![QueryFilter::asset_type(asset_type)],
        None => Vec::new(),
    }
}

// ============================================================================
// Default local configuration (sqlite feature)
// ============================================================================

#[cfg(feature = "sqlite")]
pub use local::{LocalAssetCoordinator, LocalStorage};

#[cfg(feature = "sqlite")]
mod local {
    use super::AssetCoordinator;
    use crate::error::{Error, Result};
    use crate::implementations::fs::FsBlobStore;
    use crate::implementations::sqlite::SqliteMetadataStore;
    use crate::location::StorageLocation;
    use crate::traits::StorageTypes;
    use std::sync::Arc;

    /// Storage bundle for the default local configuration
    pub struct LocalStorage;

    impl StorageTypes for LocalStorage {
        type Blob = FsBlobStore;
        type Metadata = SqliteMetadataStore;
    }

    /// Coordinator over filesystem blobs and SQLite metadata
    pub type LocalAssetCoordinator = AssetCoordinator<LocalStorage>;

    impl AssetCoordinator<LocalStorage> {
        /// Open a default-configured coordinator under a standard location
        ///
        /// Lays out `<location>/<namespace>/assets/` for blobs and
        /// `<location>/<namespace>/assets.db` for metadata.
        pub fn open_local(location: StorageLocation, namespace: &str) -> Result<Self> {
            let base = location
                .resolve()
                .ok_or_else(|| Error::Unknown("storage location could not be resolved".to_string()))?
                .join(namespace);
            std::fs::create_dir_all(&base).map_err(Error::write)?;

            let blob_store = FsBlobStore::new(base.join("assets"));
            let metadata_store = SqliteMetadataStore::open(base.join("assets.db"))?;
            Ok(Self::new(Arc::new(blob_store), Arc::new(metadata_store)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::memory::{MemoryBlobStore, MemoryMetadataStore, MemoryStorage};
    use crate::types::asset_url;
    use async_trait::async_trait;

    fn make_coordinator() -> (
        AssetCoordinator<MemoryStorage>,
        Arc<MemoryBlobStore>,
        Arc<MemoryMetadataStore>,
    ) {
        let blob_store = Arc::new(MemoryBlobStore::new());
        let metadata_store = Arc::new(MemoryMetadataStore::new());
        let coordinator = AssetCoordinator::new(blob_store.clone(), metadata_store.clone());
        (coordinator, blob_store, metadata_store)
    }

    /// Metadata store whose writes always fail, for ordering tests
    struct RejectingMetadataStore {
        inner: MemoryMetadataStore,
    }

    #[async_trait]
    impl MetadataStore for RejectingMetadataStore {
        async fn add(&self, _asset: &Asset) -> Result<()> {
            Err(Error::write("metadata backend rejected the record"))
        }

        async fn update(&self, asset: &Asset) -> Result<()> {
            self.inner.update(asset).await
        }

        async fn fetch(&self, id: &AssetId) -> Result<Option<Asset>> {
            self.inner.fetch(id).await
        }

        async fn delete(&self, id: &AssetId) -> Result<()> {
            self.inner.delete(id).await
        }

        async fn fetch_all(&self, filters: &[QueryFilter], ascending: bool) -> Result<Vec<Asset>> {
            self.inner.fetch_all(filters, ascending).await
        }

        async fn fetch_page(
            &self,
            limit: u32,
            offset: u32,
            filters: &[QueryFilter],
            ascending: bool,
        ) -> Result<Vec<Asset>> {
            self.inner.fetch_page(limit, offset, filters, ascending).await
        }

        async fn fetch_count(&self, types: Option<&[AssetType]>) -> Result<u64> {
            self.inner.fetch_count(types).await
        }

        async fn delete_all(&self) -> Result<()> {
            self.inner.delete_all().await
        }

        fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
            self.inner.subscribe()
        }
    }

    struct RejectingMetadataStorage;

    impl StorageTypes for RejectingMetadataStorage {
        type Blob = MemoryBlobStore;
        type Metadata = RejectingMetadataStore;
    }

    /// Blob store whose deletes always fail hard, for ordering tests
    struct StuckBlobStore {
        inner: MemoryBlobStore,
    }

    #[async_trait]
    impl BlobStore for StuckBlobStore {
        async fn write(&self, data: &[u8], id: &AssetId) -> Result<()> {
            self.inner.write(data, id).await
        }

        async fn read(&self, id: &AssetId) -> Result<Vec<u8>> {
            self.inner.read(id).await
        }

        async fn delete(&self, _id: &AssetId) -> Result<()> {
            Err(Error::delete("blob is stuck"))
        }

        async fn exists(&self, id: &AssetId) -> bool {
            self.inner.exists(id).await
        }

        async fn delete_all(&self) -> Result<()> {
            self.inner.delete_all().await
        }
    }

    struct StuckBlobStorage;

    impl StorageTypes for StuckBlobStorage {
        type Blob = StuckBlobStore;
        type Metadata = MemoryMetadataStore;
    }

    #[tokio::test]
    async fn test_create_writes_both_stores() {
        let (coordinator, blob_store, metadata_store) = make_coordinator();

        let asset = coordinator
            .create_asset(b"payload", AssetType::Photo, None)
            .await
            .unwrap();

        assert!(blob_store.exists(&asset.id).await);
        assert!(metadata_store.fetch(&asset.id).await.unwrap().is_some());
        assert_eq!(asset.file_size, 7);
    }

    #[tokio::test]
    async fn test_blob_is_written_before_metadata() {
        // A failed metadata add leaves the already-written blob behind as an
        // orphan: the blob step runs first.
        let blob_store = Arc::new(MemoryBlobStore::new());
        let metadata_store = Arc::new(RejectingMetadataStore {
            inner: MemoryMetadataStore::new(),
        });
        let coordinator: AssetCoordinator<RejectingMetadataStorage> =
            AssetCoordinator::new(blob_store.clone(), metadata_store.clone());

        let result = coordinator
            .create_asset(b"orphan bytes", AssetType::Photo, None)
            .await;
        assert!(matches!(result, Err(Error::WriteFailed(_))));

        // No record was created, but exactly one blob was
        assert_eq!(metadata_store.fetch_count(None).await.unwrap(), 0);
        let blobs = blob_store.len();
        assert_eq!(blobs, 1);
    }

    #[tokio::test]
    async fn test_hard_blob_failure_aborts_delete() {
        // Only "blob already absent" is swallowed; a real blob failure aborts
        // before the metadata record is touched.
        let blob_store = Arc::new(StuckBlobStore {
            inner: MemoryBlobStore::new(),
        });
        let metadata_store = Arc::new(MemoryMetadataStore::new());
        let coordinator: AssetCoordinator<StuckBlobStorage> =
            AssetCoordinator::new(blob_store, metadata_store.clone());

        let asset = coordinator
            .create_asset(b"stuck", AssetType::Photo, None)
            .await
            .unwrap();

        let result = coordinator
            .delete_asset(&AssetIdentifier::Id(asset.id.clone()))
            .await;
        assert!(matches!(result, Err(Error::DeleteFailed(_))));
        assert!(metadata_store.fetch(&asset.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (coordinator, _, _) = make_coordinator();
        let data = b"round trip bytes".to_vec();

        let asset = coordinator
            .create_asset(&data, AssetType::Document, None)
            .await
            .unwrap();
        let read = coordinator
            .fetch_asset_data(&AssetIdentifier::Id(asset.id))
            .await
            .unwrap();
        assert_eq!(read, data);
    }

    #[tokio::test]
    async fn test_update_preserves_identity() {
        let (coordinator, _, _) = make_coordinator();

        let created = coordinator
            .create_asset(b"v1", AssetType::Photo, None)
            .await
            .unwrap();

        let mut metadata = AssetMetadata::new();
        metadata.insert("rev".to_string(), 2i64.into());
        let updated = coordinator
            .update_asset(
                &AssetIdentifier::Id(created.id.clone()),
                b"version two",
                None,
                Some(metadata.clone()),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.asset_type, AssetType::Photo);
        assert_eq!(updated.file_size, 12);
        assert_eq!(updated.metadata, Some(metadata));
        assert!(updated.modified_at.is_some());

        let data = coordinator
            .fetch_asset_data(&AssetIdentifier::Id(created.id))
            .await
            .unwrap();
        assert_eq!(data, b"version two");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (coordinator, _, _) = make_coordinator();
        let result = coordinator
            .update_asset(&AssetIdentifier::Id(AssetId::new()), b"x", None, None)
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let (coordinator, _, _) = make_coordinator();

        let asset = coordinator
            .create_asset(b"short lived", AssetType::Audio, None)
            .await
            .unwrap();
        let identifier = AssetIdentifier::Id(asset.id);

        coordinator.delete_asset(&identifier).await.unwrap();

        assert!(matches!(
            coordinator.fetch_asset(&identifier).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            coordinator.fetch_asset_data(&identifier).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            coordinator.delete_asset(&identifier).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_swallows_missing_blob() {
        let (coordinator, blob_store, metadata_store) = make_coordinator();

        let asset = coordinator
            .create_asset(b"data", AssetType::Photo, None)
            .await
            .unwrap();

        // Blob vanishes out from under the record
        blob_store.delete(&asset.id).await.unwrap();

        coordinator
            .delete_asset(&AssetIdentifier::Id(asset.id.clone()))
            .await
            .unwrap();
        assert!(metadata_store.fetch(&asset.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_blob_surfaces_as_data_not_found() {
        let (coordinator, blob_store, _) = make_coordinator();

        let asset = coordinator
            .create_asset(b"data", AssetType::Photo, None)
            .await
            .unwrap();
        blob_store.delete(&asset.id).await.unwrap();

        let identifier = AssetIdentifier::Id(asset.id);
        // The record is intact...
        assert!(coordinator.fetch_asset(&identifier).await.is_ok());
        // ...but the data read reports the inconsistency
        assert!(matches!(
            coordinator.fetch_asset_data(&identifier).await,
            Err(Error::DataNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_url_identifier_resolution() {
        let (coordinator, _, _) = make_coordinator();

        let asset = coordinator
            .create_asset(b"addressed", AssetType::Photo, None)
            .await
            .unwrap();

        let by_url = coordinator
            .fetch_asset(&AssetIdentifier::Url(asset_url(&asset.id)))
            .await
            .unwrap();
        assert_eq!(by_url.id, asset.id);

        let result = coordinator
            .fetch_asset(&AssetIdentifier::Url("other:/abc".to_string()))
            .await;
        assert!(matches!(result, Err(Error::InvalidAssetUrl(_))));
    }

    #[tokio::test]
    async fn test_type_convenience_filter() {
        let (coordinator, _, _) = make_coordinator();

        coordinator
            .create_asset(b"p", AssetType::Photo, None)
            .await
            .unwrap();
        coordinator
            .create_asset(b"v", AssetType::Video, None)
            .await
            .unwrap();

        let photos = coordinator
            .fetch_assets(Some(&AssetType::Photo), true)
            .await
            .unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].asset_type, AssetType::Photo);

        let all = coordinator.fetch_assets(None, true).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_all_clears_both_stores() {
        let (coordinator, blob_store, _) = make_coordinator();

        let asset = coordinator
            .create_asset(b"x", AssetType::Photo, None)
            .await
            .unwrap();

        coordinator.delete_all().await.unwrap();
        assert_eq!(coordinator.fetch_count(None).await.unwrap(), 0);
        assert!(!blob_store.exists(&asset.id).await);

        // Idempotent
        coordinator.delete_all().await.unwrap();
        assert_eq!(coordinator.fetch_count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_image_asset_sniffing() {
        let (coordinator, _, _) = make_coordinator();

        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0u8; 16]);
        let asset = coordinator.create_image_asset(&png, None).await.unwrap();
        assert_eq!(asset.asset_type, AssetType::Photo);

        let result = coordinator.create_image_asset(b"not an image", None).await;
        assert!(matches!(result, Err(Error::InvalidImageFormat)));
    }

    #[tokio::test]
    async fn test_change_notifications_pass_through() {
        let (coordinator, _, _) = make_coordinator();
        let mut rx = coordinator.subscribe();

        coordinator
            .create_asset(b"x", AssetType::Photo, None)
            .await
            .unwrap();
        assert!(rx.try_recv().is_ok());
    }
}
