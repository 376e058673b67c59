//! Local asset management: sharded blob storage paired with structured metadata
//!
//! This crate stores arbitrary binary data under generated identifiers,
//! pairing a filesystem blob store (two-level md5-sharded layout) with a
//! metadata store (SQLite by default) behind a single coordinator:
//!
//! - **Traits**: [`BlobStore`], [`MetadataStore`], [`StorageTypes`]
//! - **Implementations**: [`FsBlobStore`], [`SqliteMetadataStore`] (feature
//!   `sqlite`, on by default), in-memory stores for testing
//! - **Coordinator**: [`AssetCoordinator`] - create/update/delete/fetch over
//!   both stores with documented failure ordering
//! - **Queries**: [`QueryFilter`] predicates, pagination and counting, ordered
//!   by creation time
//!
//! # Example
//!
//! ```ignore
//! use nest_asset::{AssetType, LocalAssetCoordinator, StorageLocation};
//!
//! let coordinator = LocalAssetCoordinator::open_local(
//!     StorageLocation::ApplicationSupport,
//!     "my-app",
//! )?;
//! let asset = coordinator.create_asset(&bytes, AssetType::Photo, None).await?;
//! let data = coordinator.fetch_asset_data(&asset.id.clone().into()).await?;
//! ```

pub mod coordinator;
pub mod error;
pub mod ids;
pub mod implementations;
pub mod location;
pub mod media;
pub mod notify;
pub mod shard;
pub mod traits;
pub mod types;

mod helper;

pub use coordinator::AssetCoordinator;
#[cfg(feature = "sqlite")]
pub use coordinator::{LocalAssetCoordinator, LocalStorage};
pub use error::{Error, Result};
pub use ids::AssetId;
pub use implementations::fs::FsBlobStore;
pub use implementations::memory::{MemoryBlobStore, MemoryMetadataStore, MemoryStorage};
#[cfg(feature = "sqlite")]
pub use implementations::sqlite::SqliteMetadataStore;
pub use location::StorageLocation;
pub use notify::{ChangeNotifier, StoreChange, DEFAULT_COALESCE_WINDOW};
pub use shard::shard_relative_path;
pub use traits::{BlobStore, MetadataStore, StorageTypes};
pub use types::{
    asset_url, Asset, AssetIdentifier, AssetMetadata, AssetType, FilterComparison, FilterValue,
    MetadataValue, QueryFilter, ASSET_URL_SCHEME,
};
