//! MetadataStore trait for structured asset records

use crate::error::Result;
use crate::ids::AssetId;
use crate::notify::StoreChange;
use crate::types::{Asset, AssetType, QueryFilter};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Structured metadata storage trait
///
/// Owns the asset records (id, type, timestamps, size, metadata map) and is
/// the source of truth for asset existence. Listing is always ordered by
/// `created_at` (with id as a deterministic tiebreaker); a filter list is
/// combined with OR.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Add a new record
    ///
    /// Fails with [`Error::AlreadyExists`](crate::Error::AlreadyExists) when a
    /// record with the same id is present.
    async fn add(&self, asset: &Asset) -> Result<()>;

    /// Replace an existing record's mutable fields
    ///
    /// Updates type, metadata, size and `modified_at`; `id` and `created_at`
    /// are never touched. Fails with
    /// [`Error::NotFound`](crate::Error::NotFound) when no record exists.
    async fn update(&self, asset: &Asset) -> Result<()>;

    /// Point lookup; absence is not an error
    async fn fetch(&self, id: &AssetId) -> Result<Option<Asset>>;

    /// Remove a record if present; absence is not an error
    async fn delete(&self, id: &AssetId) -> Result<()>;

    /// List all records matching any of the filters
    async fn fetch_all(&self, filters: &[QueryFilter], ascending: bool) -> Result<Vec<Asset>>;

    /// List a page of records matching any of the filters
    ///
    /// `offset` skips that many matching records; `limit` caps the returned
    /// count, with `0` meaning unbounded (the offset still applies).
    async fn fetch_page(
        &self,
        limit: u32,
        offset: u32,
        filters: &[QueryFilter],
        ascending: bool,
    ) -> Result<Vec<Asset>>;

    /// Count records, optionally restricted to a type set combined with OR
    ///
    /// `None` counts everything; an explicitly empty set counts nothing.
    async fn fetch_count(&self, types: Option<&[AssetType]>) -> Result<u64>;

    /// Bulk-remove every record; idempotent
    async fn delete_all(&self) -> Result<()>;

    /// Subscribe to coalesced change notifications
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}
