//! In-memory MetadataStore implementation
//!
//! Filter, ordering and pagination semantics mirror the SQLite store exactly;
//! the filter evaluation itself comes from [`QueryFilter::matches`], which is
//! the reference definition.

use crate::error::{Error, Result};
use crate::ids::AssetId;
use crate::notify::{ChangeNotifier, StoreChange};
use crate::traits::MetadataStore;
use crate::types::{column_name, Asset, AssetType, QueryFilter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// In-memory metadata store for testing and composition
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    assets: Mutex<HashMap<String, Asset>>,
    notifier: ChangeNotifier,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a custom notification coalescing window
    pub fn with_coalesce_window(window: Duration) -> Self {
        Self {
            assets: Mutex::new(HashMap::new()),
            notifier: ChangeNotifier::with_window(window),
        }
    }
}

fn validate_filters(filters: &[QueryFilter]) -> Result<()> {
    for filter in filters {
        if column_name(&filter.field).is_none() {
            return Err(Error::read(format!(
                "unsupported filter field: {}",
                filter.field
            )));
        }
    }
    Ok(())
}

fn matches_any(asset: &Asset, filters: &[QueryFilter]) -> bool {
    filters.is_empty() || filters.iter().any(|filter| filter.matches(asset))
}

fn sort_by_created(assets: &mut [Asset], ascending: bool) {
    assets.sort_by(|a, b| {
        let ordering = a
            .created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.as_str().cmp(b.id.as_str()));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn add(&self, asset: &Asset) -> Result<()> {
        let mut assets = self.assets.lock().unwrap();
        if assets.contains_key(asset.id.as_str()) {
            return Err(Error::AlreadyExists(asset.id.clone()));
        }
        assets.insert(asset.id.as_str().to_string(), asset.clone());
        drop(assets);
        self.notifier.notify();
        Ok(())
    }

    async fn update(&self, asset: &Asset) -> Result<()> {
        let mut assets = self.assets.lock().unwrap();
        let Some(existing) = assets.get(asset.id.as_str()) else {
            return Err(Error::NotFound(asset.id.clone()));
        };
        // id and created_at are immutable regardless of what the caller built
        let replacement = Asset {
            id: existing.id.clone(),
            created_at: existing.created_at,
            ..asset.clone()
        };
        assets.insert(asset.id.as_str().to_string(), replacement);
        drop(assets);
        self.notifier.notify();
        Ok(())
    }

    async fn fetch(&self, id: &AssetId) -> Result<Option<Asset>> {
        let assets = self.assets.lock().unwrap();
        Ok(assets.get(id.as_str()).cloned())
    }

    async fn delete(&self, id: &AssetId) -> Result<()> {
        let mut assets = self.assets.lock().unwrap();
        let removed = assets.remove(id.as_str()).is_some();
        drop(assets);
        if removed {
            self.notifier.notify();
        }
        Ok(())
    }

    async fn fetch_all(&self, filters: &[QueryFilter], ascending: bool) -> Result<Vec<Asset>> {
        validate_filters(filters)?;
        let assets = self.assets.lock().unwrap();
        let mut matching: Vec<Asset> = assets
            .values()
            .filter(|asset| matches_any(asset, filters))
            .cloned()
            .collect();
        drop(assets);
        sort_by_created(&mut matching, ascending);
        Ok(matching)
    }

    async fn fetch_page(
        &self,
        limit: u32,
        offset: u32,
        filters: &[QueryFilter],
        ascending: bool,
    ) -> Result<Vec<Asset>> {
        let matching = self.fetch_all(filters, ascending).await?;
        let cap = if limit == 0 {
            usize::MAX
        } else {
            limit as usize
        };
        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(cap)
            .collect())
    }

    async fn fetch_count(&self, types: Option<&[AssetType]>) -> Result<u64> {
        let assets = self.assets.lock().unwrap();
        let count = match types {
            None => assets.len(),
            // OR over the empty set matches nothing
            Some([]) => 0,
            Some(types) => assets
                .values()
                .filter(|asset| types.contains(&asset.asset_type))
                .count(),
        };
        Ok(count as u64)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut assets = self.assets.lock().unwrap();
        let was_empty = assets.is_empty();
        assets.clear();
        drop(assets);
        if !was_empty {
            self.notifier.notify();
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, asset_type: AssetType, created_at: i64) -> Asset {
        Asset::new(AssetId::from_string(id), asset_type, 10).with_created_at(created_at)
    }

    #[tokio::test]
    async fn test_add_rejects_duplicate_id() {
        let store = MemoryMetadataStore::new();
        let record = asset("a1", AssetType::Photo, 1);

        store.add(&record).await.unwrap();
        assert!(matches!(
            store.add(&record).await,
            Err(Error::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let store = MemoryMetadataStore::new();
        store.add(&asset("a1", AssetType::Photo, 1)).await.unwrap();

        let mut replacement = asset("a1", AssetType::Video, 999);
        replacement.modified_at = Some(50);
        store.update(&replacement).await.unwrap();

        let stored = store
            .fetch(&AssetId::from_string("a1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.created_at, 1);
        assert_eq!(stored.asset_type, AssetType::Video);
        assert_eq!(stored.modified_at, Some(50));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryMetadataStore::new();
        let result = store.update(&asset("ghost", AssetType::Photo, 1)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = MemoryMetadataStore::new();
        store.delete(&AssetId::from_string("ghost")).await.unwrap();
    }

    #[tokio::test]
    async fn test_ordering_and_pagination() {
        let store = MemoryMetadataStore::new();
        for i in 0..35 {
            store
                .add(&asset(&format!("a{i:02}"), AssetType::Photo, i))
                .await
                .unwrap();
        }

        let page = store.fetch_page(10, 20, &[], true).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].created_at, 20);
        assert_eq!(page[9].created_at, 29);

        let newest_first = store.fetch_all(&[], false).await.unwrap();
        assert_eq!(newest_first[0].created_at, 34);
    }

    #[tokio::test]
    async fn test_limit_zero_is_unbounded() {
        let store = MemoryMetadataStore::new();
        for i in 0..5 {
            store
                .add(&asset(&format!("a{i}"), AssetType::Photo, i))
                .await
                .unwrap();
        }

        let page = store.fetch_page(0, 2, &[], true).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].created_at, 2);
    }

    #[tokio::test]
    async fn test_filters_combine_with_or() {
        let store = MemoryMetadataStore::new();
        store.add(&asset("p", AssetType::Photo, 1)).await.unwrap();
        store.add(&asset("v", AssetType::Video, 2)).await.unwrap();
        store.add(&asset("d", AssetType::Document, 3)).await.unwrap();

        let filters = [
            QueryFilter::asset_type(&AssetType::Photo),
            QueryFilter::asset_type(&AssetType::Video),
        ];
        let matching = store.fetch_all(&filters, true).await.unwrap();
        assert_eq!(matching.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_filter_field_is_rejected() {
        let store = MemoryMetadataStore::new();
        let result = store
            .fetch_all(&[QueryFilter::equals("owner", "me")], true)
            .await;
        assert!(matches!(result, Err(Error::ReadFailed(_))));
    }

    #[tokio::test]
    async fn test_count_by_type() {
        let store = MemoryMetadataStore::new();
        store.add(&asset("p1", AssetType::Photo, 1)).await.unwrap();
        store.add(&asset("p2", AssetType::Photo, 2)).await.unwrap();
        store.add(&asset("v1", AssetType::Video, 3)).await.unwrap();

        assert_eq!(
            store
                .fetch_count(Some(&[AssetType::Photo]))
                .await
                .unwrap(),
            2
        );
        assert_eq!(store.fetch_count(None).await.unwrap(), 3);
        assert_eq!(store.fetch_count(Some(&[])).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_change_notifications() {
        let store = MemoryMetadataStore::with_coalesce_window(Duration::ZERO);
        let mut rx = store.subscribe();

        store.add(&asset("a1", AssetType::Photo, 1)).await.unwrap();
        assert!(rx.try_recv().is_ok());

        // Deleting an absent record changes nothing and stays silent
        store.delete(&AssetId::from_string("ghost")).await.unwrap();
        assert!(rx.try_recv().is_err());
    }
}
