//! MetadataStore implementation for SQLite
//!
//! Filters are translated into OR-joined SQL predicates over a whitelisted
//! column set; the comparison semantics mirror [`QueryFilter::matches`].

use super::SqliteMetadataStore;
use crate::error::{Error, Result};
use crate::ids::AssetId;
use crate::notify::StoreChange;
use crate::traits::MetadataStore;
use crate::types::{
    column_name, decode_metadata, encode_metadata, Asset, AssetType, FilterComparison,
    FilterValue, QueryFilter,
};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use tokio::sync::broadcast;

const SELECT_COLUMNS: &str = "id, asset_type, created_at, modified_at, file_size, metadata";

type RawAsset = (String, String, i64, Option<i64>, i64, Option<String>);

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawAsset> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn raw_to_asset(raw: RawAsset) -> Result<Asset> {
    let (id, type_name, created_at, modified_at, file_size, metadata) = raw;
    Ok(Asset {
        id: AssetId::from_string(id),
        asset_type: AssetType::from_name(&type_name)?,
        created_at,
        modified_at,
        file_size,
        metadata: metadata.as_deref().map(decode_metadata).transpose()?,
    })
}

fn sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Text(text) => Value::Text(text.clone()),
        FilterValue::Integer(n) => Value::Integer(*n),
        FilterValue::Double(d) => Value::Real(*d),
        FilterValue::Boolean(b) => Value::Integer(*b as i64),
    }
}

fn predicate_for(column: &str, filter: &QueryFilter) -> (String, Value) {
    match (filter.comparison, &filter.value) {
        (FilterComparison::Contains, FilterValue::Text(needle)) => {
            let escaped = needle
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            (
                format!("{column} LIKE ? ESCAPE '\\'"),
                Value::Text(format!("%{escaped}%")),
            )
        }
        (comparison, value) => {
            let op = match comparison {
                // Contains off text degrades to equality
                FilterComparison::Equal | FilterComparison::Contains => "=",
                FilterComparison::LessThan => "<",
                FilterComparison::GreaterThan => ">",
            };
            (format!("{column} {op} ?"), sql_value(value))
        }
    }
}

fn filter_clause(filters: &[QueryFilter]) -> Result<(String, Vec<Value>)> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let mut predicates = Vec::with_capacity(filters.len());
    let mut values = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = column_name(&filter.field).ok_or_else(|| {
            Error::read(format!("unsupported filter field: {}", filter.field))
        })?;
        let (predicate, value) = predicate_for(column, filter);
        predicates.push(predicate);
        values.push(value);
    }
    Ok((format!(" WHERE {}", predicates.join(" OR ")), values))
}

impl SqliteMetadataStore {
    fn query_assets(
        &self,
        filters: &[QueryFilter],
        ascending: bool,
        page: Option<(u32, u32)>,
    ) -> Result<Vec<Asset>> {
        let (where_clause, mut values) = filter_clause(filters)?;
        let order = if ascending { "ASC" } else { "DESC" };
        let mut sql = format!(
            "SELECT {SELECT_COLUMNS} FROM assets{where_clause} ORDER BY created_at {order}, id {order}"
        );
        if let Some((limit, offset)) = page {
            // LIMIT -1 is SQLite for "no cap"; offset still applies
            let limit = if limit == 0 { -1 } else { limit as i64 };
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(Value::Integer(limit));
            values.push(Value::Integer(offset as i64));
        }

        let conn = self.conn().lock().unwrap();
        let mut stmt = conn.prepare(&sql).map_err(Error::read)?;
        let rows = stmt
            .query_map(params_from_iter(values), read_raw)
            .map_err(Error::read)?;

        let mut assets = Vec::new();
        for raw in rows {
            assets.push(raw_to_asset(raw.map_err(Error::read)?)?);
        }
        Ok(assets)
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn add(&self, asset: &Asset) -> Result<()> {
        let metadata = asset.metadata.as_ref().map(encode_metadata).transpose()?;
        let conn = self.conn().lock().unwrap();

        let exists = match conn.query_row(
            "SELECT 1 FROM assets WHERE id = ?1",
            params![asset.id.as_str()],
            |_| Ok(true),
        ) {
            Ok(found) => found,
            Err(rusqlite::Error::QueryReturnedNoRows) => false,
            Err(err) => return Err(Error::read(err)),
        };
        if exists {
            return Err(Error::AlreadyExists(asset.id.clone()));
        }

        conn.execute(
            "INSERT INTO assets (id, asset_type, created_at, modified_at, file_size, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                asset.id.as_str(),
                asset.asset_type.name(),
                asset.created_at,
                asset.modified_at,
                asset.file_size,
                metadata
            ],
        )
        .map_err(Error::write)?;
        drop(conn);

        self.notifier().notify();
        Ok(())
    }

    async fn update(&self, asset: &Asset) -> Result<()> {
        let metadata = asset.metadata.as_ref().map(encode_metadata).transpose()?;
        let conn = self.conn().lock().unwrap();

        // id and created_at are deliberately absent from the SET list
        let updated = conn
            .execute(
                "UPDATE assets SET asset_type = ?2, modified_at = ?3, file_size = ?4, metadata = ?5
                 WHERE id = ?1",
                params![
                    asset.id.as_str(),
                    asset.asset_type.name(),
                    asset.modified_at,
                    asset.file_size,
                    metadata
                ],
            )
            .map_err(Error::write)?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(asset.id.clone()));
        }
        self.notifier().notify();
        Ok(())
    }

    async fn fetch(&self, id: &AssetId) -> Result<Option<Asset>> {
        let conn = self.conn().lock().unwrap();
        let result = conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM assets WHERE id = ?1"),
            params![id.as_str()],
            read_raw,
        );
        match result {
            Ok(raw) => Ok(Some(raw_to_asset(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(Error::read(err)),
        }
    }

    async fn delete(&self, id: &AssetId) -> Result<()> {
        let conn = self.conn().lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM assets WHERE id = ?1", params![id.as_str()])
            .map_err(Error::delete)?;
        drop(conn);

        if deleted > 0 {
            self.notifier().notify();
        }
        Ok(())
    }

    async fn fetch_all(&self, filters: &[QueryFilter], ascending: bool) -> Result<Vec<Asset>> {
        self.query_assets(filters, ascending, None)
    }

    async fn fetch_page(
        &self,
        limit: u32,
        offset: u32,
        filters: &[QueryFilter],
        ascending: bool,
    ) -> Result<Vec<Asset>> {
        self.query_assets(filters, ascending, Some((limit, offset)))
    }

    async fn fetch_count(&self, types: Option<&[AssetType]>) -> Result<u64> {
        let conn = self.conn().lock().unwrap();
        let count: i64 = match types {
            None => conn
                .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))
                .map_err(Error::read)?,
            // OR over the empty set matches nothing
            Some([]) => 0,
            Some(types) => {
                let predicates = vec!["asset_type = ?"; types.len()].join(" OR ");
                let sql = format!("SELECT COUNT(*) FROM assets WHERE {predicates}");
                let values = types
                    .iter()
                    .map(|asset_type| Value::Text(asset_type.name().to_string()));
                conn.query_row(&sql, params_from_iter(values), |row| row.get(0))
                    .map_err(Error::read)?
            }
        };
        Ok(count as u64)
    }

    async fn delete_all(&self) -> Result<()> {
        let conn = self.conn().lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM assets", [])
            .map_err(Error::delete)?;
        drop(conn);

        if deleted > 0 {
            self.notifier().notify();
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.notifier().subscribe()
    }
}
