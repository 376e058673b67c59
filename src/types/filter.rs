//! Query filter model
//!
//! A [`QueryFilter`] is a single field/comparison/value predicate. A filter
//! list handed to the metadata store is combined with OR. The comparison
//! semantics are defined once here, in [`QueryFilter::matches`]; the SQLite
//! store translates the same semantics into SQL.
//!
//! Per-type semantics:
//! - Text: `Equal` and lexical ordering, `Contains` is substring match.
//! - Integer/Double: numeric ordering, cross-promoting to f64 when mixed.
//! - Boolean: compared through its integer representation.
//! - `Contains` against a non-text value degrades to `Equal`.
//! - A value kind that cannot be compared with the field's kind matches nothing.

use crate::types::asset::{Asset, AssetType};
use crate::types::metadata::encode_metadata;

/// Typed filter value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Double(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterComparison {
    Equal,
    LessThan,
    GreaterThan,
    Contains,
}

/// A single field/comparison/value predicate
///
/// Recognized fields: `id`, `type`, `createdAt`, `modifiedAt`, `fileSize`,
/// `metadata` (snake_case spellings are accepted too). Anything else is
/// rejected by the stores.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub field: String,
    pub value: FilterValue,
    pub comparison: FilterComparison,
}

impl QueryFilter {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<FilterValue>,
        comparison: FilterComparison,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            comparison,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, value, FilterComparison::Equal)
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, value, FilterComparison::LessThan)
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, value, FilterComparison::GreaterThan)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, value, FilterComparison::Contains)
    }

    /// Equality filter on the asset type, the common convenience case
    pub fn asset_type(asset_type: &AssetType) -> Self {
        Self::equals("type", asset_type.name())
    }

    /// Evaluate this predicate against an asset record
    ///
    /// This is the reference definition of the comparison semantics; the
    /// in-memory store uses it directly.
    pub fn matches(&self, asset: &Asset) -> bool {
        let Some(column) = column_name(&self.field) else {
            return false;
        };
        match column {
            "id" => self.compare_text(asset.id.as_str()),
            "asset_type" => self.compare_text(asset.asset_type.name()),
            "created_at" => self.compare_integer(asset.created_at),
            "modified_at" => match asset.modified_at {
                Some(modified_at) => self.compare_integer(modified_at),
                // An absent timestamp compares like SQL NULL: never a match
                None => false,
            },
            "file_size" => self.compare_integer(asset.file_size),
            "metadata" => match asset.metadata.as_ref().and_then(|m| encode_metadata(m).ok()) {
                Some(encoded) => self.compare_text(&encoded),
                None => false,
            },
            _ => false,
        }
    }

    fn compare_text(&self, field: &str) -> bool {
        let FilterValue::Text(value) = &self.value else {
            return false;
        };
        match self.comparison {
            FilterComparison::Equal => field == value,
            FilterComparison::LessThan => field < value.as_str(),
            FilterComparison::GreaterThan => field > value.as_str(),
            FilterComparison::Contains => field.contains(value.as_str()),
        }
    }

    fn compare_integer(&self, field: i64) -> bool {
        match &self.value {
            FilterValue::Integer(value) => compare_ordered(field, *value, self.comparison),
            FilterValue::Boolean(value) => compare_ordered(field, *value as i64, self.comparison),
            FilterValue::Double(value) => {
                let field = field as f64;
                match self.comparison {
                    FilterComparison::Equal | FilterComparison::Contains => field == *value,
                    FilterComparison::LessThan => field < *value,
                    FilterComparison::GreaterThan => field > *value,
                }
            }
            FilterValue::Text(_) => false,
        }
    }
}

fn compare_ordered(field: i64, value: i64, comparison: FilterComparison) -> bool {
    match comparison {
        FilterComparison::Equal | FilterComparison::Contains => field == value,
        FilterComparison::LessThan => field < value,
        FilterComparison::GreaterThan => field > value,
    }
}

/// Map a filter field name to its metadata-store column
///
/// Returns `None` for unrecognized fields; stores reject those.
pub(crate) fn column_name(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("id"),
        "type" | "asset_type" => Some("asset_type"),
        "createdAt" | "created_at" => Some("created_at"),
        "modifiedAt" | "modified_at" => Some("modified_at"),
        "fileSize" | "file_size" => Some("file_size"),
        "metadata" => Some("metadata"),
        _ => None,
    }
}
