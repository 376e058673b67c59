//! Caller-supplied asset metadata
//!
//! Metadata is a string-keyed map of a small JSON-equivalent value union. It is
//! persisted as a JSON text column; encode-then-decode reproduces an equal
//! value tree.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata map attached to an asset
pub type AssetMetadata = HashMap<String, MetadataValue>;

/// A metadata value
///
/// Serializes untagged: scalars become native JSON scalars, arrays and maps
/// recurse. Variant order matters for deserialization: booleans and integers
/// must be tried before doubles so `true` and `1` come back as themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Array(Vec<MetadataValue>),
    Map(HashMap<String, MetadataValue>),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Boolean(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Double(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(value: Vec<MetadataValue>) -> Self {
        MetadataValue::Array(value)
    }
}

/// Encode a metadata map to its persisted JSON form
pub(crate) fn encode_metadata(metadata: &AssetMetadata) -> Result<String> {
    Ok(serde_json::to_string(metadata)?)
}

/// Decode a metadata map from its persisted JSON form
pub(crate) fn decode_metadata(raw: &str) -> Result<AssetMetadata> {
    Ok(serde_json::from_str(raw)?)
}
