//! Core data types for asset storage

mod asset;
mod filter;
mod identifier;
mod metadata;

pub use asset::{Asset, AssetType};
pub use filter::{FilterComparison, FilterValue, QueryFilter};
pub use identifier::{asset_url, AssetIdentifier, ASSET_URL_SCHEME};
pub use metadata::{AssetMetadata, MetadataValue};

pub(crate) use filter::column_name;
pub(crate) use metadata::{decode_metadata, encode_metadata};
