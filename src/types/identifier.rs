//! Asset identifier resolution
//!
//! Callers may address an asset either by its raw id or by an opaque URL of the
//! fixed `nest-asset` scheme. Both resolve to an [`AssetId`]; a URL with any
//! other scheme is rejected.

use crate::error::{Error, Result};
use crate::ids::AssetId;

/// URL scheme for opaque asset URLs
pub const ASSET_URL_SCHEME: &str = "nest-asset";

/// Either a raw asset id or an opaque `nest-asset:/<id>` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetIdentifier {
    Id(AssetId),
    Url(String),
}

impl AssetIdentifier {
    /// Resolve to the underlying asset id
    ///
    /// Raw ids pass through; URLs are parsed against the fixed scheme and fail
    /// with [`Error::InvalidAssetUrl`] on mismatch.
    pub fn resolve(&self) -> Result<AssetId> {
        match self {
            AssetIdentifier::Id(id) => Ok(id.clone()),
            AssetIdentifier::Url(url) => parse_asset_url(url),
        }
    }
}

impl From<AssetId> for AssetIdentifier {
    fn from(id: AssetId) -> Self {
        AssetIdentifier::Id(id)
    }
}

/// Build the opaque URL form of an asset id
pub fn asset_url(id: &AssetId) -> String {
    format!("{ASSET_URL_SCHEME}:/{id}")
}

fn parse_asset_url(url: &str) -> Result<AssetId> {
    let rest = url
        .strip_prefix(ASSET_URL_SCHEME)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| Error::InvalidAssetUrl(url.to_string()))?;

    // The id is the URL path with leading separators stripped
    let id = rest.trim_start_matches('/');
    if id.is_empty() {
        return Err(Error::InvalidAssetUrl(url.to_string()));
    }
    Ok(AssetId::from_string(id))
}
