//! Sharded blob path derivation
//!
//! Blobs are stored under a two-level hashed directory layout:
//! `[<type>/]<hash[0..2]>/<hash[2..4]>/<identifier>` where `hash` is the hex
//! md5 digest of the identifier string. Flat directories degrade lookup
//! performance once they hold tens of thousands of files; two levels of
//! 256-way fan-out bound every directory to an even share of the population.
//! The identifier itself, not the hash, is the final filename, so stored files
//! stay human-traceable.
//!
//! Derivation is pure and deterministic: the path is recomputed on every
//! access, never stored.

use crate::types::AssetType;
use std::path::PathBuf;

/// Derive the relative storage path for an asset identifier
pub fn shard_relative_path(identifier: &str, asset_type: Option<&AssetType>) -> PathBuf {
    let digest = md5::compute(identifier.as_bytes());
    let hash = hex::encode(digest.0);

    let mut path = PathBuf::new();
    if let Some(asset_type) = asset_type {
        path.push(asset_type.name());
    }
    path.push(&hash[0..2]);
    path.push(&hash[2..4]);
    path.push(identifier);
    path
}
