//! Filesystem-based blob storage

mod blob;

pub use blob::FsBlobStore;
