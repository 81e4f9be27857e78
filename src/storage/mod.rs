//! Storage module
//!
//! Resolves a location string (local path or object-store URL) into an
//! [`ObjectStore`](object_store::ObjectStore) plus key prefix. Both record
//! sources and the output root go through [`StorageLocation`].
//!
//! Supported locations:
//! - `s3://bucket/path/` - AWS S3
//! - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
//! - `gs://bucket/path/` - Google Cloud Storage
//! - `az://container/path/` - Azure Blob Storage
//! - `/local/path/`, `./path/` or `file:///path` - Local filesystem

mod location;

pub use location::StorageLocation;
