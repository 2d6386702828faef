//! Object storage access
//!
//! Everything the album manager needs from the bucket: delimited listings,
//! prefix listings and object writes. `S3ObjectStore` talks to S3;
//! `MockObjectStore` keeps objects in memory for tests and dry runs.

pub mod client;
pub mod credentials;
pub mod mock;

pub use client::S3ObjectStore;
pub use mock::MockObjectStore;

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// How much of a listing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pages {
    /// Follow continuation tokens until the listing is exhausted.
    All,
    /// Stop after the first response page.
    FirstOnly,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Common prefixes of a `/`-delimited listing of the bucket root.
    async fn list_common_prefixes(&self, pages: Pages) -> Result<Vec<String>>;
    /// Keys of every object under `prefix`.
    async fn list_keys(&self, prefix: &str, pages: Pages) -> Result<Vec<String>>;
    async fn put_empty(&self, key: &str) -> Result<()>;
    /// Streams the file at `path` into `key`.
    async fn upload_file(&self, key: &str, path: &Path, content_type: &str) -> Result<()>;
}
