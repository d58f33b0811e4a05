//! Object store transport abstraction
//!
//! Provides a trait for the three remote operations the client needs so
//! different transports (the AWS CLI, an in-memory store for tests) can sit
//! behind the same address-normalizing front door.

use crate::error::ArtifactResult;
use async_trait::async_trait;
use std::path::Path;

/// Abstract object store transport
///
/// Buckets and keys passed here are already resolved: the bucket contains
/// no separator and the key already carries any prefix.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// List the full keys of every object in `bucket` starting with `prefix`
    async fn list_objects(&self, bucket: &str, prefix: &str) -> ArtifactResult<Vec<String>>;

    /// Download `bucket/key` to `dest`, overwriting it
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> ArtifactResult<()>;

    /// Upload the local file `src` to `bucket/key`
    async fn upload(&self, bucket: &str, key: &str, src: &Path) -> ArtifactResult<()>;

    /// Get the human-readable transport name for display
    fn backend_name(&self) -> &'static str;
}
