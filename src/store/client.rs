//! Address-normalizing object store client

use crate::error::{ArtifactError, ArtifactResult};
use crate::store::address::ObjectAddress;
use crate::store::backend::ObjectBackend;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Key written by [`test_upload_permissions`]
pub const UPLOAD_PERMISSIONS_KEY: &str = "test-upload-permissions";

/// Front door to remote object storage.
///
/// Every call takes a raw bucket specifier, resolves it to an
/// [`ObjectAddress`] and hands the transport a plain bucket and full key.
/// Nothing is retried here.
#[derive(Clone)]
pub struct ObjectStoreClient {
    backend: Arc<dyn ObjectBackend>,
}

impl ObjectStoreClient {
    /// Create a client over the given transport
    pub fn new(backend: Arc<dyn ObjectBackend>) -> Self {
        Self { backend }
    }

    /// Name of the underlying transport
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// List every object key under the bucket specifier
    pub async fn list(&self, bucket_spec: &str) -> ArtifactResult<Vec<String>> {
        let addr = ObjectAddress::parse(bucket_spec);
        info!(
            "Listing bucket {} with prefix {}",
            addr.bucket, addr.key_prefix
        );

        let keys = self
            .backend
            .list_objects(&addr.bucket, &addr.key_prefix)
            .await?;
        debug!("Found {} objects in {}", keys.len(), addr);
        Ok(keys)
    }

    /// Download `key` from the bucket specifier to `local_path`
    ///
    /// Missing parent directories of `local_path` are created first.
    pub async fn get(
        &self,
        bucket_spec: &str,
        key: &str,
        local_path: &Path,
    ) -> ArtifactResult<PathBuf> {
        let addr = ObjectAddress::parse(bucket_spec);
        let full_key = addr.key(key);
        info!(
            "Downloading the {} from {} to {}",
            full_key,
            addr.bucket,
            local_path.display()
        );

        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ArtifactError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        self.backend
            .download(&addr.bucket, &full_key, local_path)
            .await?;
        Ok(local_path.to_path_buf())
    }

    /// Upload `local_path` to `key` under the bucket specifier
    pub async fn put(&self, bucket_spec: &str, key: &str, local_path: &Path) -> ArtifactResult<()> {
        let addr = ObjectAddress::parse(bucket_spec);
        let full_key = addr.key(key);
        info!(
            "Uploading the {} to {}:{}",
            local_path.display(),
            addr.bucket,
            full_key
        );

        self.backend.upload(&addr.bucket, &full_key, local_path).await
    }
}

/// Smoke-test write access to a bucket by uploading a throwaway marker file
pub async fn test_upload_permissions(
    client: &ObjectStoreClient,
    bucket_spec: &str,
) -> ArtifactResult<()> {
    let marker = tempfile::Builder::new()
        .prefix("stemcell-permissions-tempfile")
        .tempfile()
        .map_err(|e| ArtifactError::io("creating upload permissions marker", e))?;

    client
        .put(bucket_spec, UPLOAD_PERMISSIONS_KEY, marker.path())
        .await?;
    info!("Upload permissions verified for {}", bucket_spec);
    Ok(())
}
