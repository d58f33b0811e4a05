//! In-memory object store
//!
//! Used by tests and dry runs in place of a real bucket.

use crate::error::{ArtifactError, ArtifactResult};
use crate::store::backend::ObjectBackend;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::fs;

type ObjectMap = BTreeMap<(String, String), Vec<u8>>;

/// Object store backed by a map of `(bucket, key)` to bytes
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: Mutex<ObjectMap>,
    downloads: AtomicUsize,
    uploads: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object under a resolved bucket and full key
    pub fn insert(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.lock()
            .insert((bucket.to_string(), key.to_string()), data);
    }

    /// Read back an object, if present
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of download calls made, successful or not
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Number of upload calls made, successful or not
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ObjectMap> {
        // A poisoned map still holds consistent data; every write is a single insert
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> ArtifactResult<Vec<String>> {
        Ok(self
            .lock()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> ArtifactResult<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);

        let data = self
            .object(bucket, key)
            .ok_or_else(|| ArtifactError::remote("get", format!("{}:{}", bucket, key), "NoSuchKey"))?;

        fs::write(dest, data)
            .await
            .map_err(|e| ArtifactError::io(format!("writing {}", dest.display()), e))
    }

    async fn upload(&self, bucket: &str, key: &str, src: &Path) -> ArtifactResult<()> {
        self.uploads.fetch_add(1, Ordering::SeqCst);

        let data = fs::read(src)
            .await
            .map_err(|e| ArtifactError::io(format!("reading {}", src.display()), e))?;
        self.insert(bucket, key, data);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
