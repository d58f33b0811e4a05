//! Versioned artifact cache
//!
//! Keeps one unpacked copy per major version of a build dependency and
//! drops every version older than the one most recently requested.
//!
//! # Concurrency
//!
//! No locking is done. Two processes sharing one cache root can race: a
//! fetch of version N+1 may evict a directory a concurrent fetch of version
//! N is still writing. Callers must serialize access per cache root (one
//! build agent per directory, or an external lock).

use crate::cache::archive;
use crate::cache::eviction::{self, EvictionReport};
use crate::cache::layout::{ArtifactLayout, CacheRoot};
use crate::cache::version::parse_major;
use crate::error::{ArtifactError, ArtifactResult};
use crate::store::ObjectStoreClient;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Cache of unpacked artifacts keyed by major version
pub struct VersionedArtifactCache {
    client: ObjectStoreClient,
    root: CacheRoot,
    input_bucket: String,
    output_bucket: Option<String>,
}

impl VersionedArtifactCache {
    /// Create a cache rooted at `root` that fetches from `input_bucket`
    pub fn new(
        client: ObjectStoreClient,
        root: impl AsRef<Path>,
        input_bucket: impl Into<String>,
    ) -> ArtifactResult<Self> {
        Ok(Self {
            client,
            root: CacheRoot::new(root, ArtifactLayout::default())?,
            input_bucket: input_bucket.into(),
            output_bucket: None,
        })
    }

    /// Use a different archive naming scheme
    pub fn with_layout(mut self, layout: ArtifactLayout) -> Self {
        self.root = self.root.with_layout(layout);
        self
    }

    /// Record the bucket build outputs go to
    ///
    /// The cache itself never uploads; this is carried for callers.
    pub fn with_output_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.output_bucket = Some(bucket.into());
        self
    }

    /// Cache root directory
    pub fn root(&self) -> &CacheRoot {
        &self.root
    }

    /// Bucket artifacts are fetched from
    pub fn input_bucket(&self) -> &str {
        &self.input_bucket
    }

    /// Bucket build outputs are uploaded to, if configured
    pub fn output_bucket(&self) -> Option<&str> {
        self.output_bucket.as_deref()
    }

    /// Ensure the artifact for `version` is unpacked and return its payload.
    ///
    /// Only the major component of `version` matters. Older versions are
    /// evicted on every call, including cache hits.
    pub async fn fetch(&self, version: &str) -> ArtifactResult<PathBuf> {
        let major = parse_major(version)?;
        let payload = self.root.payload_path(major);

        if is_file(&payload).await {
            debug!("Cache hit for v{} at {}", major, payload.display());
        } else {
            self.populate(major).await?;
        }

        let report = eviction::sweep(&self.root, major).await;
        log_eviction(&report);

        if !is_file(&payload).await {
            return Err(ArtifactError::corrupt(
                self.root.archive_path(major),
                format!("{} missing after extraction", payload.display()),
            ));
        }

        Ok(payload)
    }

    /// Download and unpack the archive for `major`
    async fn populate(&self, major: u64) -> ArtifactResult<()> {
        let archive_name = self.root.layout().archive_name(major);
        let archive_path = self.root.archive_path(major);

        info!("Fetching {} into {}", archive_name, self.root.path().display());
        self.client
            .get(&self.input_bucket, &archive_name, &archive_path)
            .await?;

        self.install(major, &archive_path).await
    }

    /// Extract into a staging directory, then move it into place
    async fn install(&self, major: u64, archive_path: &Path) -> ArtifactResult<()> {
        let staging = self.root.staging_dir(major);
        let entry_dir = self.root.entry_dir(major);

        remove_dir_if_present(&staging).await?;

        let (src, dest) = (archive_path.to_path_buf(), staging.clone());
        let unpacked = tokio::task::spawn_blocking(move || archive::unpack(&src, &dest))
            .await
            .map_err(|e| ArtifactError::Internal(format!("extraction task failed: {}", e)))?;

        if let Err(e) = unpacked {
            discard_staging(&staging).await;
            return Err(e);
        }

        let Some(unpacked_root) = self.locate_payload_root(&staging, major).await else {
            discard_staging(&staging).await;
            return Err(ArtifactError::corrupt(
                archive_path,
                format!("archive does not contain {}", self.root.layout().payload.display()),
            ));
        };

        // A stale entry without a payload is replaced wholesale
        remove_dir_if_present(&entry_dir).await?;
        fs::rename(&unpacked_root, &entry_dir).await.map_err(|e| {
            ArtifactError::io(format!("moving extracted entry to {}", entry_dir.display()), e)
        })?;
        if unpacked_root != staging {
            discard_staging(&staging).await;
        }

        info!("Unpacked v{} into {}", major, entry_dir.display());
        Ok(())
    }

    /// Find where the payload landed in the staging directory.
    ///
    /// Archives either hold the payload at their top level or wrap it in a
    /// directory named after the major version.
    async fn locate_payload_root(&self, staging: &Path, major: u64) -> Option<PathBuf> {
        let payload = &self.root.layout().payload;
        let candidates = [staging.to_path_buf(), staging.join(major.to_string())];

        for candidate in candidates {
            if is_file(&candidate.join(payload)).await {
                return Some(candidate);
            }
        }
        None
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn remove_dir_if_present(path: &Path) -> ArtifactResult<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ArtifactError::io(format!("removing {}", path.display()), e)),
    }
}

async fn discard_staging(staging: &Path) {
    if let Err(e) = remove_dir_if_present(staging).await {
        warn!("Could not clean up {}: {}", staging.display(), e);
    }
}

fn log_eviction(report: &EvictionReport) {
    if !report.removed.is_empty() {
        info!("Evicted {} superseded cache item(s)", report.removed.len());
    }
    if !report.is_clean() {
        warn!(
            "Left {} superseded cache item(s) in place; the next fetch retries them",
            report.failed.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::sync::Arc;
    use tempfile::TempDir;

    const INPUT: &str = "some-input-bucket";

    fn tgz(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn setup() -> (Arc<MemoryBackend>, TempDir, VersionedArtifactCache) {
        let backend = Arc::new(MemoryBackend::new());
        let temp = TempDir::new().unwrap();
        let cache = VersionedArtifactCache::new(
            ObjectStoreClient::new(backend.clone()),
            temp.path(),
            INPUT,
        )
        .unwrap()
        .with_output_bucket("some-output-bucket");
        (backend, temp, cache)
    }

    #[tokio::test]
    async fn fetch_into_empty_cache() {
        let (backend, temp, cache) = setup();
        backend.insert(INPUT, "vmx-v2.tgz", tgz(&[("image.vmx", b"vmx")]));

        let path = cache.fetch("2.0.0").await.unwrap();

        assert_eq!(path, temp.path().join("2").join("image.vmx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"vmx");
        assert!(temp.path().join("vmx-v2.tgz").exists());
        assert!(!cache.root().staging_dir(2).exists());
        assert_eq!(cache.output_bucket(), Some("some-output-bucket"));
    }

    #[tokio::test]
    async fn fetch_accepts_version_wrapped_archive() {
        let (backend, temp, cache) = setup();
        backend.insert(INPUT, "vmx-v5.tgz", tgz(&[("5/image.vmx", b"vmx")]));

        let path = cache.fetch("5.1.0").await.unwrap();

        assert_eq!(path, temp.path().join("5").join("image.vmx"));
        assert!(!cache.root().staging_dir(5).exists());
    }

    #[tokio::test]
    async fn second_fetch_skips_download() {
        let (backend, _temp, cache) = setup();
        backend.insert(INPUT, "vmx-v2.tgz", tgz(&[("image.vmx", b"vmx")]));

        let first = cache.fetch("2.0.0").await.unwrap();
        let second = cache.fetch("2.3.1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.download_count(), 1);
    }

    #[tokio::test]
    async fn invalid_version_does_no_io() {
        let (backend, temp, cache) = setup();

        let err = cache.fetch("abc.0.0").await.unwrap_err();

        assert!(matches!(err, ArtifactError::InvalidVersion { .. }));
        assert_eq!(backend.download_count(), 0);
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_upstream_is_remote_error() {
        let (_backend, _temp, cache) = setup();

        let err = cache.fetch("9.0.0").await.unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn archive_without_payload_is_corrupt() {
        let (backend, temp, cache) = setup();
        backend.insert(INPUT, "vmx-v3.tgz", tgz(&[("readme.txt", b"no vmx here")]));

        let err = cache.fetch("3.0.0").await.unwrap_err();

        assert!(err.is_corrupt());
        assert!(!temp.path().join("3").exists());
        assert!(!cache.root().staging_dir(3).exists());
    }

    #[tokio::test]
    async fn stale_entry_without_payload_is_replaced() {
        let (backend, temp, cache) = setup();
        std::fs::create_dir_all(temp.path().join("2")).unwrap();
        std::fs::write(temp.path().join("2").join("leftover"), b"").unwrap();
        backend.insert(INPUT, "vmx-v2.tgz", tgz(&[("image.vmx", b"fresh")]));

        let path = cache.fetch("2.0.0").await.unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"fresh");
        assert!(!temp.path().join("2").join("leftover").exists());
    }

    #[tokio::test]
    async fn older_request_keeps_newer_entries() {
        let (backend, temp, cache) = setup();
        backend.insert(INPUT, "vmx-v1.tgz", tgz(&[("image.vmx", b"one")]));
        backend.insert(INPUT, "vmx-v4.tgz", tgz(&[("image.vmx", b"four")]));

        cache.fetch("4.0.0").await.unwrap();
        cache.fetch("1.0.0").await.unwrap();

        assert!(temp.path().join("4").join("image.vmx").exists());
        assert!(temp.path().join("1").join("image.vmx").exists());
        let versions: Vec<u64> = cache
            .root()
            .scan()
            .await
            .unwrap()
            .iter()
            .map(|i| i.version)
            .collect();
        assert_eq!(versions, vec![1, 1, 4, 4]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn eviction_failure_does_not_fail_fetch() {
        use std::os::unix::fs::PermissionsExt;

        let (backend, temp, cache) = setup();
        let stuck = temp.path().join("1");
        std::fs::create_dir_all(&stuck).unwrap();
        std::fs::write(stuck.join("image.vmx"), b"old").unwrap();
        std::fs::set_permissions(&stuck, std::fs::Permissions::from_mode(0o555)).unwrap();
        backend.insert(INPUT, "vmx-v3.tgz", tgz(&[("image.vmx", b"new")]));

        // Privileged users delete through the mode bits
        if std::fs::write(stuck.join("writable"), b"").is_ok() {
            return;
        }

        let path = cache.fetch("3.0.0").await;
        let report = eviction::sweep(cache.root(), 3).await;
        std::fs::set_permissions(&stuck, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(path.unwrap(), temp.path().join("3").join("image.vmx"));
        assert!(stuck.join("image.vmx").exists());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0.path, stuck);
    }

    #[tokio::test]
    async fn custom_layout() {
        let (backend, temp, cache) = setup();
        let cache = cache.with_layout(ArtifactLayout {
            prefix: "ova".to_string(),
            ext: "tar.gz".to_string(),
            payload: PathBuf::from("template/image.ova"),
        });
        backend.insert(INPUT, "ova-v7.tar.gz", tgz(&[("template/image.ova", b"ova")]));

        let path = cache.fetch("7").await.unwrap();

        assert_eq!(path, temp.path().join("7").join("template").join("image.ova"));
    }
}
