//! Integration tests for stemcell-artifacts

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary isolated from the caller's config file and environment
    fn artifacts(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("stemcell-artifacts");
        cmd.env_remove("VMX_CACHE_DIR")
            .env_remove("INPUT_BUCKET")
            .env_remove("OUTPUT_BUCKET")
            .env_remove("S3_ENDPOINT")
            .env("STEMCELL_ARTIFACTS_CONFIG", temp.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("VMX artifact cache"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("stemcell-artifacts"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_includes_overrides() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .env("INPUT_BUCKET", "inputs/vmx")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("inputs/vmx"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());
    }

    #[test]
    fn fetch_invalid_version() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .args(["fetch", "abc.0.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid version"));
    }

    #[test]
    fn fetch_without_input_bucket() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .args(["fetch", "2.0.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No bucket configured for input"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("vmx");
        artifacts(&temp)
            .arg("--cache-dir")
            .arg(&cache_dir)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached artifacts"));
    }

    #[test]
    fn cache_list_json_and_clear() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("vmx");
        std::fs::create_dir_all(cache_dir.join("2")).unwrap();
        std::fs::write(cache_dir.join("vmx-v2.tgz"), b"").unwrap();

        artifacts(&temp)
            .env("VMX_CACHE_DIR", &cache_dir)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"entry\""))
            .stdout(predicate::str::contains("\"archive\""));

        artifacts(&temp)
            .env("VMX_CACHE_DIR", &cache_dir)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared 2 item(s)"));

        assert!(!cache_dir.join("2").exists());
        assert!(!cache_dir.join("vmx-v2.tgz").exists());
    }

    #[test]
    fn upload_without_output_bucket() {
        let temp = TempDir::new().unwrap();
        artifacts(&temp)
            .args(["check-upload"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No bucket configured for output"));
    }
}

mod cache_tests {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::path::Path;
    use std::sync::Arc;
    use stemcell_artifacts::cache::VersionedArtifactCache;
    use stemcell_artifacts::store::{MemoryBackend, ObjectStoreClient};
    use stemcell_artifacts::ArtifactError;
    use tempfile::TempDir;

    const INPUT: &str = "some-input-bucket";
    const OUTPUT: &str = "some-output-bucket";

    fn vmx_tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let data: &[u8] = b".encoding = \"UTF-8\"\nconfig.version = \"8\"\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "image.vmx", data).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn cache_in(root: &Path, backend: &Arc<MemoryBackend>) -> VersionedArtifactCache {
        VersionedArtifactCache::new(ObjectStoreClient::new(backend.clone()), root, INPUT)
            .unwrap()
            .with_output_bucket(OUTPUT)
    }

    #[tokio::test]
    async fn picks_the_correct_version() {
        let temp = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(INPUT, "vmx-v2.tgz", vmx_tarball());

        let file = cache_in(temp.path(), &backend).fetch("2.0.0").await.unwrap();

        assert_eq!(file, temp.path().join("2").join("image.vmx"));
        assert!(file.is_file());
    }

    #[tokio::test]
    async fn deletes_older_versions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for v in ["1", "2", "4"] {
            std::fs::create_dir_all(root.join(v)).unwrap();
            std::fs::write(root.join(format!("vmx-v{}.tgz", v)), b"").unwrap();
        }
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(INPUT, "vmx-v3.tgz", vmx_tarball());

        let file = cache_in(root, &backend).fetch("3.0.0").await.unwrap();

        assert_eq!(file, root.join("3").join("image.vmx"));
        assert!(!root.join("1").is_dir());
        assert!(!root.join("2").is_dir());
        assert!(root.join("3").is_dir());
        assert!(root.join("4").is_dir());
        assert!(!root.join("vmx-v1.tgz").exists());
        assert!(!root.join("vmx-v2.tgz").exists());
        assert!(root.join("vmx-v3.tgz").exists());
        assert!(root.join("vmx-v4.tgz").exists());
    }

    #[tokio::test]
    async fn fetch_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(INPUT, "vmx-v2.tgz", vmx_tarball());
        let cache = cache_in(temp.path(), &backend);

        let first = cache.fetch("2.0.0").await.unwrap();
        let second = cache.fetch("2.0.0").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.download_count(), 1);
    }

    #[tokio::test]
    async fn non_numeric_major_fails_without_io() {
        let temp = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());

        let err = cache_in(temp.path(), &backend)
            .fetch("abc.0.0")
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::InvalidVersion { .. }));
        assert_eq!(backend.download_count(), 0);
    }

    #[tokio::test]
    async fn fetches_from_prefixed_input_bucket() {
        let temp = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("stemcells", "vsphere/vmx/vmx-v6.tgz", vmx_tarball());

        let cache = VersionedArtifactCache::new(
            ObjectStoreClient::new(backend.clone()),
            temp.path(),
            "stemcells/vsphere/vmx",
        )
        .unwrap();

        let file = cache.fetch("6.2.0").await.unwrap();
        assert_eq!(file, temp.path().join("6").join("image.vmx"));
    }

    #[tokio::test]
    async fn download_failure_is_distinct_from_corruption() {
        let temp = TempDir::new().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(INPUT, "vmx-v8.tgz", b"truncated download".to_vec());
        let cache = cache_in(temp.path(), &backend);

        let missing = cache.fetch("7.0.0").await.unwrap_err();
        let corrupt = cache.fetch("8.0.0").await.unwrap_err();

        assert!(missing.is_remote() && !missing.is_corrupt());
        assert!(corrupt.is_corrupt() && !corrupt.is_remote());
    }
}
