//! On-disk layout of the cache root
//!
//! ```text
//! <root>/
//!   vmx-v2.tgz        # archive as downloaded
//!   vmx-v4.tgz
//!   2/image.vmx       # unpacked entry, named by major version
//!   4/image.vmx
//!   .5.partial/       # extraction in progress (or interrupted)
//! ```

use crate::config::schema::CacheConfig;
use crate::error::{ArtifactError, ArtifactResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Naming scheme for archives and payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Archive name prefix
    pub prefix: String,
    /// Archive extension (gzip-compressed tar)
    pub ext: String,
    /// Payload path relative to an unpacked entry
    pub payload: PathBuf,
}

impl ArtifactLayout {
    /// Layout for VMX template bundles: `vmx-v<N>.tgz` holding `image.vmx`
    pub fn vmx() -> Self {
        Self {
            prefix: "vmx".to_string(),
            ext: "tgz".to_string(),
            payload: PathBuf::from("image.vmx"),
        }
    }

    /// Layout from the `[cache]` configuration section
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            prefix: config.artifact_prefix.clone(),
            ext: config.archive_ext.clone(),
            payload: PathBuf::from(&config.payload),
        }
    }

    /// Archive file name for a major version
    pub fn archive_name(&self, major: u64) -> String {
        format!("{}-v{}.{}", self.prefix, major, self.ext)
    }

    /// Version embedded in an archive file name, if it matches the pattern
    pub fn archive_version(&self, file_name: &str) -> Option<u64> {
        let version = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix("-v")?
            .strip_suffix(self.ext.as_str())?
            .strip_suffix('.')?;
        parse_decimal(version)
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::vmx()
    }
}

/// Parse a plain run of ASCII digits
pub(crate) fn parse_decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Kind of versioned item found in the cache root
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Unpacked entry directory
    Entry,
    /// Downloaded archive file
    Archive,
    /// Leftover staging directory from an extraction
    Partial,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => write!(f, "entry"),
            Self::Archive => write!(f, "archive"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

/// One versioned item in the cache root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheItem {
    /// Major version the item belongs to
    pub version: u64,
    /// What the item is
    pub kind: ItemKind,
    /// Absolute path of the item
    pub path: PathBuf,
}

/// The cache root directory and the paths derived from it
#[derive(Debug, Clone)]
pub struct CacheRoot {
    path: PathBuf,
    layout: ArtifactLayout,
}

impl CacheRoot {
    /// Anchor a layout at `path`, made absolute against the current directory
    pub fn new(path: impl AsRef<Path>, layout: ArtifactLayout) -> ArtifactResult<Self> {
        let path = path.as_ref();
        let path = std::path::absolute(path)
            .map_err(|e| ArtifactError::io(format!("resolving cache root {}", path.display()), e))?;
        Ok(Self { path, layout })
    }

    /// Same root under a different naming scheme
    pub fn with_layout(self, layout: ArtifactLayout) -> Self {
        Self {
            path: self.path,
            layout,
        }
    }

    /// Root directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Naming scheme in use
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Unpacked entry directory for a major version
    pub fn entry_dir(&self, major: u64) -> PathBuf {
        self.path.join(major.to_string())
    }

    /// Downloaded archive path for a major version
    pub fn archive_path(&self, major: u64) -> PathBuf {
        self.path.join(self.layout.archive_name(major))
    }

    /// Payload file inside the entry for a major version
    pub fn payload_path(&self, major: u64) -> PathBuf {
        self.entry_dir(major).join(&self.layout.payload)
    }

    /// Staging directory used while extracting a major version
    pub fn staging_dir(&self, major: u64) -> PathBuf {
        self.path.join(format!(".{}.partial", major))
    }

    /// Classify a directory entry name
    fn classify(&self, name: &str, is_dir: bool) -> Option<(u64, ItemKind)> {
        if is_dir {
            if let Some(version) = parse_decimal(name) {
                return Some((version, ItemKind::Entry));
            }
            let staged = name.strip_prefix('.')?.strip_suffix(".partial")?;
            return parse_decimal(staged).map(|v| (v, ItemKind::Partial));
        }
        self.layout
            .archive_version(name)
            .map(|v| (v, ItemKind::Archive))
    }

    /// Snapshot every versioned item directly under the root.
    ///
    /// A missing root is an empty cache. Unrecognized names are skipped.
    pub async fn scan(&self) -> ArtifactResult<Vec<CacheItem>> {
        let mut items = Vec::new();

        let mut entries = match fs::read_dir(&self.path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(items),
            Err(e) => {
                return Err(ArtifactError::io(
                    format!("reading cache root {}", self.path.display()),
                    e,
                ))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ArtifactError::io("reading cache entry", e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| ArtifactError::io(format!("inspecting {}", name), e))?;
            if file_type.is_symlink() {
                continue;
            }

            if let Some((version, kind)) = self.classify(&name, file_type.is_dir()) {
                items.push(CacheItem {
                    version,
                    kind,
                    path: entry.path(),
                });
            }
        }

        items.sort_by(|a, b| (a.version, a.kind).cmp(&(b.version, b.kind)));
        Ok(items)
    }

    /// Remove every versioned item, returning how many were removed
    pub async fn clear(&self) -> ArtifactResult<usize> {
        let items = self.scan().await?;
        for item in &items {
            remove_item(item)
                .await
                .map_err(|e| ArtifactError::io(format!("removing {}", item.path.display()), e))?;
        }
        Ok(items.len())
    }
}

/// Delete a single cache item from disk
pub(crate) async fn remove_item(item: &CacheItem) -> std::io::Result<()> {
    match item.kind {
        ItemKind::Entry | ItemKind::Partial => fs::remove_dir_all(&item.path).await,
        ItemKind::Archive => fs::remove_file(&item.path).await,
    }
}
