//! Configuration schema for stemcell-artifacts
//!
//! Configuration is stored at `~/.config/stemcell-artifacts/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Object store transport settings
    pub store: StoreConfig,

    /// Artifact cache settings
    pub cache: CacheConfig,
}

/// Object store settings, forwarded to the AWS CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Custom S3 endpoint URL (S3-compatible stores)
    pub endpoint: Option<String>,

    /// AWS profile to use
    pub profile: Option<String>,

    /// AWS region
    pub region: Option<String>,
}

/// Versioned artifact cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory (defaults to the user cache dir)
    pub dir: Option<PathBuf>,

    /// Bucket specifier artifacts are fetched from
    pub input_bucket: Option<String>,

    /// Bucket specifier build outputs are uploaded to
    pub output_bucket: Option<String>,

    /// Archive name prefix (`<prefix>-v<major>.<ext>`)
    pub artifact_prefix: String,

    /// Archive file extension
    pub archive_ext: String,

    /// Payload file inside each unpacked entry
    pub payload: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            input_bucket: None,
            output_bucket: None,
            artifact_prefix: "vmx".to_string(),
            archive_ext: "tgz".to_string(),
            payload: "image.vmx".to_string(),
        }
    }
}
