//! Configuration management for stemcell-artifacts
//!
//! Settings come from a single TOML file. A missing file is not an error:
//! every field has a default and the bucket settings are usually supplied
//! by the environment of the build job.

pub mod schema;

pub use schema::Config;

use crate::error::{ArtifactError, ArtifactResult};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file existed at this path; built-in defaults apply
    Defaults(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults(path) => write!(f, "defaults ({} not found)", path.display()),
        }
    }
}

/// Reads and writes the config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Manager for an explicit config file
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<user config dir>/stemcell-artifacts/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stemcell-artifacts")
            .join("config.toml")
    }

    /// Config file this manager reads and writes
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read the config file, reporting whether it existed
    pub async fn load(&self) -> ArtifactResult<(Config, ConfigSource)> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok((
                    Config::default(),
                    ConfigSource::Defaults(self.config_path.clone()),
                ));
            }
            Err(e) => {
                return Err(ArtifactError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        let config = toml::from_str(&content).map_err(|e| ArtifactError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;
        Ok((config, ConfigSource::File(self.config_path.clone())))
    }

    /// Write a default config file.
    ///
    /// Returns `false` without touching the file when one already exists and
    /// `force` is not set.
    pub async fn write_defaults(&self, force: bool) -> ArtifactResult<bool> {
        let exists = fs::try_exists(&self.config_path).await.map_err(|e| {
            ArtifactError::io(format!("checking {}", self.config_path.display()), e)
        })?;
        if exists && !force {
            return Ok(false);
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ArtifactError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(&Config::default())?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            ArtifactError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Wrote default configuration to {}", self.config_path.display());
        Ok(true)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
