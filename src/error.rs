//! Error types for stemcell-artifacts
//!
//! All modules use `ArtifactResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for artifact operations
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// All errors that can occur while moving or caching artifacts
#[derive(Error, Debug)]
pub enum ArtifactError {
    // Version errors
    #[error("Invalid version {version:?}: {reason}")]
    InvalidVersion { version: String, reason: String },

    // Object store errors
    #[error("Object store {operation} failed for {target}: {reason}")]
    RemoteIo {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("Required CLI not found: {name}. {hint}")]
    CliNotFound { name: String, hint: String },

    // Cache errors
    #[error("Corrupt archive {archive}: {reason}")]
    CorruptArchive { archive: PathBuf, reason: String },

    #[error("No bucket configured for {0}")]
    BucketMissing(&'static str),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArtifactError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an object store error
    pub fn remote(
        operation: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RemoteIo {
            operation: operation.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt archive error
    pub fn corrupt(archive: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    /// The artifact could not be fetched from the object store
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteIo { .. } | Self::CliNotFound { .. })
    }

    /// The artifact was fetched but could not be unpacked into a usable entry
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptArchive { .. })
    }

    /// Check if error is retryable.
    ///
    /// Nothing in this crate retries; this only tells callers which
    /// failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteIo { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion { .. } => Some("Pass a version like 2.0.0 (major must be an integer)"),
            Self::CliNotFound { .. } => Some("Install the AWS CLI: https://aws.amazon.com/cli/"),
            Self::CorruptArchive { .. } => {
                Some("Check the uploaded archive; the cached copy will be replaced on the next fetch")
            }
            Self::BucketMissing(_) => Some("Set it in the config file or via the environment"),
            _ => None,
        }
    }
}
