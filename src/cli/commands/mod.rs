//! CLI command implementations

pub mod cache;
pub mod config;
pub mod fetch;
pub mod transfer;

pub use cache::execute as cache;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use transfer::{check_upload, get, list, put, upload};

use crate::cache::{ArtifactLayout, CacheRoot};
use crate::config::Config;
use crate::error::{ArtifactError, ArtifactResult};
use crate::store::{AwsCliStore, ObjectStoreClient};
use std::path::PathBuf;
use std::sync::Arc;

/// Object store client over the AWS CLI, configured from `[store]`
pub(crate) fn store_client(config: &Config) -> ObjectStoreClient {
    ObjectStoreClient::new(Arc::new(AwsCliStore::new(&config.store)))
}

/// Cache root from `[cache]`, falling back to `<user cache dir>/stemcell-artifacts/vmx`
pub(crate) fn cache_root(config: &Config) -> ArtifactResult<CacheRoot> {
    let dir = config.cache.dir.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stemcell-artifacts")
            .join("vmx")
    });
    CacheRoot::new(dir, ArtifactLayout::from_config(&config.cache))
}

/// Configured output bucket, required by upload commands
pub(crate) fn output_bucket(config: &Config) -> ArtifactResult<&str> {
    config
        .cache
        .output_bucket
        .as_deref()
        .ok_or(ArtifactError::BucketMissing("output"))
}
