//! Fetch command - ensure a VMX version is cached

use super::{cache_root, store_client};
use crate::cache::{parse_major, VersionedArtifactCache};
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{ArtifactError, ArtifactResult};
use tracing::debug;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ArtifactResult<()> {
    // Reject bad versions before touching configuration or disk
    parse_major(&args.version)?;

    let input_bucket = config
        .cache
        .input_bucket
        .as_deref()
        .ok_or(ArtifactError::BucketMissing("input"))?;
    let root = cache_root(config)?;
    let client = store_client(config);
    debug!(
        "Using cache root {} over {} transport",
        root.path().display(),
        client.backend_name()
    );

    let mut cache = VersionedArtifactCache::new(client, root.path(), input_bucket)?
        .with_layout(root.layout().clone());
    if let Some(output) = &config.cache.output_bucket {
        cache = cache.with_output_bucket(output.clone());
    }

    let payload = cache.fetch(&args.version).await?;
    println!("{}", payload.display());
    Ok(())
}
