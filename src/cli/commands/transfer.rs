//! Object store commands - list, get, put, upload, check-upload

use super::{output_bucket, store_client};
use crate::cli::args::{CheckUploadArgs, GetArgs, ListArgs, PutArgs, UploadArgs};
use crate::config::Config;
use crate::error::{ArtifactError, ArtifactResult};
use crate::store::test_upload_permissions;
use console::style;
use std::path::Path;

/// Execute the list command
pub async fn list(args: ListArgs, config: &Config) -> ArtifactResult<()> {
    let keys = store_client(config).list(&args.bucket).await?;
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

/// Execute the get command
pub async fn get(args: GetArgs, config: &Config) -> ArtifactResult<()> {
    let path = store_client(config)
        .get(&args.bucket, &args.key, &args.path)
        .await?;
    println!("{}", path.display());
    Ok(())
}

/// Execute the put command
pub async fn put(args: PutArgs, config: &Config) -> ArtifactResult<()> {
    ensure_file(&args.path)?;
    store_client(config)
        .put(&args.bucket, &args.key, &args.path)
        .await?;
    println!("{} uploaded {}", style("✓").green(), args.path.display());
    Ok(())
}

/// Execute the upload command
pub async fn upload(args: UploadArgs, config: &Config) -> ArtifactResult<()> {
    let bucket = output_bucket(config)?;
    ensure_file(&args.path)?;
    let key = match args.key {
        Some(key) => key,
        None => default_key(&args.path)?,
    };

    store_client(config).put(bucket, &key, &args.path).await?;
    println!(
        "{} uploaded {} to {}",
        style("✓").green(),
        args.path.display(),
        bucket
    );
    Ok(())
}

/// Execute the check-upload command
pub async fn check_upload(args: CheckUploadArgs, config: &Config) -> ArtifactResult<()> {
    let bucket = match args.bucket.as_deref() {
        Some(bucket) => bucket,
        None => output_bucket(config)?,
    };

    test_upload_permissions(&store_client(config), bucket).await?;
    println!("{} can upload to {}", style("✓").green(), bucket);
    Ok(())
}

fn ensure_file(path: &Path) -> ArtifactResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::io(
            format!("reading {}", path.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
        ))
    }
}

fn default_key(path: &Path) -> ArtifactResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            ArtifactError::Internal(format!("cannot derive a key from {}", path.display()))
        })
}
