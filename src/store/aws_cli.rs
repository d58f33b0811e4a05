//! S3 transport using the AWS CLI
//!
//! Credentials, retries and timeouts are whatever the CLI's own
//! configuration says; this module only builds `aws s3api` invocations.

use crate::config::schema::StoreConfig;
use crate::error::{ArtifactError, ArtifactResult};
use crate::store::backend::ObjectBackend;
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Object store transport that shells out to `aws s3api`
#[derive(Debug, Clone, Default)]
pub struct AwsCliStore {
    endpoint: Option<String>,
    profile: Option<String>,
    region: Option<String>,
}

impl AwsCliStore {
    /// Create a store from the `[store]` configuration section
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone().filter(|e| !e.is_empty()),
            profile: config.profile.clone(),
            region: config.region.clone(),
        }
    }

    /// Global arguments appended to every invocation
    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(endpoint) = &self.endpoint {
            args.extend(["--endpoint-url".to_string(), endpoint.clone()]);
        }
        if let Some(profile) = &self.profile {
            args.extend(["--profile".to_string(), profile.clone()]);
        }
        if let Some(region) = &self.region {
            args.extend(["--region".to_string(), region.clone()]);
        }
        args
    }

    /// Run `aws s3api <args>` and fail with a remote error on non-zero exit
    async fn exec(&self, operation: &str, target: &str, args: &[String]) -> ArtifactResult<Output> {
        let mut cmd = Command::new("aws");
        cmd.arg("s3api").args(args).args(self.global_args());
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        debug!("Executing: aws s3api {:?}", args);

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ArtifactError::CliNotFound {
                    name: "aws".to_string(),
                    hint: "The S3 transport requires the AWS CLI on PATH.".to_string(),
                }
            } else {
                ArtifactError::command_failed(format!("aws s3api {}", args.join(" ")), e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ArtifactError::remote(operation, target, stderr.trim()));
        }

        Ok(output)
    }
}

#[async_trait]
impl ObjectBackend for AwsCliStore {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> ArtifactResult<Vec<String>> {
        let mut args = vec![
            "list-objects-v2".to_string(),
            "--bucket".to_string(),
            bucket.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        if !prefix.is_empty() {
            args.extend(["--prefix".to_string(), prefix.to_string()]);
        }

        let target = format!("{}:{}", bucket, prefix);
        let output = self.exec("list", &target, &args).await?;
        parse_list_output(&output.stdout)
            .map_err(|e| ArtifactError::remote("list", target, format!("unreadable listing: {}", e)))
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> ArtifactResult<()> {
        let args = vec![
            "get-object".to_string(),
            "--bucket".to_string(),
            bucket.to_string(),
            "--key".to_string(),
            key.to_string(),
            dest.display().to_string(),
        ];

        self.exec("get", &format!("{}:{}", bucket, key), &args)
            .await
            .map(|_| ())
    }

    async fn upload(&self, bucket: &str, key: &str, src: &Path) -> ArtifactResult<()> {
        let args = vec![
            "put-object".to_string(),
            "--bucket".to_string(),
            bucket.to_string(),
            "--key".to_string(),
            key.to_string(),
            "--body".to_string(),
            src.display().to_string(),
        ];

        self.exec("put", &format!("{}:{}", bucket, key), &args)
            .await
            .map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "aws-cli"
    }
}

/// Extract object keys from `list-objects-v2` JSON output.
///
/// The CLI prints nothing at all for an empty listing.
fn parse_list_output(stdout: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let response: ListObjectsResponse = serde_json::from_slice(stdout)?;
    Ok(response
        .contents
        .unwrap_or_default()
        .into_iter()
        .map(|object| object.key)
        .collect())
}

#[derive(Deserialize)]
struct ListObjectsResponse {
    #[serde(rename = "Contents")]
    contents: Option<Vec<ListedObject>>,
}

#[derive(Deserialize)]
struct ListedObject {
    #[serde(rename = "Key")]
    key: String,
}
