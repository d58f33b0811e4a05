//! CLI argument definitions using clap derive

use crate::config::Config;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stemcell-artifacts - VMX artifact cache for stemcell builds
///
/// Fetches versioned VMX template bundles from object storage into a local
/// cache and moves build artifacts between buckets and local disk.
#[derive(Parser, Debug)]
#[command(name = "stemcell-artifacts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STEMCELL_ARTIFACTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory
    #[arg(long, global = true, env = "VMX_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Bucket specifier artifacts are fetched from
    #[arg(long, global = true, env = "INPUT_BUCKET")]
    pub input_bucket: Option<String>,

    /// Bucket specifier build outputs are uploaded to
    #[arg(long, global = true, env = "OUTPUT_BUCKET")]
    pub output_bucket: Option<String>,

    /// Custom S3 endpoint URL
    #[arg(long, global = true, env = "S3_ENDPOINT")]
    pub endpoint: Option<String>,
}

impl Cli {
    /// Layer command-line and environment overrides on top of the file config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        if let Some(bucket) = &self.input_bucket {
            config.cache.input_bucket = Some(bucket.clone());
        }
        if let Some(bucket) = &self.output_bucket {
            config.cache.output_bucket = Some(bucket.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.store.endpoint = Some(endpoint.clone());
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ensure a VMX version is cached and print its payload path
    Fetch(FetchArgs),

    /// List object keys under a bucket specifier
    List(ListArgs),

    /// Download an object to a local path
    Get(GetArgs),

    /// Upload a local file to an object key
    Put(PutArgs),

    /// Upload a local file to the output bucket
    Upload(UploadArgs),

    /// Verify write access by uploading a marker object
    CheckUpload(CheckUploadArgs),

    /// Inspect or clear the local artifact cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Version to fetch (only the major component selects the artifact)
    #[arg(id = "vmx_version", value_name = "VERSION")]
    pub version: String,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Bucket specifier (`bucket` or `bucket/prefix`)
    pub bucket: String,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Bucket specifier (`bucket` or `bucket/prefix`)
    pub bucket: String,

    /// Object key, relative to the specifier's prefix
    pub key: String,

    /// Local destination (parent directories are created)
    pub path: PathBuf,
}

/// Arguments for the put command
#[derive(Parser, Debug)]
pub struct PutArgs {
    /// Bucket specifier (`bucket` or `bucket/prefix`)
    pub bucket: String,

    /// Object key, relative to the specifier's prefix
    pub key: String,

    /// Local file to upload
    pub path: PathBuf,
}

/// Arguments for the upload command
#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub path: PathBuf,

    /// Object key (defaults to the file name)
    #[arg(short, long)]
    pub key: Option<String>,
}

/// Arguments for the check-upload command
#[derive(Parser, Debug)]
pub struct CheckUploadArgs {
    /// Bucket specifier to test (defaults to the output bucket)
    pub bucket: Option<String>,
}

/// Output format for cache list
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one path per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached entries and archives
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove every cached entry and archive
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from(["stemcell-artifacts", "fetch", "2.0.0"]);
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.version, "2.0.0"),
            _ => panic!("expected Fetch command"),
        }
    }

    #[test]
    fn cli_parses_get() {
        let cli = Cli::parse_from([
            "stemcell-artifacts",
            "get",
            "bucket/with/slashes",
            "some-file-in-s3",
            "out/file",
        ]);
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.bucket, "bucket/with/slashes");
                assert_eq!(args.key, "some-file-in-s3");
                assert_eq!(args.path, PathBuf::from("out/file"));
            }
            _ => panic!("expected Get command"),
        }
    }

    #[test]
    fn cli_parses_cache_list_format() {
        let cli = Cli::parse_from(["stemcell-artifacts", "cache", "list", "--format", "json"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::List { format },
            }) => assert!(matches!(format, OutputFormat::Json)),
            _ => panic!("expected Cache List command"),
        }
    }

    #[test]
    fn cli_parses_check_upload_without_bucket() {
        let cli = Cli::parse_from(["stemcell-artifacts", "check-upload"]);
        match cli.command {
            Commands::CheckUpload(args) => assert!(args.bucket.is_none()),
            _ => panic!("expected CheckUpload command"),
        }
    }

    #[test]
    fn overrides_replace_file_values() {
        let cli = Cli::parse_from([
            "stemcell-artifacts",
            "--cache-dir",
            "/tmp/vmx",
            "--input-bucket",
            "inputs/vmx",
            "--endpoint",
            "https://minio.local",
            "fetch",
            "1",
        ]);
        let mut config = Config::default();
        config.cache.output_bucket = Some("outputs".to_string());

        cli.apply_overrides(&mut config);

        assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/vmx")));
        assert_eq!(config.cache.input_bucket.as_deref(), Some("inputs/vmx"));
        assert_eq!(config.cache.output_bucket.as_deref(), Some("outputs"));
        assert_eq!(config.store.endpoint.as_deref(), Some("https://minio.local"));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["stemcell-artifacts", "config"]);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_format, LogFormat::Text);

        let cli = Cli::parse_from(["stemcell-artifacts", "-vv", "--log-format", "json", "config"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
