//! stemcell-artifacts - VMX artifact cache for stemcell builds
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use stemcell_artifacts::cli::{Cli, Commands, LogFormat};
use stemcell_artifacts::config::ConfigManager;
use stemcell_artifacts::error::ArtifactResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ArtifactResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = info (object store progress), 1 = debug, 2+ = trace
    let filter = match cli.verbose {
        0 => EnvFilter::new("stemcell_artifacts=info"),
        1 => EnvFilter::new("stemcell_artifacts=debug"),
        _ => EnvFilter::new("stemcell_artifacts=trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => subscriber.without_time().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    // Load configuration, then layer flags and environment on top
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let (mut config, source) = config_manager.load().await?;
    cli.apply_overrides(&mut config);
    debug!("Loaded configuration from {}", source);

    // Dispatch to command
    match cli.command {
        Commands::Fetch(args) => stemcell_artifacts::cli::commands::fetch(args, &config).await,
        Commands::List(args) => stemcell_artifacts::cli::commands::list(args, &config).await,
        Commands::Get(args) => stemcell_artifacts::cli::commands::get(args, &config).await,
        Commands::Put(args) => stemcell_artifacts::cli::commands::put(args, &config).await,
        Commands::Upload(args) => stemcell_artifacts::cli::commands::upload(args, &config).await,
        Commands::CheckUpload(args) => {
            stemcell_artifacts::cli::commands::check_upload(args, &config).await
        }
        Commands::Cache(args) => stemcell_artifacts::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            stemcell_artifacts::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
