//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::ArtifactResult;
use console::style;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> ArtifactResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> ArtifactResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ArtifactResult<()> {
    let path = manager.path().display();

    if manager.write_defaults(force).await? {
        println!("{} Configuration initialized at {}", style("✓").green(), path);
    } else {
        println!("{} Config already exists at {}", style("!").yellow(), path);
        println!("  Use --force to overwrite");
    }

    Ok(())
}
