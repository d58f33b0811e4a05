//! Cache command - inspect or clear the local artifact cache

use super::cache_root;
use crate::cache::{CacheItem, CacheRoot, ItemKind};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::ArtifactResult;
use console::style;
use std::io::{self, Write};

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> ArtifactResult<()> {
    let root = cache_root(config)?;

    match args.action {
        CacheAction::List { format } => list_items(&root, format).await,
        CacheAction::Clear { yes } => clear_items(&root, yes).await,
    }
}

/// List versioned items in the cache root
async fn list_items(root: &CacheRoot, format: OutputFormat) -> ArtifactResult<()> {
    let items = root.scan().await?;

    match format {
        OutputFormat::Table => print_table(root, &items),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Plain => {
            for item in &items {
                println!("{}", item.path.display());
            }
        }
    }

    Ok(())
}

fn print_table(root: &CacheRoot, items: &[CacheItem]) {
    if items.is_empty() {
        println!("No cached artifacts in {}", root.path().display());
        return;
    }

    println!("{:<10} {:<10} PATH", "VERSION", "KIND");
    println!("{}", "-".repeat(60));

    for item in items {
        let kind = match item.kind {
            ItemKind::Entry => style("entry").green().to_string(),
            ItemKind::Archive => style("archive").cyan().to_string(),
            ItemKind::Partial => style("partial").yellow().to_string(),
        };
        println!("{:<10} {:<10} {}", item.version, kind, item.path.display());
    }

    println!();
    println!("Total: {} item(s)", items.len());
}

/// Remove every versioned item from the cache root
async fn clear_items(root: &CacheRoot, skip_confirm: bool) -> ArtifactResult<()> {
    let items = root.scan().await?;

    if items.is_empty() {
        println!("No cached artifacts to clear.");
        return Ok(());
    }

    println!("This will remove {} cached item(s):", items.len());
    for item in &items {
        println!("  {} {}", style("•").red(), item.path.display());
    }
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = root.clear().await?;
    println!("{} cleared {} item(s)", style("✓").green(), removed);

    Ok(())
}
