//! Source command handlers
//!
//! Reachability diagnostics for the repository a manifest points at.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use ferry_client::{GITHUB_API_URL, RepositoryProbe};
use ferry_composer::source::bind_source;
use std::fs;

/// Source subcommands
#[derive(Subcommand)]
pub enum SourceCommands {
    /// Check that the source repository of a manifest can be reached
    Check {
        /// Path to the Lua manifest
        manifest: String,

        /// Repository host API
        #[arg(long, env = "FERRY_SOURCE_API_URL", default_value = GITHUB_API_URL)]
        api_url: String,
    },
}

/// Handle source commands
pub async fn handle_source_command(command: SourceCommands) -> Result<()> {
    match command {
        SourceCommands::Check { manifest, api_url } => check_source(&manifest, &api_url).await,
    }
}

/// Probe the repository without reading the source token
async fn check_source(path: &str, api_url: &str) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest file: {}", path))?;
    let manifest = ferry_lua::parse_descriptor(&source)
        .with_context(|| format!("Failed to parse descriptor manifest {}", path))?;

    let binding = bind_source(&manifest.source);

    let probe = RepositoryProbe::new(api_url);
    match probe.check(&binding).await {
        Ok(summary) => {
            println!("{}", "✓ Source repository reachable".green().bold());
            println!("  Repository: {}", summary.full_name.cyan());
            println!(
                "  Visibility: {}",
                if summary.private { "private" } else { "public" }
            );
            if let Some(branch) = summary.default_branch {
                println!("  Default:    {}", branch.dimmed());
            }

            let branches: Vec<&str> = manifest
                .branches
                .iter()
                .map(|b| b.name.as_str())
                .collect();
            println!("  Declared:   {}", branches.join(", ").dimmed());
            Ok(())
        }
        Err(err) => {
            println!("{}", "✗ Source repository unreachable".red().bold());
            println!("  {}", err);
            Err(err.into())
        }
    }
}
