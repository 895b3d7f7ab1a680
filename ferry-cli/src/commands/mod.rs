//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod descriptor;
mod init;
mod source;

pub use descriptor::LayoutArgs;
pub use init::InitCommands;
pub use source::SourceCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse and structurally validate a descriptor manifest
    Validate {
        /// Path to the Lua manifest
        manifest: String,
    },
    /// Compose a descriptor and render the deployment template and build spec
    Synth {
        /// Path to the Lua manifest
        manifest: String,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Directory to write template.json and buildspec.yml into (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compose a descriptor and print what it is made of
    Describe {
        /// Path to the Lua manifest
        manifest: String,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Print the descriptor as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the application id, default domain and branch URLs
    Outputs {
        /// Path to the Lua manifest
        manifest: String,

        /// Print outputs as JSON
        #[arg(long)]
        json: bool,
    },
    /// Source repository diagnostics
    Source {
        #[command(subcommand)]
        command: SourceCommands,
    },
    /// Initialize development environment
    Init {
        #[command(subcommand)]
        command: InitCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Validate { manifest } => descriptor::validate(&manifest),
        Commands::Synth {
            manifest,
            layout,
            output,
        } => descriptor::synth(&manifest, &layout, output.as_deref(), config).await,
        Commands::Describe {
            manifest,
            layout,
            json,
        } => descriptor::describe(&manifest, &layout, json, config).await,
        Commands::Outputs { manifest, json } => descriptor::outputs(&manifest, json, config),
        Commands::Source { command } => source::handle_source_command(command).await,
        Commands::Init { command } => init::handle_init_command(command),
    }
}
