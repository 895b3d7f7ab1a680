//! Ferry CLI
//!
//! Command-line interface for composing hosted-frontend deployment
//! descriptors from Lua manifests.
//!
//! Rendered documents go to stdout or files; logs go to stderr.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Hosted frontend deployment descriptor composer", long_about = None)]
struct Cli {
    /// Parameter store URL
    #[arg(long, global = true, env = "FERRY_PARAMETER_STORE_URL")]
    store_url: Option<String>,

    /// JSON file of parameter values, used instead of a store URL
    #[arg(long, global = true, env = "FERRY_PARAMETERS_FILE")]
    parameters_file: Option<String>,

    /// Target account id
    #[arg(long, global = true, env = "FERRY_ACCOUNT")]
    account: Option<String>,

    /// Target region
    #[arg(long, global = true, env = "FERRY_REGION")]
    region: Option<String>,

    /// Target partition
    #[arg(long, global = true, env = "FERRY_PARTITION", default_value = "aws")]
    partition: String,

    /// Parameter store request timeout in seconds
    #[arg(long, global = true, env = "FERRY_STORE_TIMEOUT", default_value = "10")]
    store_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry=info,ferry_composer=info,ferry_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        store_url: cli.store_url,
        parameters_file: cli.parameters_file,
        account: cli.account,
        region: cli.region,
        partition: cli.partition,
        store_timeout_secs: cli.store_timeout,
    };

    handle_command(cli.command, &config).await
}
