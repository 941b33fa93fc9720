mod dev_server;
mod layout_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use limelight_core::LayoutMode;
use limelight_server::{SelfStagePolicy, StageConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "limelight")]
#[command(about = "Stage membership and layout tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the stage HTTP endpoints over an in-memory room service.
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[arg(long)]
        retry_attempts: Option<u32>,

        #[arg(long)]
        retry_base_ms: Option<u64>,

        /// host_only or anyone
        #[arg(long)]
        self_stage: Option<SelfStagePolicy>,

        #[arg(long)]
        host_secret: Option<String>,
    },
    /// Print the layout for a set of stage members given as identity:caps.
    Layout {
        #[arg(short, long, default_value = "grid")]
        mode: LayoutMode,

        members: Vec<String>,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            retry_attempts,
            retry_base_ms,
            self_stage,
            host_secret,
        } => {
            init_tracing();

            let mut config = StageConfig::from_env();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(attempts) = retry_attempts.filter(|a| *a > 0) {
                config.retry.max_attempts = attempts;
            }
            if let Some(ms) = retry_base_ms {
                config.retry.base_delay = Duration::from_millis(ms);
            }
            if let Some(policy) = self_stage {
                config.self_stage = policy;
            }
            if host_secret.is_some() {
                config.host_secret = host_secret;
            }

            println!(
                "{} {}",
                "Limelight stage server on".green().bold(),
                config.bind_addr
            );
            dev_server::run(config).await?;
        }
        Commands::Layout { mode, members } => {
            layout_cmd::run(mode, &members)?;
        }
    }

    Ok(())
}
