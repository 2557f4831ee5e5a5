mod cli;
mod commands;
mod cuts;
mod error;
mod mcp;
mod pdf;
mod session;
mod splitter;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the MCP transport, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfslice=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Preview {
            path,
            page,
            cut,
            width,
            output,
        } => {
            commands::preview::run(&path, page, &cut, width, &output)?;
        }
        Commands::Split { path, cut, output } => {
            commands::split::run(&path, &cut, output)?;
        }
    }

    Ok(())
}
