mod agent;
mod cache;
mod cli;
mod config;
mod error;
mod executor;
mod format;
mod fsm;
mod intent;
mod model;
mod prompt;
mod repository;
mod store;
mod vector;
mod verifier;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => cli::handle_build_command(args).await,
        Commands::Modify {
            build,
            prompt,
            skip_quality_check,
        } => cli::handle_modify_command(build, prompt, skip_quality_check).await,
    }
}
