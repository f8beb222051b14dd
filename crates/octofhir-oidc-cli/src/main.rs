mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    let config = config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Discover(args) => commands::discover::discover(&config, args).await?,
        Commands::Authorize(args) => commands::authorize::authorize(&config, args).await?,
        Commands::Validate(args) => commands::validate::validate(&config, args).await?,
    }

    Ok(())
}
