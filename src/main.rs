mod app;

use anyhow::Result;
use clap::Parser;

use app::{Cli, Command, run_match_command, run_update_command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Match(args) => {
            run_match_command(args)?;
        }
        Command::Update(args) => {
            run_update_command(args)?;
        }
    }

    Ok(())
}
