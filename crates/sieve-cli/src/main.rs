mod batch;
mod commands;
mod config;
mod discover;
mod error;
mod format;
mod inline;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Command, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(&cli)?;
    tracing::debug!("Config: {:?}", config);

    let report = match &cli.command {
        Command::Purge(args) => commands::purge::run(args, &config, cli.dry_run)?,
        Command::Critical(args) => commands::critical::run(args, &config, cli.dry_run)?,
        Command::Combine(args) => commands::combine::run(args, &config, cli.dry_run)?,
    };

    println!("{}", report.render(cli.json)?);

    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} of {} stylesheets failed",
            report.failures.len(),
            report.failures.len() + report.files.len()
        );
    }
    Ok(())
}
