use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use camp_cli::commands::{check, classes, people, rooms, schedule, shifts, status};
use camp_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose overrides RUST_LOG.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Status => status::run(&mut stdout, &config)?,
        Commands::Check(args) => check::run(&mut stdout, args, &config)?,
        Commands::People(action) => people::run(&mut stdout, action, &config)?,
        Commands::Rooms(action) => rooms::run(&mut stdout, action, &config)?,
        Commands::Shifts(action) => shifts::run(&mut stdout, action, &config)?,
        Commands::Schedule(action) => schedule::run(&mut stdout, action, &config)?,
        Commands::Classes(action) => classes::run(&mut stdout, action, &config)?,
    }

    Ok(())
}
