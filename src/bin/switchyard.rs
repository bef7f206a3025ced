//! Switchyard CLI Binary
//!
//! Command-line interface for provider settings and connection profiles.

use anyhow::Context;
use clap::Parser;
use std::process;
use switchyard::config::ConfigLoader;
use switchyard::logging::init_logging;
use switchyard::tooling::cli::{Cli, CliContext};

fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);

    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    let context = CliContext::from_config(config).context("Failed to initialize settings")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
