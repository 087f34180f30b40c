mod cli;
mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config);
    cli.overrides.apply(&mut config);

    gallery_logging::initialize(
        config.log.into(),
        config.log_level(cli.verbose),
        &config.log_file,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(commands::run(cli.command, &cli.config, config))
}
