//! assetflow - front-end asset pipeline with a live-reload dev server.

mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod task;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AssetConfig;

fn main() -> Result<()> {
    // Before anything can block
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Arc::new(AssetConfig::load(&cli)?);

    match cli.command() {
        Commands::Build => cli::build::build_assets(config).map(|_| ()),
        Commands::Dev { .. } => cli::dev::dev(config),
    }
}
