//! hashpack - a static web-asset bundler.

mod analyzer;
mod cli;
mod config;
mod error;
mod logger;
mod pipeline;
mod store;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PackConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PackConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build(&config),
        Commands::Check { .. } => cli::check::check(&config),
    }
}
