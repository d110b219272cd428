//! # tablesight command-line entry point
//!
//! ```text
//! main()
//!   ├─> parse CLI arguments (clap)
//!   ├─> load config, apply --input-dir/--output-dir/--report-dir
//!   ├─> initialise logging (stderr + rolling file)
//!   └─> run the command (`run` when none is given)
//! ```

#![warn(clippy::all, rust_2018_idioms)]

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.load_config()?;

    tablesight::logging::init(&config)?;
    tracing::debug!(?config, "Starting");

    cli::run_command(cli.command, &config)
}
