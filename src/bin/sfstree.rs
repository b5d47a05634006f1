//! sfstree CLI Binary
//!
//! Command-line interface for inspecting and maintaining serialized trees.

use anyhow::Context;
use clap::Parser;
use sfstree::logging::init_logging;
use sfstree::tooling::cli::{load_config, Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut config = load_config(&cli.root, cli.config.as_deref())
        .with_context(|| format!("Failed to load configuration from {}", cli.root.display()))?;
    cli.apply_log_overrides(&mut config);
    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    let context = CliContext::new(&config).context("Failed to open tree store")?;
    let output = context.execute(&cli.command)?;
    Ok(output)
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
