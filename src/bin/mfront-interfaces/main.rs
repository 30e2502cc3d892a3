//! mfront-interfaces CLI - Interface generators for material behaviours

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mfront_interfaces::util::diagnostic::{emit, emit_error, suggestions};
use mfront_interfaces::GenerationError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    // Parse CLI
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();
    let verbose = cli.verbose;

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<GenerationError>() {
            Some(err) => emit(&err.to_diagnostic(), color),
            None if verbose => emit_error(&format!("{:#}", e), &[], &[], color),
            None => emit_error(&format!("{:#}", e), &[], &[suggestions::VERBOSE], color),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("mfront_interfaces=debug")
    } else {
        EnvFilter::new("mfront_interfaces=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, color),
        Commands::List(args) => commands::list::execute(args),
        Commands::Hypotheses(args) => commands::hypotheses::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
