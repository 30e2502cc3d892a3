//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// mfront-interfaces - Generate the glue binding material behaviours to finite element solvers
#[derive(Parser)]
#[command(name = "mfront-interfaces")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the interface sources of a behaviour
    Generate(GenerateArgs),

    /// List the available interfaces
    List(ListArgs),

    /// Show the modelling hypotheses an interface treats for a behaviour
    Hypotheses(HypothesesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Behaviour descriptions (TOML files, directories or glob patterns)
    #[arg(short, long = "behaviour", required = true)]
    pub behaviours: Vec<String>,

    /// Interfaces to generate (repeatable)
    #[arg(short, long = "interface", required = true)]
    pub interfaces: Vec<String>,

    /// Keyword file with interface specific statements
    #[arg(short, long)]
    pub keywords: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, env = "MFRONT_INTERFACES_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Build manifest format (json, toml)
    #[arg(long)]
    pub manifest: Option<String>,

    /// Emit debugging comments and traces in the generated sources
    #[arg(long)]
    pub debug: bool,

    /// Dump an MTest file when an integration fails
    #[arg(long)]
    pub mtest_on_failure: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Show libraries, behaviour types and keywords
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Args)]
pub struct HypothesesArgs {
    /// Behaviour description (TOML)
    #[arg(short, long)]
    pub behaviour: PathBuf,

    /// Interface name
    #[arg(short, long)]
    pub interface: String,

    /// Keyword file with interface specific statements
    #[arg(short, long)]
    pub keywords: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
