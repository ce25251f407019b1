//! Command line driver for specgen.
//!
//! Loads jobs from a config file and flags, reads each OpenAPI document,
//! runs the built-in plugins through [`specgen_core`] and writes one
//! `index.ts` per job.

#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::{CommandFactory, Parser, Subcommand};

pub mod cli;
pub mod config;
pub mod driver;
pub mod emit;
pub mod logging;
pub mod plugins;
pub mod spec;

pub use driver::{JobError, JobOutput, render_document, run_jobs};
pub use logging::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "specgen",
    version,
    about = "Generate TypeScript types, clients and helpers from OpenAPI documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate output for every configured job
    Generate(cli::generate::GenerateArgs),
    /// Show the resolved plugin order
    Plugins(cli::plugins::PluginsArgs),
}

/// Parse `args` (program name first) and run the selected command.
pub fn run_cli(args: Vec<String>) -> i32 {
    init_tracing();
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => cli::generate::run(args),
            Some(Commands::Plugins(args)) => cli::plugins::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}
