//! `specgen generate`: run every configured job.

use std::path::PathBuf;

use clap::Args;
use console::style;

use crate::cli::run_command;
use crate::config::{JobOverrides, load_jobs};
use crate::driver::run_jobs;
use crate::plugins::builtin_plugins;

/// `specgen generate`
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Config file (defaults to ./specgen.toml when it exists)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// OpenAPI document to read
    #[arg(long, short = 'i', value_name = "SPEC")]
    pub input: Option<PathBuf>,
    /// Directory to write index.ts into
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Plugin to run; repeat for several
    #[arg(long = "plugin", short = 'p', value_name = "NAME")]
    pub plugins: Vec<String>,
    /// Render without writing files
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the command and return its exit code.
pub fn run(args: GenerateArgs) -> i32 {
    run_command(|| generate(&args))
}

fn generate(args: &GenerateArgs) -> Result<(), String> {
    let cwd = std::env::current_dir()
        .map_err(|err| format!("Failed to read current directory: {err}"))?;
    let overrides = JobOverrides {
        input: args.input.clone(),
        output: args.output.clone(),
        plugins: args.plugins.clone(),
        dry_run: args.dry_run,
    };
    let configs = load_jobs(args.config.as_deref(), &cwd, &overrides)?;
    let total = configs.len();

    let plugins = builtin_plugins();
    let (outputs, errors) = run_jobs(configs, &plugins);

    for output in &outputs {
        if output.written {
            println!("{} {}", style("✓").green(), output.path.display());
        } else {
            println!(
                "{} {} (dry run, {} bytes)",
                style("○").dim(),
                output.path.display(),
                output.contents.len()
            );
        }
    }
    for error in &errors {
        eprintln!("{} {error}", style("✗").red());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} of {total} jobs failed", errors.len()))
    }
}
