//! `specgen plugins`: show the resolved plugin order.

use clap::Args;
use console::style;
use specgen_core::resolve;

use crate::cli::run_command;
use crate::config::{PluginEntry, requested_plugins};
use crate::plugins::{builtin_catalog, builtin_plugins};

/// `specgen plugins`
#[derive(Args, Debug, Clone, Default)]
pub struct PluginsArgs {
    /// Plugin to request; the defaults when none are given
    #[arg(long = "plugin", short = 'p', value_name = "NAME")]
    pub plugins: Vec<String>,
    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the command and return its exit code.
pub fn run(args: PluginsArgs) -> i32 {
    run_command(|| print_order(&args))
}

fn print_order(args: &PluginsArgs) -> Result<(), String> {
    let builtins = builtin_plugins();
    let mut catalog = builtin_catalog(&builtins);
    let entries = (!args.plugins.is_empty())
        .then(|| args.plugins.iter().cloned().map(PluginEntry::Name).collect());
    let requested = requested_plugins(entries, &mut catalog)?;
    let resolution = resolve(&requested, &catalog).map_err(|err| err.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&resolution)
            .map_err(|err| format!("Failed to serialize plugin order: {err}"))?;
        println!("{json}");
        return Ok(());
    }

    for (position, record) in resolution.resolved.values().enumerate() {
        let tags = if record.tags.is_empty() {
            String::new()
        } else {
            let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
            format!(" [{}]", tags.join(", "))
        };
        let dependencies = if record.dependencies.is_empty() {
            String::new()
        } else {
            format!(" <- {}", record.dependencies.join(", "))
        };
        println!(
            "{:>2}. {}{}{}",
            position + 1,
            style(&record.name).bold(),
            style(tags).cyan(),
            style(dependencies).dim()
        );
    }
    Ok(())
}
