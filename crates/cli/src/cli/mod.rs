//! Subcommands.

pub mod generate;
pub mod plugins;

/// Map a command's outcome to an exit code, printing the error.
pub fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
