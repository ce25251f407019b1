//! The `specgen` executable.

#![forbid(unsafe_code)]

fn main() {
    std::process::exit(specgen_cli::run_cli(std::env::args().collect()));
}
