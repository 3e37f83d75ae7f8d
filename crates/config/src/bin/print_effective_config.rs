//! Print the effective registry config (defaults + optional file + env) as JSON.
//!
//! Usage: `print_effective_config [path/to/config.{toml,json}]`

use openconsensus_config::{load_registry_config_std_env, to_pretty_json};
use std::io;
use std::io::Write;
use std::path::PathBuf;

fn main() -> std::process::ExitCode {
    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::ExitCode::from(1)
        },
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_registry_config_std_env(path.as_deref())?;

    let output = to_pretty_json(config.as_ref())?;

    let mut stdout = io::stdout();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
