//! CLI entry point for the BOE harvester.

use boe_harvester::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so `--yaml` output on stdout stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = cli::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
