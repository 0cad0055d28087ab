use clap::Parser;
use corruptscan::cli::{Args, run_cli};
use corruptscan::output::OutputFormatter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins; otherwise stay quiet unless --verbose.
    let default_filter = if args.verbose {
        "warn,corruptscan=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run_cli(&args.into_options()) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
