use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use smartstest::cli::{self, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries the TAP stream
    let filter = if cli.verbose {
        EnvFilter::new("smartstest=debug,info")
    } else {
        EnvFilter::new("smartstest=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    cli::run(&cli)
}
