// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use qswatch::Cli;

fn main() {
    setup_logging();

    let cli = Cli::parse();
    if let Err(e) = qswatch::run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!qswatch::env::no_color())
        .init();
}
