#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use tscc_cli::args::CliArgs;
use tscc_cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_UNITS_FAILED: i32 = 1;

fn main() -> Result<()> {
    // Installs a subscriber only when TSCC_LOG or RUST_LOG is set.
    tscc_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::compile(&args, &cwd)?;

    let pretty = args
        .pretty
        .unwrap_or_else(|| std::io::stderr().is_terminal());
    let mut reporter = Reporter::new(pretty);
    for (file, text) in &result.sources {
        reporter.add_source(file.as_str(), text.as_str());
    }

    if !result.diagnostics.is_empty() {
        // render() already ends every diagnostic with a newline
        eprint!("{}", reporter.render(&result.diagnostics));
    }
    for failure in &result.failures {
        eprintln!("{}", reporter.format_failure(failure));
    }

    if result.succeeded() {
        std::process::exit(EXIT_SUCCESS);
    }
    std::process::exit(EXIT_UNITS_FAILED);
}
