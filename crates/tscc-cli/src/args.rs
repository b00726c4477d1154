use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the tscc binary.
#[derive(Parser, Debug)]
#[command(
    name = "tscc",
    version,
    about = "Generate C++ declaration and definition files from analyzed TypeScript units"
)]
pub struct CliArgs {
    /// Namespace alias of the runtime-support library (default `kk`).
    #[arg(long = "kk", value_name = "NAMESPACE")]
    pub kk: Option<String>,

    /// Write generated files to this directory instead of next to each input.
    #[arg(long = "outDir", alias = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Compile the project given the path to its configuration file,
    /// or to a folder with a 'tscc.json'.
    #[arg(short = 'p', long = "project", value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Enable color in diagnostics output.
    #[arg(long)]
    pub pretty: Option<bool>,

    /// Analyzed unit files (JSON) to generate.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[cfg(test)]
#[path = "../tests/args.rs"]
mod tests;
