//! CLI binary for `wf`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the library.

use clap::Parser;
use std::process::ExitCode;
use wf::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    wf::logging::init(cli.verbose);

    let output = wf::cli::run(cli);

    print!("{}", output.stdout);
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
