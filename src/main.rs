//! modup - go.mod dependency freshness checker CLI
//!
//! Checks every dependency of one or more go.mod files against the tags
//! published by its upstream repository, and optionally rewrites the file
//! with the advised versions.

use clap::Parser;
use modup::checker::Checker;
use modup::cli::CliArgs;
use modup::manifest::{GoModFile, ModFile};
use modup::output::{self, Printer};
use std::io;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    tokio::select! {
        code = run(args) => match code {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{}error: {}", output::PREFIX, e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => ExitCode::FAILURE,
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.print_version {
        println!("modup version {}", env!("CARGO_PKG_VERSION"));
    }
    let checker = Checker::new(args.config())?;
    let mut printer = Printer::new(io::stderr().lock(), args.verbose);
    let mut failure = false;
    for path in args.mod_files() {
        let file = GoModFile::load(&path)?;
        let messages = checker.check_file(&file).await;
        failure = failure || output::failed(&messages);
        printer.print_all(&messages)?;
    }
    if failure {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
