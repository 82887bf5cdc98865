//! CLI entrypoint for the FlowPack plugin packager.
//!
//! The binary delegates to [`flowpack_cli::run`], which loads configuration,
//! parses the command line and drives the packaging pipeline.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    flowpack_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
