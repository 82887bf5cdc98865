//! CLI argument definitions for the FlowPack packager.

use std::path::PathBuf;

use clap::Parser;

/// Command-line interface for the FlowPack plugin packager.
#[derive(Parser, Debug)]
#[command(
    name = "flowpack",
    about = "Builds a FlowPack plugin project and packages it as a .fspack archive",
    disable_version_flag = true,
    after_help = "Configuration flags (--config-path, --cargo-path, --build-profile, \
                  --target-dir, --log-filter, --log-format) must precede PROJECT."
)]
pub(crate) struct Cli {
    /// Path to the plugin project's Cargo.toml.
    #[arg(value_name = "PROJECT")]
    pub(crate) project: Option<PathBuf>,
    /// Package path; defaults to <name>.fspack in the current directory.
    #[arg(long, value_name = "PATH")]
    pub(crate) output: Option<PathBuf>,
    /// Runs `cargo clean` before building.
    #[arg(long)]
    pub(crate) clean: bool,
    /// Echoes build output and progress.
    #[arg(long)]
    pub(crate) verbose: bool,
    /// Prints version information and exits.
    #[arg(short = 'v', long = "version")]
    pub(crate) show_version: bool,
}

impl Cli {
    /// Returns true when nothing beyond configuration flags was supplied.
    #[must_use]
    pub(crate) const fn is_bare_invocation(&self) -> bool {
        self.project.is_none() && self.output.is_none() && !self.clean && !self.verbose
    }
}
