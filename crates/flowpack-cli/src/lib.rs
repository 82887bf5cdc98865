//! Command-line interface runtime for the FlowPack plugin packager.
//!
//! The runtime splits leading configuration flags from the packaging
//! arguments, loads layered configuration, installs telemetry and then runs
//! the packaging pipeline. Output streams and the configuration loader are
//! injectable so the runtime can be exercised from tests without spawning a
//! process.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use flowpack_config::Config;
use flowpack_host::NativeLoader;
use flowpack_packager::{BuildSettings, PackOptions, PackageReport, Packager, ProcessRunner};

mod cli;
mod config;
mod errors;
mod telemetry;

#[cfg(test)]
mod tests;

use cli::Cli;
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `flowpack_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--cargo-path",
    "--build-profile",
    "--target-dir",
    "--log-filter",
    "--log-format",
];

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<W, E, L> CliRunner<'_, '_, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let arguments: Vec<OsString> = args.into_iter().collect();
        match self.execute(&arguments) {
            Ok(()) => ExitCode::SUCCESS,
            Err(AppError::CliUsage(error)) => {
                drop(write!(self.io.stderr, "{}", error.render()));
                ExitCode::FAILURE
            }
            Err(error) => {
                drop(writeln!(self.io.stderr, "error: {error}"));
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, args: &[OsString]) -> Result<(), AppError> {
        let split = split_config_arguments(args);
        let cli = match Cli::try_parse_from(prepare_cli_arguments(args, &split)) {
            Ok(cli) => cli,
            Err(error) if error.kind() == ErrorKind::DisplayHelp => {
                return write!(self.io.stdout, "{}", error.render()).map_err(AppError::WriteOutput);
            }
            Err(error) => return Err(AppError::CliUsage(error)),
        };

        if cli.show_version {
            return writeln!(self.io.stdout, "flowpack {}", env!("CARGO_PKG_VERSION"))
                .map_err(AppError::WriteOutput);
        }
        if cli.is_bare_invocation() {
            let help = Cli::command().render_help();
            return write!(self.io.stdout, "{help}").map_err(AppError::WriteOutput);
        }

        let project = cli.project.clone().ok_or(AppError::MissingProject)?;
        let config = self.loader.load(&split.config_arguments)?;
        telemetry::initialise(&config, cli.verbose)?;

        let report = package(&cli, project, &config)?;
        writeln!(
            self.io.stdout,
            "Package created: {}",
            report.output_path().display()
        )
        .and_then(|()| writeln!(self.io.stdout, "SHA256: {}", report.checksum()))
        .map_err(AppError::WriteOutput)
    }
}

fn package(cli: &Cli, project: PathBuf, config: &Config) -> Result<PackageReport, AppError> {
    let settings = BuildSettings::default()
        .with_cargo(config.cargo_path())
        .with_profile(config.build_profile())
        .with_target_dir(config.target_dir().map(|dir| dir.as_std_path().to_path_buf()));
    let options = PackOptions::new(project)
        .with_output_path(cli.output.clone())
        .with_clean(cli.clean)
        .with_verbose(cli.verbose)
        .with_build_settings(settings);

    let packager = Packager::new(options, ProcessRunner::new(cli.verbose), NativeLoader);
    packager.run().map_err(AppError::from)
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner { io, loader }.run(args)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if let Some(rest) = args.get(split.command_start..) {
        cli_arguments.extend(rest.iter().cloned());
    }
    cli_arguments
}
