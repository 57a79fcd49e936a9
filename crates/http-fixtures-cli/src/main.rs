// crates/http-fixtures-cli/src/main.rs
// ============================================================================
// Module: HTTP Fixtures CLI Entry Point
// Description: Command dispatcher for fixture mode and fixture file tooling.
// Purpose: Inspect modes and fixture files without running a test suite.
// Dependencies: clap, http-fixtures-config, http-fixtures-core, serde, thiserror
// ============================================================================

//! ## Overview
//! `http-fixtures` answers the questions developers ask between test runs:
//! which mode a run would use, what the next mode in the toggle cycle is,
//! where a test file's fixtures live, what they contain, and whether the
//! fixture files in a tree are well formed. Nothing here writes fixtures.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod fixtures;
#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use http_fixtures_config::FixturesConfig;
use http_fixtures_core::FixtureLocation;
use http_fixtures_core::MODE_ENV_VAR;
use http_fixtures_core::ModeRegistry;
use http_fixtures_core::hashing::canonical_json_bytes;
use serde::Serialize;
use thiserror::Error;

use crate::fixtures::FileStatus;
use crate::fixtures::inspect_fixture;
use crate::fixtures::render_inspect_text;
use crate::fixtures::render_verify_text;
use crate::fixtures::verify_tree;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Title rendered in the mode banner.
const BANNER_TITLE: &str = "HTTP FIXTURES MODE";
/// Minimum banner width.
const BANNER_WIDTH: usize = 40;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "http-fixtures", version, disable_help_subcommand = true)]
struct Cli {
    /// Path to `http-fixtures.toml` (overrides `HTTP_FIXTURES_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fixture mode utilities.
    Mode {
        /// Selected mode subcommand.
        #[command(subcommand)]
        command: ModeCommand,
    },
    /// Fixture file utilities.
    Fixture {
        /// Selected fixture subcommand.
        #[command(subcommand)]
        command: FixtureCommand,
    },
}

/// Mode subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ModeCommand {
    /// Print the resolved mode and its banner.
    Show,
    /// Print the next mode in the toggle cycle as an environment assignment.
    Next,
}

/// Fixture subcommands.
#[derive(Subcommand, Debug)]
enum FixtureCommand {
    /// Print the fixture file path for a test file.
    Path(FixturePathCommand),
    /// List the entries recorded for a test file, sorted by test identity.
    Inspect(FixtureInspectCommand),
    /// Check every fixture file under a directory.
    Verify(FixtureVerifyCommand),
}

/// Arguments for `fixture path`.
#[derive(Args, Debug)]
struct FixturePathCommand {
    /// Test source file the fixtures belong to.
    #[arg(value_name = "TEST_FILE")]
    test_file: PathBuf,
}

/// Arguments for `fixture inspect`.
#[derive(Args, Debug)]
struct FixtureInspectCommand {
    /// Test source file the fixtures belong to.
    #[arg(value_name = "TEST_FILE")]
    test_file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `fixture verify`.
#[derive(Args, Debug)]
struct FixtureVerifyCommand {
    /// Directory to walk.
    #[arg(value_name = "ROOT")]
    root: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Output formats for report commands.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Canonical JSON output.
    Json,
    /// Human-readable text output.
    Text,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = FixturesConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    match cli.command {
        Commands::Mode {
            command,
        } => command_mode(&config, &command),
        Commands::Fixture {
            command,
        } => command_fixture(&config, command),
    }
}

// ============================================================================
// SECTION: Mode Commands
// ============================================================================

/// Dispatches mode subcommands.
fn command_mode(config: &FixturesConfig, command: &ModeCommand) -> CliResult<ExitCode> {
    let registry = config
        .mode_registry()
        .map_err(|err| CliError::new(format!("failed to resolve mode: {err}")))?;
    let text = match command {
        ModeCommand::Show => render_mode_show(&registry),
        ModeCommand::Next => render_mode_next(&registry),
    };
    write_stdout(&text)?;
    Ok(ExitCode::SUCCESS)
}

/// Renders the `mode show` output.
fn render_mode_show(registry: &ModeRegistry) -> String {
    let mut text = registry.banner(BANNER_TITLE, BANNER_WIDTH);
    text.push_str("\n\nmode: ");
    text.push_str(registry.mode().as_str());
    if registry.is_ci() {
        text.push_str(" (forced by CI)");
    }
    text
}

/// Renders the `mode next` output.
fn render_mode_next(registry: &ModeRegistry) -> String {
    format!("{MODE_ENV_VAR}={}", registry.next_mode())
}

// ============================================================================
// SECTION: Fixture Commands
// ============================================================================

/// Dispatches fixture subcommands.
fn command_fixture(config: &FixturesConfig, command: FixtureCommand) -> CliResult<ExitCode> {
    match command {
        FixtureCommand::Path(command) => {
            let location = fixture_location(config, &command.test_file)?;
            write_stdout(&location.path().display().to_string())?;
            Ok(ExitCode::SUCCESS)
        }
        FixtureCommand::Inspect(command) => command_fixture_inspect(config, &command),
        FixtureCommand::Verify(command) => command_fixture_verify(config, &command),
    }
}

/// Executes `fixture inspect`.
fn command_fixture_inspect(
    config: &FixturesConfig,
    command: &FixtureInspectCommand,
) -> CliResult<ExitCode> {
    let location = fixture_location(config, &command.test_file)?;
    let report = inspect_fixture(location.path())?;
    emit_report(&report, command.format, render_inspect_text(&report))?;
    if report.status == FileStatus::Corrupt {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `fixture verify`.
fn command_fixture_verify(
    config: &FixturesConfig,
    command: &FixtureVerifyCommand,
) -> CliResult<ExitCode> {
    let report = verify_tree(&command.root, &config.fixtures.effective_folder())?;
    emit_report(&report, command.format, render_verify_text(&report))?;
    if report.is_clean() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

/// Resolves the fixture location for a test file.
fn fixture_location(config: &FixturesConfig, test_file: &Path) -> CliResult<FixtureLocation> {
    let mode = config.fixtures.mode.unwrap_or_default();
    config
        .lifecycle_options(mode, test_file)
        .fixture_location()
        .map_err(|err| CliError::new(format!("failed to locate fixtures: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a report in the requested format.
fn emit_report<T: Serialize>(value: &T, format: OutputFormat, text: String) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let bytes = canonical_json_bytes(value)
                .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
            let json = String::from_utf8(bytes)
                .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
            write_stdout(&json)
        }
        OutputFormat::Text => write_stdout(&text),
    }
}

/// Writes a line to stdout.
fn write_stdout(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
