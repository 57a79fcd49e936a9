// crates/http-fixtures-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and mode rendering.
// Purpose: Ensure the command surface and mode output stay stable.
// Dependencies: clap, http-fixtures-core
// ============================================================================

//! ## Overview
//! Validates the clap definition, global `--config` handling, and the text
//! printed by the mode commands.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use clap::CommandFactory;
use clap::Parser;
use http_fixtures_core::FixtureMode;
use http_fixtures_core::ModeRegistry;

use super::Cli;
use super::Commands;
use super::FixtureCommand;
use super::ModeCommand;
use super::OutputFormat;
use super::render_mode_next;
use super::render_mode_show;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn config_flag_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["http-fixtures", "mode", "show", "--config", "custom.toml"])
        .unwrap();
    assert_eq!(cli.config.as_deref(), Some(Path::new("custom.toml")));
    assert!(matches!(
        cli.command,
        Commands::Mode {
            command: ModeCommand::Show
        }
    ));
}

#[test]
fn inspect_defaults_to_text_output() {
    let cli = Cli::try_parse_from(["http-fixtures", "fixture", "inspect", "tests/api.rs"]).unwrap();
    match cli.command {
        Commands::Fixture {
            command: FixtureCommand::Inspect(command),
        } => {
            assert_eq!(command.test_file, Path::new("tests/api.rs"));
            assert_eq!(command.format, OutputFormat::Text);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn verify_accepts_json_format() {
    let cli =
        Cli::try_parse_from(["http-fixtures", "fixture", "verify", ".", "--format", "json"])
            .unwrap();
    match cli.command {
        Commands::Fixture {
            command: FixtureCommand::Verify(command),
        } => assert_eq!(command.format, OutputFormat::Json),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn path_requires_test_file() {
    assert!(Cli::try_parse_from(["http-fixtures", "fixture", "path"]).is_err());
}

#[test]
fn mode_show_names_mode_and_ci() {
    let text = render_mode_show(&ModeRegistry::new(FixtureMode::Record, false));
    assert!(text.contains("HTTP FIXTURES MODE"));
    assert!(text.ends_with("mode: record"));

    let text = render_mode_show(&ModeRegistry::new(FixtureMode::Record, true));
    assert!(text.ends_with("mode: lockdown (forced by CI)"));
}

#[test]
fn mode_next_prints_assignment() {
    let registry = ModeRegistry::new(FixtureMode::Dryrun, false);
    assert_eq!(render_mode_next(&registry), "HTTP_FIXTURES_MODE=lockdown");
    let registry = ModeRegistry::new(FixtureMode::Wild, false);
    assert_eq!(render_mode_next(&registry), "HTTP_FIXTURES_MODE=dryrun");
}
