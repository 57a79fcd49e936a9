// crates/http-fixtures-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, origin).
// ============================================================================

//! ## Overview
//! Ensures config input handling is strict and that only the default config
//! file may be absent.

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

use std::fs;
use std::io::Write;
use std::path::Path;

use http_fixtures_config::CONFIG_ENV_VAR;
use http_fixtures_config::ConfigError;
use http_fixtures_config::FixturesConfig;
use http_fixtures_config::LogSinkKind;
use http_fixtures_core::FixtureMode;
use tempfile::NamedTempFile;
use tempfile::TempDir;

fn no_env(_: &str) -> Option<String> {
    None
}

fn assert_error(result: Result<FixturesConfig, ConfigError>, needle: &str) {
    match result {
        Err(error) => {
            let message = error.to_string();
            assert!(message.contains(needle), "error {message} did not contain {needle}");
        }
        Ok(config) => panic!("expected config load to fail, got {config:?}"),
    }
}

fn write_config(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[test]
fn load_rejects_path_too_long() {
    let long_path = "a".repeat(5_000);
    assert_error(
        FixturesConfig::load_with_env(Some(Path::new(&long_path)), no_env),
        "config path exceeds max length",
    );
}

#[test]
fn load_rejects_path_component_too_long() {
    let long_component = "a".repeat(300);
    assert_error(
        FixturesConfig::load_with_env(Some(Path::new(&long_component)), no_env),
        "config path component too long",
    );
}

#[test]
fn load_rejects_oversized_file() {
    let file = write_config(&vec![b'#'; 1_048_577]);
    assert_error(
        FixturesConfig::load_with_env(Some(file.path()), no_env),
        "config file exceeds size limit",
    );
}

#[test]
fn load_rejects_non_utf8_file() {
    let file = write_config(&[0xFF, 0xFE, 0xFF]);
    assert_error(
        FixturesConfig::load_with_env(Some(file.path()), no_env),
        "config file must be utf-8",
    );
}

#[test]
fn load_reports_parse_errors() {
    let file = write_config(b"[fixtures\nfolder_name = ");
    let err = FixturesConfig::load_with_env(Some(file.path()), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_rejects_unknown_mode_values() {
    let file = write_config(b"[fixtures]\nmode = \"replay\"\n");
    let err = FixturesConfig::load_with_env(Some(file.path()), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_rejects_unknown_fields() {
    let file = write_config(b"[fixtures]\nfolder = \"__nocks__\"\n");
    let err = FixturesConfig::load_with_env(Some(file.path()), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = FixturesConfig::load_with_env(Some(&path), no_env).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn missing_environment_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml").to_string_lossy().into_owned();
    let lookup = move |key: &str| (key == CONFIG_ENV_VAR).then(|| path.clone());
    let err = FixturesConfig::load_with_env(None, lookup).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn environment_path_is_used_when_no_explicit_path() {
    let file = write_config(b"[fixtures]\nfolder_name = \"__env__\"\n");
    let path = file.path().to_string_lossy().into_owned();
    let lookup = move |key: &str| (key == CONFIG_ENV_VAR).then(|| path.clone());
    let config = FixturesConfig::load_with_env(None, lookup).unwrap();
    assert_eq!(config.fixtures.folder_name, "__env__");
    assert_eq!(config.source.as_deref(), Some(file.path()));
}

#[test]
fn explicit_path_wins_over_environment() {
    let explicit = write_config(b"[fixtures]\nfolder_name = \"__explicit__\"\n");
    let other = write_config(b"[fixtures]\nfolder_name = \"__env__\"\n");
    let path = other.path().to_string_lossy().into_owned();
    let lookup = move |key: &str| (key == CONFIG_ENV_VAR).then(|| path.clone());
    let config = FixturesConfig::load_with_env(Some(explicit.path()), lookup).unwrap();
    assert_eq!(config.fixtures.folder_name, "__explicit__");
}

#[test]
fn full_config_round_trips_every_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("http-fixtures.toml");
    fs::write(
        &path,
        concat!(
            "[fixtures]\n",
            "folder_name = \"__mocks__\"\n",
            "parent_folder = \"__snapshots__\"\n",
            "mode = \"record\"\n",
            "log_name_prefix = \"api-tests\"\n",
            "\n",
            "[log]\n",
            "sink = \"file\"\n",
            "path = \"fixtures.log\"\n",
        ),
    )
    .unwrap();
    let config = FixturesConfig::load_with_env(Some(&path), no_env).unwrap();
    assert_eq!(config.fixtures.folder_name, "__mocks__");
    assert_eq!(config.fixtures.parent_folder.as_deref(), Some("__snapshots__"));
    assert_eq!(config.fixtures.mode, Some(FixtureMode::Record));
    assert_eq!(config.fixtures.log_name_prefix, "api-tests");
    assert_eq!(config.log.sink, LogSinkKind::File);
    assert_eq!(config.log.path.as_deref(), Some(Path::new("fixtures.log")));
    assert_eq!(config.source.as_deref(), Some(path.as_path()));
}
