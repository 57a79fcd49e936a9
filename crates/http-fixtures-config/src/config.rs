// crates/http-fixtures-config/src/config.rs
// ============================================================================
// Module: HTTP Fixtures Configuration
// Description: Configuration loading and validation for fixture tooling.
// Purpose: Provide strict config parsing with hard size and path limits.
// Dependencies: http-fixtures-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `HTTP_FIXTURES_CONFIG`, then
//! `http-fixtures.toml` in the working directory. Only the default file may
//! be absent; a missing explicit file is an error.
//!
//! The fixture mode is not taken from the file alone: CI forces lockdown and
//! `HTTP_FIXTURES_MODE` overrides `fixtures.mode`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use http_fixtures_core::DEFAULT_FIXTURE_FOLDER;
use http_fixtures_core::DEFAULT_LOG_NAME_PREFIX;
use http_fixtures_core::FileLogSink;
use http_fixtures_core::FixtureLogSink;
use http_fixtures_core::FixtureMode;
use http_fixtures_core::LifecycleOptions;
use http_fixtures_core::ModeRegistry;
use http_fixtures_core::NoopLogSink;
use http_fixtures_core::StderrLogSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "http-fixtures.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "HTTP_FIXTURES_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of the diagnostic log prefix.
pub const MAX_LOG_NAME_PREFIX_LENGTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening a log file.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level `http-fixtures.toml` model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixturesConfig {
    /// Fixture location and mode settings.
    #[serde(default)]
    pub fixtures: FixturesSection,
    /// Diagnostic log settings.
    #[serde(default)]
    pub log: LogSection,
    /// File the configuration was read from; `None` for defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// `[fixtures]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixturesSection {
    /// Fixture folder created next to each test file.
    pub folder_name: String,
    /// Optional folder the fixture folder is nested under.
    pub parent_folder: Option<String>,
    /// Mode used when neither CI nor `HTTP_FIXTURES_MODE` decide it.
    pub mode: Option<FixtureMode>,
    /// Prefix for diagnostic messages.
    pub log_name_prefix: String,
}

impl Default for FixturesSection {
    fn default() -> Self {
        Self {
            folder_name: DEFAULT_FIXTURE_FOLDER.to_string(),
            parent_folder: None,
            mode: None,
            log_name_prefix: DEFAULT_LOG_NAME_PREFIX.to_string(),
        }
    }
}

impl FixturesSection {
    /// Validates the fixtures section.
    fn validate(&self) -> Result<(), ConfigError> {
        let folder = self.folder_name.trim();
        if folder.is_empty() {
            return Err(ConfigError::Invalid("fixtures.folder_name must be non-empty".to_string()));
        }
        let mut components = Path::new(folder).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            return Err(ConfigError::Invalid(
                "fixtures.folder_name must be a single relative folder name".to_string(),
            ));
        }
        if folder.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("fixtures.folder_name too long".to_string()));
        }
        if let Some(parent) = &self.parent_folder {
            validate_relative_folder("fixtures.parent_folder", parent)?;
        }
        let prefix = self.log_name_prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "fixtures.log_name_prefix must be non-empty".to_string(),
            ));
        }
        if prefix.len() > MAX_LOG_NAME_PREFIX_LENGTH {
            return Err(ConfigError::Invalid("fixtures.log_name_prefix too long".to_string()));
        }
        Ok(())
    }

    /// Returns the folder path relative to the test directory.
    #[must_use]
    pub fn effective_folder(&self) -> String {
        nest_folder(self.parent_folder.as_deref(), self.folder_name.trim())
    }
}

/// Diagnostic log destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSinkKind {
    /// Human-readable lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `log.path`.
    File,
    /// Discard all events.
    None,
}

/// `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Where diagnostic events go.
    pub sink: LogSinkKind,
    /// Log file path, required for the file sink.
    pub path: Option<PathBuf>,
}

impl LogSection {
    /// Validates the log section.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("log.path is required when log.sink = \"file\"".to_string()))
            }
            (LogSinkKind::File, Some(path)) => {
                validate_path_string("log.path", &path.to_string_lossy())
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "log.path is only valid when log.sink = \"file\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Where the configuration path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathOrigin {
    /// Passed by the caller.
    Explicit,
    /// Read from `HTTP_FIXTURES_CONFIG`.
    Environment,
    /// Default filename in the working directory.
    Default,
}

impl FixturesConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration using an injected environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated, or when an explicit or environment-named file is missing.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (resolved, origin) = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound && origin == PathOrigin::Default => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fixtures.validate()?;
        self.log.validate()
    }

    // ========================================================================
    // SECTION: Runtime Wiring
    // ========================================================================

    /// Resolves the mode registry from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `HTTP_FIXTURES_MODE` is unknown.
    pub fn mode_registry(&self) -> Result<ModeRegistry, ConfigError> {
        self.mode_registry_with_env(|key| env::var(key).ok())
    }

    /// Resolves the mode registry from an injected environment lookup.
    ///
    /// Precedence is CI, then `HTTP_FIXTURES_MODE`, then `fixtures.mode`,
    /// then dryrun.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the mode variable is unknown.
    pub fn mode_registry_with_env<F>(&self, lookup: F) -> Result<ModeRegistry, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        ModeRegistry::from_env_source_or(lookup, self.fixtures.mode)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Builds lifecycle options for one test file.
    #[must_use]
    pub fn lifecycle_options(&self, mode: FixtureMode, test_path: &Path) -> LifecycleOptions {
        let options = LifecycleOptions::new(mode)
            .with_test_path(test_path)
            .with_fixture_folder_name(self.fixtures.folder_name.trim())
            .with_log_name_prefix(self.fixtures.log_name_prefix.trim());
        match self.fixtures.parent_folder.clone() {
            Some(parent) => options
                .with_folder_name_hook(move |folder| nest_folder(Some(parent.as_str()), folder)),
            None => options,
        }
    }

    /// Opens the configured log sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn build_log_sink(&self) -> Result<Box<dyn FixtureLogSink + Send + Sync>, ConfigError> {
        match (self.log.sink, &self.log.path) {
            (LogSinkKind::Stderr, _) => Ok(Box::new(StderrLogSink)),
            (LogSinkKind::None, _) => Ok(Box::new(NoopLogSink)),
            (LogSinkKind::File, Some(path)) => FileLogSink::new(path)
                .map(|sink| Box::new(sink) as Box<dyn FixtureLogSink + Send + Sync>)
                .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display()))),
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("log.path is required when log.sink = \"file\"".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the configuration path and records where it came from.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<(PathBuf, PathOrigin), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok((path.to_path_buf(), PathOrigin::Explicit));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), PathOrigin::Environment));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), PathOrigin::Default))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a folder that must stay inside the test directory.
fn validate_relative_folder(field: &str, value: &str) -> Result<(), ConfigError> {
    validate_path_string(field, value)?;
    let escapes = Path::new(value.trim())
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::Invalid(format!(
            "{field} must be relative and stay inside the test directory"
        )));
    }
    Ok(())
}

/// Joins an optional parent folder with the fixture folder name.
fn nest_folder(parent: Option<&str>, folder: &str) -> String {
    match parent.map(str::trim) {
        Some(parent) => Path::new(parent).join(folder).to_string_lossy().into_owned(),
        None => folder.to_string(),
    }
}
