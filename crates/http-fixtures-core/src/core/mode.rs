// crates/http-fixtures-core/src/core/mode.rs
// ============================================================================
// Module: HTTP Fixtures Modes
// Description: Operating modes and the mode registry.
// Purpose: Resolve the single mode that governs a test process.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Exactly one [`FixtureMode`] governs a test process. The [`ModeRegistry`]
//! resolves it from the environment once at startup; a continuous-integration
//! indicator always forces [`FixtureMode::Lockdown`]. The registry is an
//! explicit value handed to the lifecycle engine, not ambient global state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the fixture mode.
pub const MODE_ENV_VAR: &str = "HTTP_FIXTURES_MODE";
/// Environment variable signalling a continuous-integration run.
pub const CI_ENV_VAR: &str = "CI";

// ============================================================================
// SECTION: Fixture Mode
// ============================================================================

/// Operating mode for intercepted network traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureMode {
    /// Replay known fixtures; unmatched requests go live and only warn.
    #[default]
    Dryrun,
    /// Replay known fixtures; unmatched requests are blocked and fail the test.
    Lockdown,
    /// Allow live network and capture every interaction.
    Record,
    /// No interception; fixtures are neither read nor written.
    Wild,
}

impl FixtureMode {
    /// All modes in cycle order.
    pub const ALL: [Self; 4] = [Self::Dryrun, Self::Lockdown, Self::Record, Self::Wild];

    /// Returns the stable lowercase label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dryrun => "dryrun",
            Self::Lockdown => "lockdown",
            Self::Record => "record",
            Self::Wild => "wild",
        }
    }

    /// Returns true when stored fixtures are replayed in this mode.
    #[must_use]
    pub const fn replays(self) -> bool {
        matches!(self, Self::Dryrun | Self::Lockdown)
    }

    /// Returns true when the mode writes fixtures back to disk.
    #[must_use]
    pub const fn captures(self) -> bool {
        matches!(self, Self::Record)
    }
}

impl fmt::Display for FixtureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised for invalid mode values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// The requested mode name is not recognized.
    #[error("unknown fixture mode `{0}` (expected one of dryrun, lockdown, record, wild)")]
    Unknown(String),
}

impl FromStr for FixtureMode {
    type Err = ModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| ModeError::Unknown(value.to_string()))
    }
}

// ============================================================================
// SECTION: Mode Registry
// ============================================================================

/// Process-level mode resolution with CI enforcement.
///
/// # Invariants
/// - When `ci` is true, `mode()` is always [`FixtureMode::Lockdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeRegistry {
    /// Currently selected mode.
    current: FixtureMode,
    /// Whether a continuous-integration indicator was present.
    ci: bool,
}

impl ModeRegistry {
    /// Creates a registry with an explicit mode and CI flag.
    #[must_use]
    pub const fn new(mode: FixtureMode, ci: bool) -> Self {
        let current = if ci { FixtureMode::Lockdown } else { mode };
        Self {
            current,
            ci,
        }
    }

    /// Resolves the registry from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::Unknown`] when the mode variable holds an unknown value.
    pub fn from_env() -> Result<Self, ModeError> {
        Self::from_env_source(|key| env::var(key).ok())
    }

    /// Resolves the registry from an injected environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::Unknown`] when the mode variable holds an unknown value.
    pub fn from_env_source<F>(lookup: F) -> Result<Self, ModeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_env_source_or(lookup, None)
    }

    /// Resolves the registry from an injected environment lookup, using
    /// `fallback` (typically a configured mode) when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::Unknown`] when the mode variable holds an unknown value.
    pub fn from_env_source_or<F>(lookup: F, fallback: Option<FixtureMode>) -> Result<Self, ModeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup(MODE_ENV_VAR).as_deref(), fallback, ci_indicator_present(&lookup))
    }

    /// Resolves a registry from layered inputs.
    ///
    /// Precedence: CI indicator, then `requested`, then `fallback`, then the
    /// default mode. An empty `requested` string counts as unset. With the
    /// CI indicator present `requested` is not parsed at all.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::Unknown`] when `requested` names an unknown mode
    /// outside CI.
    pub fn resolve(
        requested: Option<&str>,
        fallback: Option<FixtureMode>,
        ci: bool,
    ) -> Result<Self, ModeError> {
        if ci {
            return Ok(Self::new(FixtureMode::Lockdown, true));
        }
        let requested = requested.map(str::trim).filter(|value| !value.is_empty());
        let mode = match requested {
            Some(value) => value.parse()?,
            None => fallback.unwrap_or_default(),
        };
        Ok(Self::new(mode, ci))
    }

    /// Returns the active mode.
    #[must_use]
    pub const fn mode(&self) -> FixtureMode {
        self.current
    }

    /// Returns true when a CI indicator forced lockdown.
    #[must_use]
    pub const fn is_ci(&self) -> bool {
        self.ci
    }

    /// Sets the active mode. Ignored while a CI indicator is present.
    pub const fn set_mode(&mut self, mode: FixtureMode) {
        if !self.ci {
            self.current = mode;
        }
    }

    /// Parses and sets the active mode.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::Unknown`] when `value` is not a recognized mode.
    pub fn set_mode_str(&mut self, value: &str) -> Result<(), ModeError> {
        let mode = value.parse()?;
        self.set_mode(mode);
        Ok(())
    }

    /// Returns the mode that follows the current one in the toggle cycle.
    #[must_use]
    pub const fn next_mode(&self) -> FixtureMode {
        if self.ci {
            return FixtureMode::Lockdown;
        }
        match self.current {
            FixtureMode::Dryrun => FixtureMode::Lockdown,
            FixtureMode::Lockdown => FixtureMode::Record,
            FixtureMode::Record => FixtureMode::Wild,
            FixtureMode::Wild => FixtureMode::Dryrun,
        }
    }

    /// Renders a centered plain-text banner naming the active mode.
    #[must_use]
    pub fn banner(&self, title: &str, width: usize) -> String {
        let width = width.max(title.len()).max(self.current.as_str().len()) + 4;
        let rows = ["", title, "", self.current.as_str()];
        rows.iter().map(|row| format!("{row:^width$}")).collect::<Vec<_>>().join("\n")
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the CI variable is set to a non-empty value.
fn ci_indicator_present<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CI_ENV_VAR).is_some_and(|value| !value.trim().is_empty())
}
