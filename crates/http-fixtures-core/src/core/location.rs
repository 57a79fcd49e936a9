// crates/http-fixtures-core/src/core/location.rs
// ============================================================================
// Module: HTTP Fixtures Locations
// Description: Fixture folder and file path resolution for a test file.
// Purpose: Place each test file's fixtures in a sibling folder.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Fixtures for `dir/foo_test.rs` live at `dir/<folder>/foo_test.rs.json`.
//! The folder defaults to `__nocks__` and can be relocated by a folder-name
//! hook, for example to nest it inside a snapshot directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default fixture folder name.
pub const DEFAULT_FIXTURE_FOLDER: &str = "__nocks__";
/// Extension appended to the test file name.
pub const FIXTURE_EXTENSION: &str = "json";

// ============================================================================
// SECTION: Location
// ============================================================================

/// Resolved fixture paths for one test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureLocation {
    /// Directory holding the fixture file.
    dir: PathBuf,
    /// Full fixture file path.
    path: PathBuf,
}

impl FixtureLocation {
    /// Resolves the fixture location for a test file.
    ///
    /// `folder` is the effective folder name (after any relocation hook) and
    /// may contain nested components such as `__snapshots__/__nocks__`.
    #[must_use]
    pub fn resolve(test_path: &Path, folder: &str) -> Self {
        let parent = test_path.parent().unwrap_or_else(|| Path::new(""));
        let dir = parent.join(folder);
        let base = test_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = dir.join(format!("{base}.{FIXTURE_EXTENSION}"));
        Self {
            dir,
            path,
        }
    }

    /// Returns the fixture directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the fixture file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
