// crates/http-fixtures-core/src/core/store.rs
// ============================================================================
// Module: HTTP Fixtures Store
// Description: In-memory fixture store with JSON load and ordered persistence.
// Purpose: Map test identities to recorded interactions and keep files stable.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`FixtureStore`] holds the recorded interactions for one test file,
//! keyed by test identity. Loading never fails on a missing or corrupt file;
//! the two cases are reported through [`LoadStatus`] so callers can warn
//! loudly about corruption. Persisting writes keys in an explicit order
//! through a temporary file and rename, or deletes the file when the store
//! is empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde::Serialize;
use serde::ser::SerializeMap;
use thiserror::Error;

use crate::core::identity::TestIdentity;
use crate::core::interaction::Interaction;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made to allocate a unique temporary file.
const TEMP_ATTEMPTS: usize = 16;
/// Counter keeping temporary file names unique within the process.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Errors and Outcomes
// ============================================================================

/// Fixture store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading, writing, or cleaning up.
    #[error("fixture io error: {0}")]
    Io(String),
    /// Serialization failure while writing.
    #[error("fixture serialization error: {0}")]
    Serialize(String),
}

/// Result of loading a fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No fixture file exists yet.
    Missing,
    /// The file parsed successfully.
    Loaded {
        /// Number of test entries loaded.
        entries: usize,
    },
    /// The file exists but could not be parsed; the store starts empty.
    Corrupt {
        /// Parser diagnostic.
        reason: String,
    },
}

/// Result of persisting a fixture store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The fixture file was written.
    Written {
        /// Number of test entries written.
        entries: usize,
    },
    /// The store was empty and an existing file was deleted.
    Deleted {
        /// Whether the fixture directory was removed as well.
        dir_removed: bool,
    },
    /// The store was empty and no file existed.
    Unchanged,
}

// ============================================================================
// SECTION: Fixture Store
// ============================================================================

/// Recorded interactions for one test file, keyed by test identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureStore {
    /// Entries keyed by identity string.
    entries: BTreeMap<String, Vec<Interaction>>,
}

impl FixtureStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from disk.
    ///
    /// A missing file yields [`LoadStatus::Missing`]; malformed JSON yields
    /// [`LoadStatus::Corrupt`]. Both return an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<(Self, LoadStatus), StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok((Self::new(), LoadStatus::Missing));
            }
            Err(err) => return Err(io_error(path, &err)),
        };
        match Self::from_json_slice(&bytes) {
            Ok(store) => {
                let entries = store.len();
                Ok((
                    store,
                    LoadStatus::Loaded {
                        entries,
                    },
                ))
            }
            Err(reason) => Ok((
                Self::new(),
                LoadStatus::Corrupt {
                    reason,
                },
            )),
        }
    }

    /// Parses a store from fixture JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns the parser diagnostic when the bytes are not a fixture object.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, String> {
        let entries: BTreeMap<String, Vec<Interaction>> =
            serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
        Ok(Self {
            entries,
        })
    }

    /// Returns the interactions recorded for `identity`, or an empty slice.
    #[must_use]
    pub fn get(&self, identity: &str) -> &[Interaction] {
        self.entries.get(identity).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true when an entry exists for `identity`.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    /// Replaces the entry for `identity`.
    pub fn set(&mut self, identity: &TestIdentity, interactions: Vec<Interaction>) {
        self.entries.insert(identity.as_str().to_string(), interactions);
    }

    /// Removes the entry for `identity`, returning it when present.
    pub fn remove(&mut self, identity: &str) -> Option<Vec<Interaction>> {
        self.entries.remove(identity)
    }

    /// Drops every entry whose identity is not in `known`.
    ///
    /// Returns the removed identities in lexical order.
    pub fn retain_known(&mut self, known: &BTreeSet<&str>) -> Vec<String> {
        let removed: Vec<String> =
            self.entries.keys().filter(|key| !known.contains(key.as_str())).cloned().collect();
        for key in &removed {
            self.entries.remove(key);
        }
        removed
    }

    /// Iterates stored identity keys in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the store as pretty JSON with keys in `order`.
    ///
    /// Identities in `order` without an entry, and entries whose identity is
    /// not in `order`, are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] when serialization fails.
    pub fn to_ordered_json<'a, I>(&self, order: I) -> Result<Vec<u8>, StoreError>
    where
        I: IntoIterator<Item = &'a TestIdentity>,
    {
        let ordered = OrderedEntries {
            entries: order
                .into_iter()
                .filter_map(|identity| {
                    self.entries
                        .get_key_value(identity.as_str())
                        .map(|(key, value)| (key.as_str(), value.as_slice()))
                })
                .collect(),
        };
        let mut bytes = serde_json::to_vec_pretty(&ordered)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Persists the store to `path` using `order` for key order.
    ///
    /// An empty store deletes the file and then its directory when that
    /// directory is left empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on any filesystem failure other than a
    /// non-empty fixture directory during cleanup.
    pub fn persist<'a, I>(&self, path: &Path, order: I) -> Result<PersistOutcome, StoreError>
    where
        I: IntoIterator<Item = &'a TestIdentity>,
    {
        if self.is_empty() {
            return delete_fixture_file(path);
        }
        let bytes = self.to_ordered_json(order)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, &err))?;
        }
        write_atomic(path, &bytes)?;
        Ok(PersistOutcome::Written {
            entries: self.len(),
        })
    }
}

// ============================================================================
// SECTION: Ordered Serialization
// ============================================================================

/// Borrowed view of store entries in an explicit key order.
struct OrderedEntries<'a> {
    /// Entries in output order.
    entries: Vec<(&'a str, &'a [Interaction])>,
}

impl Serialize for OrderedEntries<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// SECTION: Filesystem Helpers
// ============================================================================

/// Deletes a fixture file and its directory if the directory becomes empty.
fn delete_fixture_file(path: &Path) -> Result<PersistOutcome, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(PersistOutcome::Unchanged),
        Err(err) => return Err(io_error(path, &err)),
    }
    let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(PersistOutcome::Deleted {
            dir_removed: false,
        });
    };
    let dir_removed = match fs::remove_dir(dir) {
        Ok(()) => true,
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::DirectoryNotEmpty | io::ErrorKind::NotFound
            ) =>
        {
            false
        }
        Err(err) => return Err(io_error(dir, &err)),
    };
    Ok(PersistOutcome::Deleted {
        dir_removed,
    })
}

/// Writes bytes to `path` through a synced temporary file and rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let (temp_path, mut file) = create_temp_output(path)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(&temp_path, &err));
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(path, &err));
    }
    Ok(())
}

/// Creates a unique temporary file beside the destination.
fn create_temp_output(path: &Path) -> Result<(PathBuf, fs::File), StoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::Io("fixture path does not include a file name".to_string()))?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_name = format!(".{file_name}.tmp.{}.{attempt}", std::process::id());
        let temp_path = parent.join(temp_name);
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(io_error(&temp_path, &err)),
        }
    }
    Err(StoreError::Io("failed to allocate temporary fixture path".to_string()))
}

/// Formats an I/O error with the path it concerns.
fn io_error(path: &Path, err: &io::Error) -> StoreError {
    StoreError::Io(format!("{}: {err}", path.display()))
}
