// crates/http-fixtures-core/src/core/identity.rs
// ============================================================================
// Module: HTTP Fixtures Test Identity
// Description: Unique, stable identities for tests within a suite run.
// Purpose: Key fixture entries even when test names collide.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each test gets the identity `"<full name> <occurrence>"` where the
//! occurrence counts earlier tests with the same declared name. Identities
//! are owned by the [`TestIdentityTracker`] and looked up by the opaque
//! [`TestHandle`] the framework adapter provides. The tracker also keeps the
//! ordered sequence of every test seen, which drives reconciliation and the
//! persisted key order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Opaque per-test handle supplied by the test framework adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestHandle(u64);

impl TestHandle {
    /// Creates a handle from a raw framework value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique test identity used as the fixture store key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestIdentity(String);

impl TestIdentity {
    /// Builds the identity for a declared name and its 1-based occurrence.
    #[must_use]
    pub fn from_occurrence(full_name: &str, occurrence: u32) -> Self {
        Self(format!("{full_name} {occurrence}"))
    }

    /// Wraps an existing identity string, such as a key read from disk.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TestIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the identity tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The framework reported the same handle twice.
    #[error("test handle {0} was already registered")]
    DuplicateHandle(TestHandle),
}

// ============================================================================
// SECTION: Tracker
// ============================================================================

/// Identity record kept for each registered test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Declared full name reported by the framework.
    pub full_name: String,
    /// Occurrence number of the declared name (1-based).
    pub occurrence: u32,
    /// Derived unique identity.
    pub identity: TestIdentity,
}

/// Assigns unique identities and records every test seen during a run.
#[derive(Debug, Clone, Default)]
pub struct TestIdentityTracker {
    /// Current occurrence counter per declared full name.
    counters: BTreeMap<String, u32>,
    /// Identity records keyed by framework handle.
    records: BTreeMap<TestHandle, IdentityRecord>,
    /// Handles in first-encounter order, skipped tests included.
    seen: Vec<TestHandle>,
}

impl TestIdentityTracker {
    /// Creates an empty tracker for a new suite run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a started test and returns its unique identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::DuplicateHandle`] when `handle` was already registered.
    pub fn register(
        &mut self,
        handle: TestHandle,
        full_name: &str,
    ) -> Result<TestIdentity, IdentityError> {
        if self.records.contains_key(&handle) {
            return Err(IdentityError::DuplicateHandle(handle));
        }
        let counter = self.counters.entry(full_name.to_string()).or_insert(0);
        *counter = counter.saturating_add(1);
        let occurrence = *counter;
        let identity = TestIdentity::from_occurrence(full_name, occurrence);
        self.records.insert(
            handle,
            IdentityRecord {
                full_name: full_name.to_string(),
                occurrence,
                identity: identity.clone(),
            },
        );
        self.seen.push(handle);
        Ok(identity)
    }

    /// Looks up the identity assigned to a handle.
    #[must_use]
    pub fn identity(&self, handle: TestHandle) -> Option<&TestIdentity> {
        self.records.get(&handle).map(|record| &record.identity)
    }

    /// Looks up the full identity record assigned to a handle.
    #[must_use]
    pub fn record(&self, handle: TestHandle) -> Option<&IdentityRecord> {
        self.records.get(&handle)
    }

    /// Iterates identities in the order tests were first encountered.
    pub fn seen(&self) -> impl Iterator<Item = &TestIdentity> {
        self.seen.iter().filter_map(|handle| self.identity(*handle))
    }

    /// Returns the set of identities seen during this run.
    #[must_use]
    pub fn known(&self) -> BTreeSet<&str> {
        self.seen().map(TestIdentity::as_str).collect()
    }

    /// Returns true when `identity` belongs to a test seen this run.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.seen().any(|seen| seen.as_str() == identity)
    }

    /// Returns the number of tests seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true when no test has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
