// crates/http-fixtures-core/src/runtime/log.rs
// ============================================================================
// Module: HTTP Fixtures Diagnostics
// Description: Structured diagnostic events and sinks for the fixture lifecycle.
// Purpose: Report loads, captures, pruning, and unmatched requests as JSON lines.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The lifecycle engine reports what it does through a [`FixtureLogSink`].
//! Events are structured so CI logs can be filtered by `event`, while the
//! `message` field keeps the human `"<prefix>: <mode>: ..."` form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::FixtureMode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine progress.
    Info,
    /// Something the developer should look at.
    Warn,
}

/// Diagnostic event classification.
///
/// # Invariants
/// - Variants are stable for log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEventKind {
    /// Fixture file loaded.
    FixturesLoaded,
    /// No fixture file exists yet.
    FixturesMissing,
    /// Fixture file exists but is malformed.
    FixturesCorrupt,
    /// Replay mocks defined for a test.
    MocksDefined,
    /// A test issued requests that matched no fixture.
    UnmatchedRequests,
    /// Interactions captured for a test.
    Recorded,
    /// A test made no calls and its stale entry was dropped.
    EntryRemoved,
    /// An entry for a test that no longer exists was pruned.
    ObsoleteEntryPruned,
    /// Fixture file written.
    FixturesWritten,
    /// Fixture file deleted because nothing was left.
    FixturesDeleted,
}

impl LogEventKind {
    /// Returns a stable label for the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixturesLoaded => "fixtures_loaded",
            Self::FixturesMissing => "fixtures_missing",
            Self::FixturesCorrupt => "fixtures_corrupt",
            Self::MocksDefined => "mocks_defined",
            Self::UnmatchedRequests => "unmatched_requests",
            Self::Recorded => "recorded",
            Self::EntryRemoved => "entry_removed",
            Self::ObsoleteEntryPruned => "obsolete_entry_pruned",
            Self::FixturesWritten => "fixtures_written",
            Self::FixturesDeleted => "fixtures_deleted",
        }
    }
}

/// Structured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureLogEvent {
    /// Event classification.
    pub event: LogEventKind,
    /// Severity.
    pub level: LogLevel,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Log name prefix.
    pub prefix: String,
    /// Active fixture mode.
    pub mode: FixtureMode,
    /// Human-readable message.
    pub message: String,
    /// Test identity when the event concerns one test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    /// Fixture file path when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_path: Option<String>,
    /// Count associated with the event (requests, entries, mocks).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl FixtureLogEvent {
    /// Creates an event with the standard `"<prefix>: <mode>: <detail>"` message.
    #[must_use]
    pub fn new(
        event: LogEventKind,
        level: LogLevel,
        prefix: &str,
        mode: FixtureMode,
        detail: &str,
    ) -> Self {
        Self {
            event,
            level,
            timestamp_ms: now_millis(),
            prefix: prefix.to_string(),
            mode,
            message: format!("{prefix}: {mode}: {detail}"),
            test: None,
            fixture_path: None,
            count: None,
        }
    }

    /// Attaches a test identity.
    #[must_use]
    pub fn with_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    /// Attaches a fixture path.
    #[must_use]
    pub fn with_fixture_path(mut self, path: &Path) -> Self {
        self.fixture_path = Some(path.display().to_string());
        self
    }

    /// Attaches a count.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for lifecycle diagnostic events.
pub trait FixtureLogSink {
    /// Record a diagnostic event.
    fn record(&self, event: &FixtureLogEvent);
}

impl<T: FixtureLogSink + ?Sized> FixtureLogSink for Box<T> {
    fn record(&self, event: &FixtureLogEvent) {
        (**self).record(event);
    }
}

impl<T: FixtureLogSink + ?Sized> FixtureLogSink for Arc<T> {
    fn record(&self, event: &FixtureLogEvent) {
        (**self).record(event);
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that logs JSON lines to stderr.
pub struct StderrLogSink;

impl FixtureLogSink for StderrLogSink {
    fn record(&self, event: &FixtureLogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileLogSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FixtureLogSink for FileLogSink {
    fn record(&self, event: &FixtureLogEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps events in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    /// Recorded events.
    events: Arc<Mutex<Vec<FixtureLogEvent>>>,
}

impl MemoryLogSink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<FixtureLogEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns recorded events of one kind.
    #[must_use]
    pub fn events_of(&self, kind: LogEventKind) -> Vec<FixtureLogEvent> {
        self.events().into_iter().filter(|event| event.event == kind).collect()
    }
}

impl FixtureLogSink for MemoryLogSink {
    fn record(&self, event: &FixtureLogEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

/// No-op sink.
pub struct NoopLogSink;

impl FixtureLogSink for NoopLogSink {
    fn record(&self, _event: &FixtureLogEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current time in milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_millis()).unwrap_or(0)
}
