// crates/http-fixtures-core/src/interfaces/mod.rs
// ============================================================================
// Module: HTTP Fixtures Interfaces
// Description: Capability contracts for interception engines and test frameworks.
// Purpose: Keep the lifecycle engine independent of any concrete HTTP stack.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The lifecycle engine consumes two external capabilities. An
//! [`Interceptor`] substitutes, records, or blocks outbound requests. A test
//! framework adapter drives the engine through [`LifecycleHooks`]. Neither
//! side is implemented here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::Interaction;
use crate::core::TestHandle;
use crate::core::TestIdentity;
use crate::core::UnmatchedRequest;

// ============================================================================
// SECTION: Interceptor
// ============================================================================

/// Errors raised by interception engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptError {
    /// A request matched no mock while real network access was disabled.
    #[error("network access disabled: no fixture matched {method} {href}")]
    NetConnectDisallowed {
        /// Request method.
        method: String,
        /// Request URL.
        href: String,
    },
    /// The live transport failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The request URL could not be parsed.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    /// The engine's shared state lock was poisoned.
    #[error("interceptor state poisoned: {0}")]
    Poisoned(String),
}

/// Token identifying a registered unmatched-request listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Creates a listener identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Callback invoked synchronously for each unmatched request.
pub type UnmatchedListener = Arc<dyn Fn(&UnmatchedRequest) + Send + Sync>;

/// HTTP interception capability consumed by the lifecycle engine.
pub trait Interceptor {
    /// Starts intercepting outbound requests for the given methods.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when interception cannot be installed.
    fn activate(&self, methods: &[&str]) -> Result<(), InterceptError>;

    /// Stops intercepting; requests pass straight through afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when interception cannot be removed.
    fn restore(&self) -> Result<(), InterceptError>;

    /// Lets requests without a matching mock reach the real network.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn enable_real_network(&self) -> Result<(), InterceptError>;

    /// Blocks requests without a matching mock.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn disable_real_network(&self) -> Result<(), InterceptError>;

    /// Defines replay mocks from recorded interactions and returns how many were defined.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when a mock cannot be defined.
    fn define_mocks(&self, interactions: &[Interaction]) -> Result<usize, InterceptError>;

    /// Starts capturing every request/response pair.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn start_recording(&self) -> Result<(), InterceptError>;

    /// Stops capturing and returns the captured interactions in call order.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn stop_recording(&self) -> Result<Vec<Interaction>, InterceptError>;

    /// Registers a listener for unmatched requests.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn on_unmatched(&self, listener: UnmatchedListener) -> Result<ListenerId, InterceptError>;

    /// Removes a previously registered unmatched-request listener.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn remove_unmatched_listener(&self, id: ListenerId) -> Result<(), InterceptError>;

    /// Removes every defined mock.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the engine state is unusable.
    fn reset_all_mocks(&self) -> Result<(), InterceptError>;
}

// ============================================================================
// SECTION: Test Framework Hooks
// ============================================================================

/// "Test started" event reported by a framework adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStart {
    /// Opaque framework handle for the test.
    pub handle: TestHandle,
    /// Declared full name (suite path plus test title).
    pub full_name: String,
    /// Whether the framework skips this test.
    pub skipped: bool,
}

impl TestStart {
    /// Creates an event for a test that will run.
    #[must_use]
    pub fn new(handle: TestHandle, full_name: impl Into<String>) -> Self {
        Self {
            handle,
            full_name: full_name.into(),
            skipped: false,
        }
    }

    /// Creates an event for a test the framework skips.
    #[must_use]
    pub fn skipped(handle: TestHandle, full_name: impl Into<String>) -> Self {
        Self {
            handle,
            full_name: full_name.into(),
            skipped: true,
        }
    }
}

/// Lifecycle hooks a test framework adapter drives, in order:
/// `suite_start`, then `test_start`/`test_end` per test, then `suite_end`.
pub trait LifecycleHooks {
    /// Per-test result returned from [`LifecycleHooks::test_end`].
    type Outcome;
    /// Suite result returned from [`LifecycleHooks::suite_end`].
    type Report;
    /// Error type surfaced to the framework.
    type Error;

    /// Runs once before any test.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when suite setup fails.
    fn suite_start(&mut self) -> Result<(), Self::Error>;

    /// Runs when a test starts (skipped tests included).
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the test cannot be prepared.
    fn test_start(&mut self, test: &TestStart) -> Result<TestIdentity, Self::Error>;

    /// Runs when a non-skipped test ends.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the test must fail.
    fn test_end(&mut self, handle: TestHandle) -> Result<Self::Outcome, Self::Error>;

    /// Runs once after every test.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when suite teardown fails.
    fn suite_end(&mut self) -> Result<Self::Report, Self::Error>;
}
