// crates/http-fixtures-core/src/lib.rs
// ============================================================================
// Module: HTTP Fixtures Core Library
// Description: Public API surface for the HTTP fixture lifecycle.
// Purpose: Expose core types, interfaces, and the lifecycle runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! HTTP fixtures lets a test suite replay recorded HTTP traffic instead of
//! reaching real services. A single mode decides whether fixtures are
//! replayed with live fallback, replayed strictly, re-recorded, or ignored.
//! The crate is independent of any HTTP client or test framework; both plug
//! in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::InterceptError;
pub use interfaces::Interceptor;
pub use interfaces::LifecycleHooks;
pub use interfaces::ListenerId;
pub use interfaces::TestStart;
pub use interfaces::UnmatchedListener;
pub use runtime::DEFAULT_LOG_NAME_PREFIX;
pub use runtime::FileLogSink;
pub use runtime::FixtureLifecycle;
pub use runtime::FixtureLogEvent;
pub use runtime::FixtureLogSink;
pub use runtime::LifecycleError;
pub use runtime::LifecycleOptions;
pub use runtime::LogEventKind;
pub use runtime::LogLevel;
pub use runtime::MemoryLogSink;
pub use runtime::NoopLogSink;
pub use runtime::ReconcileReport;
pub use runtime::StderrLogSink;
pub use runtime::SuiteReport;
pub use runtime::TestOutcome;
pub use runtime::UnmatchedContext;
pub use runtime::reconcile;
