// crates/http-fixtures-core/src/runtime/mod.rs
// ============================================================================
// Module: HTTP Fixtures Runtime
// Description: Lifecycle engine, reconciliation, and diagnostics.
// Purpose: Turn suite hooks into interceptor calls and fixture file updates.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold everything that changes during a suite run. The
//! engine is the only writer of fixture files.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod log;
pub mod reconcile;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::DEFAULT_LOG_NAME_PREFIX;
pub use engine::FixtureLifecycle;
pub use engine::FolderNameHook;
pub use engine::LifecycleError;
pub use engine::LifecycleOptions;
pub use engine::SuiteReport;
pub use engine::TestOutcome;
pub use engine::UnmatchedContext;
pub use engine::UnmatchedMessageHook;
pub use engine::default_unmatched_message;
pub use log::FileLogSink;
pub use log::FixtureLogEvent;
pub use log::FixtureLogSink;
pub use log::LogEventKind;
pub use log::LogLevel;
pub use log::MemoryLogSink;
pub use log::NoopLogSink;
pub use log::StderrLogSink;
pub use reconcile::ReconcileReport;
pub use reconcile::reconcile;
