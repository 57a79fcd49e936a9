// crates/http-fixtures-core/src/runtime/reconcile.rs
// ============================================================================
// Module: HTTP Fixtures Reconciliation
// Description: Prunes fixture entries for tests that no longer exist.
// Purpose: Keep recorded fixture files aligned with the declared test set.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! After a recording run, entries whose identity was not seen during the run
//! belong to deleted or renamed tests and are dropped. The surviving entries
//! are written in the order the tests were declared so fixture diffs stay
//! small.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::FixtureStore;
use crate::core::TestIdentity;
use crate::core::TestIdentityTracker;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Result of reconciling a store against the tests seen in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Identities pruned from the store, in lexical order.
    pub removed: Vec<String>,
    /// Persist order: seen identities that still have entries, in declaration order.
    pub order: Vec<TestIdentity>,
}

// ============================================================================
// SECTION: Reconcile
// ============================================================================

/// Removes entries for unseen tests and computes the persist order.
pub fn reconcile(store: &mut FixtureStore, tracker: &TestIdentityTracker) -> ReconcileReport {
    let removed = store.retain_known(&tracker.known());
    let order =
        tracker.seen().filter(|identity| store.contains(identity.as_str())).cloned().collect();
    ReconcileReport {
        removed,
        order,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
