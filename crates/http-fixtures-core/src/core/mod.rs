// crates/http-fixtures-core/src/core/mod.rs
// ============================================================================
// Module: HTTP Fixtures Core Types
// Description: Modes, identities, interactions, hashing, and the fixture store.
// Purpose: Provide the stable data model behind fixture replay and capture.
// Dependencies: serde, serde_json, serde_jcs, sha2, url
// ============================================================================

//! ## Overview
//! Core types are the leaves of the fixture lifecycle: they carry no
//! knowledge of the interception engine or the test framework.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identity;
pub mod interaction;
pub mod location;
pub mod mode;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::HashError;
pub use hashing::fixture_file_stem;
pub use hashing::stable_hash;
pub use identity::IdentityError;
pub use identity::IdentityRecord;
pub use identity::TestHandle;
pub use identity::TestIdentity;
pub use identity::TestIdentityTracker;
pub use interaction::HeaderMap;
pub use interaction::INTERCEPTED_METHODS;
pub use interaction::Interaction;
pub use interaction::RecordedResponse;
pub use interaction::UnmatchedRequest;
pub use interaction::normalize_href;
pub use location::DEFAULT_FIXTURE_FOLDER;
pub use location::FIXTURE_EXTENSION;
pub use location::FixtureLocation;
pub use mode::CI_ENV_VAR;
pub use mode::FixtureMode;
pub use mode::MODE_ENV_VAR;
pub use mode::ModeError;
pub use mode::ModeRegistry;
pub use store::FixtureStore;
pub use store::LoadStatus;
pub use store::PersistOutcome;
pub use store::StoreError;
