// crates/http-fixtures-config/src/lib.rs
// ============================================================================
// Module: HTTP Fixtures Config Library
// Description: Canonical config model and validation for fixture tooling.
// Purpose: Single source of truth for http-fixtures.toml semantics.
// Dependencies: http-fixtures-core, serde, toml
// ============================================================================

//! ## Overview
//! `http-fixtures-config` loads `http-fixtures.toml`, validates it, and turns
//! it into the runtime pieces the lifecycle engine needs: a mode registry,
//! lifecycle options, and a log sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
