// crates/http-fixtures-interceptor/src/tests.rs
// ============================================================================
// Module: Interceptor Unit Tests
// Description: Request normalization and matching rules.
// Purpose: Validate default-port normalization, body matching, and host stripping.
// Dependencies: http-fixtures-interceptor
// ============================================================================

//! ## Overview
//! Unit tests for [`crate::OutboundRequest`] matching helpers.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use http_fixtures_core::Interaction;
use http_fixtures_core::RecordedResponse;
use serde_json::json;

use crate::OutboundRequest;

// ============================================================================
// SECTION: Matching Tests
// ============================================================================

#[test]
fn default_ports_do_not_affect_matching() {
    let mock = Interaction::new("get", "http://api.test:80/items", RecordedResponse::default());
    let request = OutboundRequest::get("HTTP://API.TEST/items").normalized();
    assert_eq!(request.href, "http://api.test/items");
    assert!(request.matches(&mock));
}

#[test]
fn method_must_match() {
    let mock = Interaction::new("POST", "http://api.test/items", RecordedResponse::default());
    let request = OutboundRequest::get("http://api.test/items").normalized();
    assert!(!request.matches(&mock));
}

#[test]
fn recorded_body_must_match() {
    let mock = Interaction::new("POST", "http://api.test/items", RecordedResponse::default())
        .with_body(json!({"name": "a"}));
    let same = OutboundRequest::post_json("http://api.test/items", json!({"name": "a"})).normalized();
    let other = OutboundRequest::post_json("http://api.test/items", json!({"name": "b"})).normalized();
    assert!(same.matches(&mock));
    assert!(!other.matches(&mock));
}

#[test]
fn mock_without_body_matches_any_body() {
    let mock = Interaction::new("POST", "http://api.test/items", RecordedResponse::default());
    let request = OutboundRequest::post_json("http://api.test/items", json!([1])).normalized();
    assert!(request.matches(&mock));
}

#[test]
fn recorded_interaction_drops_host_header() {
    let request = OutboundRequest::get("http://api.test/")
        .with_header("Host", "api.test")
        .with_header("Accept", "application/json")
        .normalized();
    let interaction = request.to_interaction(RecordedResponse::new(204, None));
    assert!(!interaction.headers.contains_key("host"));
    assert_eq!(interaction.headers.get("accept").map(String::as_str), Some("application/json"));
    assert_eq!(interaction.response.status, 204);
}

#[test]
fn unmatched_record_keeps_request_details() {
    let request = OutboundRequest::new("delete", "http://api.test:80/x").normalized();
    let unmatched = request.to_unmatched();
    assert_eq!(unmatched.method, "DELETE");
    assert_eq!(unmatched.href, "http://api.test/x");
}
