// crates/http-fixtures-interceptor/tests/live_transport.rs
// ============================================================================
// Module: Live Transport Tests
// Description: Requests sent to a local tiny_http upstream.
// Purpose: Validate live passthrough, JSON/text body decoding, and URL errors.
// Dependencies: http-fixtures-interceptor, tiny_http
// ============================================================================

//! ## Overview
//! Exercises [`http_fixtures_interceptor::LiveTransport`] against a local
//! server so recorded responses match what the network actually returned.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::thread;

use common::spawn_upstream;
use http_fixtures_core::INTERCEPTED_METHODS;
use http_fixtures_core::InterceptError;
use http_fixtures_core::Interceptor;
use http_fixtures_interceptor::InProcessInterceptor;
use http_fixtures_interceptor::LiveTransport;
use http_fixtures_interceptor::LiveTransportConfig;
use http_fixtures_interceptor::OutboundRequest;
use http_fixtures_interceptor::Transport;
use serde_json::Value;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;

fn transport() -> LiveTransport {
    LiveTransport::new(LiveTransportConfig {
        timeout_ms: 5_000,
        ..LiveTransportConfig::default()
    })
    .unwrap()
}

#[test]
fn live_json_response_is_kept_structured() {
    let (base, handle) = spawn_upstream(1);
    let response = transport()
        .send(&OutboundRequest::post_json(format!("{base}/widgets"), json!({"name": "w"})).normalized())
        .unwrap();
    handle.join().unwrap();

    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/widgets");
    let sent: Value = serde_json::from_str(body["body"].as_str().unwrap()).unwrap();
    assert_eq!(sent, json!({"name": "w"}));
    assert_eq!(response.headers.get("content-type").map(String::as_str), Some("application/json"));
}

#[test]
fn live_text_response_is_kept_as_string() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = request.respond(Response::from_string("plain text").with_status_code(418));
        }
    });

    let response =
        transport().send(&OutboundRequest::get(format!("http://{addr}/tea")).normalized()).unwrap();
    handle.join().unwrap();
    assert_eq!(response.status, 418);
    assert_eq!(response.body, Some(Value::String("plain text".to_string())));
}

#[test]
fn oversized_response_is_rejected() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = request.respond(Response::from_string("x".repeat(64)));
        }
    });

    let small = LiveTransport::new(LiveTransportConfig {
        max_response_bytes: 16,
        ..LiveTransportConfig::default()
    })
    .unwrap();
    let err = small.send(&OutboundRequest::get(format!("http://{addr}/")).normalized()).unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, InterceptError::Transport(_)));
}

#[test]
fn invalid_url_is_reported() {
    let err = transport().send(&OutboundRequest::get("not a url")).unwrap_err();
    assert!(matches!(err, InterceptError::InvalidUrl(_)));
}

#[test]
fn recording_through_live_transport_captures_upstream_response() {
    let (base, handle) = spawn_upstream(1);
    let interceptor = InProcessInterceptor::new(transport());
    interceptor.activate(&INTERCEPTED_METHODS).unwrap();
    interceptor.start_recording().unwrap();
    let live = interceptor.send(OutboundRequest::get(format!("{base}/recorded"))).unwrap();
    let captured = interceptor.stop_recording().unwrap();
    handle.join().unwrap();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].response, live);
    assert_eq!(captured[0].response.body.as_ref().unwrap()["path"], "/recorded");
}
