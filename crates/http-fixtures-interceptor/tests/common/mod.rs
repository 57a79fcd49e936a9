// crates/http-fixtures-interceptor/tests/common/mod.rs
// ============================================================================
// Module: Interceptor Test Support
// Description: Counting transport and local upstream server helpers.
// Purpose: Observe which requests reach the network.
// Dependencies: http-fixtures-interceptor, tiny_http
// ============================================================================

//! ## Overview
//! [`CountingTransport`] answers every request with a canned response and
//! remembers what it was sent. [`spawn_upstream`] starts a `tiny_http`
//! server that echoes request details as JSON.

#![allow(dead_code, reason = "Shared helpers are not used by every test crate.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use http_fixtures_core::InterceptError;
use http_fixtures_core::RecordedResponse;
use http_fixtures_interceptor::OutboundRequest;
use http_fixtures_interceptor::Transport;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Counting Transport
// ============================================================================

/// Transport that records requests and returns a fixed live response.
#[derive(Clone, Default)]
pub struct CountingTransport {
    sent: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl CountingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for CountingTransport {
    fn send(&self, request: &OutboundRequest) -> Result<RecordedResponse, InterceptError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(RecordedResponse::new(200, Some(json!({"live": request.href})))
            .with_header("content-type", "application/json"))
    }
}

// ============================================================================
// SECTION: Upstream Server
// ============================================================================

/// Starts a server answering `count` requests with a JSON echo.
pub fn spawn_upstream(count: usize) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        for _ in 0 .. count {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let payload = json!({
                "method": request.method().as_str(),
                "path": request.url(),
                "body": body,
            });
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(payload.to_string()).with_header(header);
            let _ = request.respond(response);
        }
    });
    (format!("http://{addr}"), handle)
}
