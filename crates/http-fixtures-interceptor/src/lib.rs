// crates/http-fixtures-interceptor/src/lib.rs
// ============================================================================
// Module: HTTP Fixtures Interceptor Library
// Description: In-process HTTP interception with a live reqwest transport.
// Purpose: Give test code an HTTP entry point the fixture lifecycle can control.
// Dependencies: http-fixtures-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Code under test sends requests through an [`InProcessInterceptor`]
//! instead of an HTTP client. The lifecycle engine drives the same
//! interceptor (clones share state) to replay, record, or block traffic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod interceptor;
pub mod request;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use interceptor::InProcessInterceptor;
pub use request::HOST_HEADER;
pub use request::OutboundRequest;
pub use transport::LiveTransport;
pub use transport::LiveTransportConfig;
pub use transport::Transport;

#[cfg(test)]
mod tests;
