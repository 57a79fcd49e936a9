// crates/http-fixtures-interceptor/src/request.rs
// ============================================================================
// Module: Outbound Requests
// Description: Request model passed through the in-process interceptor.
// Purpose: Normalize requests once and convert them into fixture records.
// Dependencies: http-fixtures-core, serde_json
// ============================================================================

//! ## Overview
//! Test code describes each HTTP call as an [`OutboundRequest`]. The
//! interceptor normalizes it before matching so `http://host:80/a` and
//! `http://host/a` are the same request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use http_fixtures_core::HeaderMap;
use http_fixtures_core::Interaction;
use http_fixtures_core::RecordedResponse;
use http_fixtures_core::UnmatchedRequest;
use http_fixtures_core::normalize_href;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Request header never stored in fixtures; the href already carries it.
pub const HOST_HEADER: &str = "host";

// ============================================================================
// SECTION: Outbound Request
// ============================================================================

/// HTTP request issued by code under test.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: String,
    /// Absolute request URL.
    pub href: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body; text bodies are JSON strings.
    pub body: Option<Value>,
}

impl OutboundRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: &str, href: impl Into<String>) -> Self {
        Self {
            method: method.to_string(),
            href: href.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Shorthand for a GET request.
    #[must_use]
    pub fn get(href: impl Into<String>) -> Self {
        Self::new("GET", href)
    }

    /// Shorthand for a POST request with a JSON body.
    #[must_use]
    pub fn post_json(href: impl Into<String>, body: Value) -> Self {
        Self::new("POST", href).with_body(body)
    }

    /// Adds a request header. Header names are stored lowercase.
    #[must_use]
    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the request with an uppercase method and normalized href.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.method = self.method.to_ascii_uppercase();
        self.href = normalize_href(&self.href);
        self
    }

    /// Returns true when a recorded interaction replays this request.
    ///
    /// Method and href must match; the body must match only when the
    /// interaction recorded one.
    #[must_use]
    pub fn matches(&self, mock: &Interaction) -> bool {
        mock.method.eq_ignore_ascii_case(&self.method)
            && normalize_href(&mock.href) == self.href
            && mock.body.as_ref().is_none_or(|body| self.body.as_ref() == Some(body))
    }

    /// Builds the fixture record for this request and its live response.
    #[must_use]
    pub fn to_interaction(&self, response: RecordedResponse) -> Interaction {
        let headers =
            self.headers.iter().filter(|(key, _)| !key.eq_ignore_ascii_case(HOST_HEADER));
        Interaction {
            method: self.method.clone(),
            href: self.href.clone(),
            headers: headers.map(|(key, value)| (key.clone(), value.clone())).collect(),
            body: self.body.clone(),
            response,
            extra: Map::new(),
        }
    }

    /// Builds the diagnostic record for an unmatched request.
    #[must_use]
    pub fn to_unmatched(&self) -> UnmatchedRequest {
        UnmatchedRequest {
            method: self.method.clone(),
            href: self.href.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}
