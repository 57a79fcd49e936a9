// crates/http-fixtures-core/src/core/interaction.rs
// ============================================================================
// Module: HTTP Fixtures Interactions
// Description: Recorded request/response pairs and unmatched request records.
// Purpose: Define the JSON shape persisted inside fixture files.
// Dependencies: serde, serde_json, url
// ============================================================================

//! ## Overview
//! An [`Interaction`] is one recorded request and its response. The core
//! treats interactions as opaque JSON beyond the fields it names: unknown
//! fields are preserved verbatim through `extra` so hand-edited fixture
//! files survive a load and re-persist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// HTTP methods intercepted while fixtures are active.
pub const INTERCEPTED_METHODS: [&str; 8] =
    ["DELETE", "GET", "HEAD", "MERGE", "OPTIONS", "PATCH", "POST", "PUT"];

/// Default status for interactions recorded without a response block.
const DEFAULT_RESPONSE_STATUS: u16 = 200;

// ============================================================================
// SECTION: Interaction Types
// ============================================================================

/// Header map used for recorded requests and responses.
pub type HeaderMap = BTreeMap<String, String>;

/// Response half of a recorded interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponse {
    /// HTTP status code.
    #[serde(default = "default_status")]
    pub status: u16,
    /// Response headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderMap,
    /// Response body; JSON bodies are kept structured, others as strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Default for RecordedResponse {
    fn default() -> Self {
        Self {
            status: DEFAULT_RESPONSE_STATUS,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RecordedResponse {
    /// Creates a response with a status and body.
    #[must_use]
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Adds a header to the response.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// One recorded request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Uppercase HTTP method.
    pub method: String,
    /// Absolute request URL.
    pub href: String,
    /// Request headers (the redundant `host` header is never stored).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: HeaderMap,
    /// Request body, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Recorded response.
    #[serde(default)]
    pub response: RecordedResponse,
    /// Unrecognized fields preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Interaction {
    /// Creates an interaction with no headers, body, or extra fields.
    #[must_use]
    pub fn new(method: &str, href: &str, response: RecordedResponse) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            href: href.to_string(),
            headers: HeaderMap::new(),
            body: None,
            response,
            extra: Map::new(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// An intercepted request that matched no defined mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Normalized request URL.
    pub href: String,
    /// Request headers.
    #[serde(default)]
    pub headers: HeaderMap,
    /// Request body, if any.
    #[serde(default)]
    pub body: Option<Value>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Normalizes a URL so default ports and casing do not affect matching.
///
/// Unparseable input is returned unchanged.
#[must_use]
pub fn normalize_href(href: &str) -> String {
    url::Url::parse(href).map_or_else(|_| href.to_string(), |url| url.to_string())
}

/// Serde default for [`RecordedResponse::status`].
const fn default_status() -> u16 {
    DEFAULT_RESPONSE_STATUS
}
