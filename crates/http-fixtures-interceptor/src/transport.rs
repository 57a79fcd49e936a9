// crates/http-fixtures-interceptor/src/transport.rs
// ============================================================================
// Module: Live Transport
// Description: Real network transport used for passthrough and recording.
// Purpose: Send requests with bounded timeouts and response sizes.
// Dependencies: http-fixtures-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The interceptor reaches the network only through a [`Transport`]. The
//! default [`LiveTransport`] uses a blocking `reqwest` client with redirects
//! disabled, so every hop is visible to the interceptor as its own request.
//! Response bodies are stored as JSON when they parse as JSON and as text
//! otherwise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use http_fixtures_core::HeaderMap;
use http_fixtures_core::InterceptError;
use http_fixtures_core::RecordedResponse;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::request::HOST_HEADER;
use crate::request::OutboundRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default cap on response body size.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Sends requests that the interceptor lets through.
pub trait Transport: Send + Sync {
    /// Sends a normalized request and returns its response.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError`] when the request cannot be sent or read.
    fn send(&self, request: &OutboundRequest) -> Result<RecordedResponse, InterceptError>;
}

// ============================================================================
// SECTION: Live Transport
// ============================================================================

/// Live transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTransportConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for LiveTransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: format!("http-fixtures/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Blocking `reqwest` transport.
pub struct LiveTransport {
    /// Transport configuration.
    config: LiveTransportConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl LiveTransport {
    /// Creates a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::Transport`] when the client cannot be built.
    pub fn new(config: LiveTransportConfig) -> Result<Self, InterceptError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| InterceptError::Transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            client,
        })
    }
}

impl Transport for LiveTransport {
    fn send(&self, request: &OutboundRequest) -> Result<RecordedResponse, InterceptError> {
        let url = Url::parse(&request.href)
            .map_err(|err| InterceptError::InvalidUrl(format!("{}: {err}", request.href)))?;
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            InterceptError::Transport(format!("unsupported http method {}", request.method))
        })?;
        let mut builder = self.client.request(method, url);
        for (key, value) in &request.headers {
            if !key.eq_ignore_ascii_case(HOST_HEADER) {
                builder = builder.header(key.as_str(), value.as_str());
            }
        }
        match &request.body {
            None => {}
            Some(Value::String(text)) => builder = builder.body(text.clone()),
            Some(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|err| InterceptError::Transport(format!("body encoding failed: {err}")))?;
                if !request.headers.contains_key(CONTENT_TYPE.as_str()) {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                }
                builder = builder.body(bytes);
            }
        }
        let mut response = builder
            .send()
            .map_err(|err| InterceptError::Transport(format!("http request failed: {err}")))?;
        let status = response.status().as_u16();
        let headers: HeaderMap = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let bytes = read_response_limited(&mut response, self.config.max_response_bytes)?;
        Ok(RecordedResponse {
            status,
            headers,
            body: decode_body(&bytes),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, InterceptError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| InterceptError::Transport("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(InterceptError::Transport("http response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|err| InterceptError::Transport(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(InterceptError::Transport("http response exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Decodes a response body as JSON, falling back to text.
fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        return Some(value);
    }
    Some(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
