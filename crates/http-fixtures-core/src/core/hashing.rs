// crates/http-fixtures-core/src/core/hashing.rs
// ============================================================================
// Module: HTTP Fixtures Stable Hashing
// Description: Canonical JSON hashing for reproducible fixture names.
// Purpose: Derive tokens that are identical across runs and processes.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Values are canonicalized with RFC 8785 (JCS) before hashing, so object key
//! order never changes the result. Tokens are prefixed with `x` so consumers
//! that coerce strings loosely never read them as numbers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Non-numeric prefix applied to every stable hash token.
pub const STABLE_HASH_PREFIX: char = 'x';

/// Replacement for non-alphanumeric characters in fixture stems.
const STEM_REPLACEMENT: char = '_';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing stable hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Returns the stable hash token for a JSON-serializable value.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn stable_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, HashError> {
    let bytes = canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    let mut token = String::with_capacity(1 + digest.len() * 2);
    token.push(STABLE_HASH_PREFIX);
    token.push_str(&hex_encode(&digest));
    Ok(token)
}

/// Builds a readable, stable stem for a single recorded request.
///
/// The stem joins the host and path of `href` (non-alphanumerics replaced by
/// `_`) with the stable hash of `value`.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when `value` cannot be canonicalized.
pub fn fixture_file_stem<T: Serialize + ?Sized>(
    href: &str,
    value: &T,
) -> Result<String, HashError> {
    let hash = stable_hash(value)?;
    let readable = match url::Url::parse(href) {
        Ok(url) => format!("{}{}", url.host_str().unwrap_or_default(), url.path()),
        Err(_) => href.to_string(),
    };
    let sanitized: String = readable
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { STEM_REPLACEMENT })
        .collect();
    Ok(format!("{sanitized}{STEM_REPLACEMENT}{hash}"))
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
