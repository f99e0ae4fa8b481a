//! Request verification
//!
//! Bodiless requests carry their signed payload in the `verification` header
//! and must sign a string naming the operation. Requests with a body sign the
//! body itself.
//!
//! Payloads hold no nonce or timestamp, so a captured request verifies again
//! if replayed.

use crate::error::{ApiError, Result};
use axum::http::HeaderMap;
use ed25519_dalek::VerifyingKey;
use tracing::debug;

/// Header carrying the signed payload for GET and DELETE requests
pub const VERIFICATION_HEADER: &str = "verification";

/// Verify the `verification` header and require it to sign exactly `expected`
pub fn verify_header(key: &VerifyingKey, headers: &HeaderMap, expected: &str) -> Result<()> {
    let signed = headers
        .get(VERIFICATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let payload = verify(key, signed)?;
    if payload != expected {
        debug!(expected, payload = %payload, "signed payload does not match request");
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Verify a signed request body and return the JSON document it carries
pub fn verify_body(key: &VerifyingKey, body: &[u8]) -> Result<String> {
    let signed = std::str::from_utf8(body).map_err(|_| ApiError::Unauthorized)?;
    verify(key, signed)
}

fn verify(key: &VerifyingKey, signed: &str) -> Result<String> {
    lockbox_auth::parse(signed, key).map_err(|e| {
        debug!(error = %e, "request verification failed");
        ApiError::Unauthorized
    })
}
