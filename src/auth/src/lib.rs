//! Signed request payloads
//!
//! Payloads travel in a compact `header.payload.signature` form: each part is
//! base64url without padding, the header is `{"alg":"EdDSA"}`, and the
//! signature is Ed25519 over the ASCII `header.payload` prefix.
//!
//! Signed payloads carry no nonce or expiry, so a captured payload can be
//! replayed for as long as the key is trusted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::Deserialize;
use thiserror::Error;

/// Signing algorithm named in the payload header
pub const ALGORITHM: &str = "EdDSA";

/// Errors from signing or verifying payloads
#[derive(Debug, Error)]
pub enum AuthError {
    /// Not three dot-separated parts
    #[error("Malformed signed payload")]
    Malformed,

    /// A part is not valid base64url or the header is not valid JSON
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Header names an algorithm other than EdDSA
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature does not match the payload and key
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key material could not be decoded
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, AuthError>;

const HEADER: &str = r#"{"alg":"EdDSA"}"#;

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Sign `payload` with `key`, returning the compact serialization
pub fn sign(payload: &str, key: &SigningKey) -> String {
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(HEADER),
        URL_SAFE_NO_PAD.encode(payload.as_bytes())
    );
    let signature = key.sign(signing_input.as_bytes());
    format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature.to_bytes()))
}

/// Verify `signed` against `key` and return the payload it carries
pub fn parse(signed: &str, key: &VerifyingKey) -> Result<String> {
    let signed = signed.trim();
    let mut parts = signed.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::Malformed);
    };
    if signature.contains('.') {
        return Err(AuthError::Malformed);
    }

    let signing_input = &signed[..header.len() + 1 + payload.len()];
    let header: Header = serde_json::from_slice(&decode(header)?)
        .map_err(|e| AuthError::Encoding(format!("header: {}", e)))?;
    if header.alg != ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm(header.alg));
    }

    let signature_bytes: [u8; 64] = decode(signature)?
        .try_into()
        .map_err(|_| AuthError::InvalidSignature)?;
    let signature = Signature::from_bytes(&signature_bytes);

    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_| AuthError::InvalidSignature)?;

    String::from_utf8(decode(payload)?).map_err(|e| AuthError::Encoding(format!("payload: {}", e)))
}

/// Decode a base64-encoded 32-byte Ed25519 verifying key
pub fn verifying_key_from_base64(encoded: &str) -> Result<VerifyingKey> {
    let bytes: [u8; 32] = decode_any(encoded.trim())?
        .try_into()
        .map_err(|_| AuthError::InvalidKey("expected 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| AuthError::InvalidKey(e.to_string()))
}

fn decode(part: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| AuthError::Encoding(e.to_string()))
}

/// Keys are accepted in either standard or URL-safe base64
fn decode_any(encoded: &str) -> Result<Vec<u8>> {
    use base64::engine::general_purpose::STANDARD;

    STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')))
        .map_err(|e| AuthError::InvalidKey(e.to_string()))
}
