//! Base64 transfer encoding for file payloads
//!
//! Files travel as a single base64 string inside a JSON envelope. There is no
//! checksum and no length field: whatever decodes is taken as the file.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::core::error::Result;

/// Encode raw file bytes for the upload envelope
pub fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a payload received from the endpoint.
///
/// ASCII whitespace (line breaks inserted by some encoders) is skipped.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        return Ok(BASE64.decode(compact)?);
    }

    Ok(BASE64.decode(payload)?)
}
