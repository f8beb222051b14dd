//! Compact JWS parsing.
//!
//! Splits a `header.payload.signature` token and decodes the first two
//! segments. Nothing here checks the signature: a [`CompactToken`] must go
//! through [`SignatureVerifier`](super::SignatureVerifier) before its claims
//! are trusted.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::claims::Claims;
use crate::error::ValidationError;

/// JOSE header of a compact token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm (e.g. `RS256`).
    pub alg: String,

    /// Media type, usually `JWT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Key ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// X.509 certificate SHA-1 thumbprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,

    /// Other header parameters.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// A structurally decoded, not yet verified, compact token.
#[derive(Debug, Clone)]
pub struct CompactToken {
    header: TokenHeader,
    claims: Claims,
    signing_input: String,
    signature: String,
}

impl CompactToken {
    /// Parses a compact token.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::TokenPayloadInvalid`] if the token does not have
    ///   exactly three non-empty segments, or the payload is not a base64url
    ///   encoded JSON object
    /// - [`ValidationError::TokenHeaderInvalid`] if the header is not a
    ///   base64url encoded JSON object with a string `alg`
    pub fn parse(token: &str) -> Result<Self, ValidationError> {
        let mut parts = token.split('.');
        let (Some(head), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ValidationError::payload_invalid(
                "token is not of the form header.payload.signature",
            ));
        };

        if head.is_empty() {
            return Err(ValidationError::header_invalid("empty header segment"));
        }
        if payload.is_empty() || signature.is_empty() {
            return Err(ValidationError::payload_invalid(
                "token is not of the form header.payload.signature",
            ));
        }

        let header_bytes = decode_segment(head)
            .map_err(|e| ValidationError::header_invalid(format!("invalid base64url: {e}")))?;
        let header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| ValidationError::header_invalid(format!("invalid JSON: {e}")))?;

        let payload_bytes = decode_segment(payload)
            .map_err(|e| ValidationError::payload_invalid(format!("invalid base64url: {e}")))?;
        let claims = match serde_json::from_slice::<Value>(&payload_bytes) {
            Ok(Value::Object(map)) => Claims::new(map),
            Ok(_) => return Err(ValidationError::payload_invalid("payload is not a JSON object")),
            Err(e) => return Err(ValidationError::payload_invalid(format!("invalid JSON: {e}"))),
        };

        Ok(Self {
            header,
            claims,
            signing_input: format!("{head}.{payload}"),
            signature: signature.to_string(),
        })
    }

    /// The decoded header.
    #[must_use]
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// The decoded payload. Untrusted until the signature is verified.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The `header.payload` bytes covered by the signature.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// The base64url encoded signature segment.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Consumes the token, returning its claims.
    #[must_use]
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

// JWS segments are unpadded base64url; `=` is rejected here, not at the signature gate.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(segment)
}
