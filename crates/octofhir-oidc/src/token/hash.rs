//! Access token hash (`at_hash`).
//!
//! The hash binds an access token to the ID token issued with it: the
//! left-most half of the digest of the ASCII access token, base64url encoded
//! without padding. The digest follows the ID token's `alg`.
//! See [OpenID Connect Core 1.0 §3.2.2.9](https://openid.net/specs/openid-connect-core-1_0.html#ImplicitTokenValidation).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256, Sha512};

use crate::error::ValidationError;

/// Digest used for the access token hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTokenHash {
    /// SHA-256, for `RS256` and `PS256`.
    Sha256,
    /// SHA-512, for `RS512` and `PS512`.
    Sha512,
}

impl AccessTokenHash {
    /// Picks the digest for an ID token `alg`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedAlgorithm`] for any other `alg`.
    pub fn for_algorithm(alg: &str) -> Result<Self, ValidationError> {
        match alg {
            "RS256" | "PS256" => Ok(Self::Sha256),
            "RS512" | "PS512" => Ok(Self::Sha512),
            other => Err(ValidationError::unsupported_algorithm(other)),
        }
    }

    /// Computes the `at_hash` value of an access token.
    #[must_use]
    pub fn compute(&self, access_token: &str) -> String {
        let digest = match self {
            Self::Sha256 => Sha256::digest(access_token.as_bytes()).to_vec(),
            Self::Sha512 => Sha512::digest(access_token.as_bytes()).to_vec(),
        };
        URL_SAFE_NO_PAD.encode(&digest[..digest.len() / 2])
    }

    /// Returns `true` if `expected` is the `at_hash` of `access_token`.
    #[must_use]
    pub fn matches(&self, access_token: &str, expected: &str) -> bool {
        self.compute(access_token) == expected
    }
}
