//! Authentication response validation errors.
//!
//! Every failure of the response validator is a value of [`ValidationError`].
//! The set is closed: callers can dispatch on [`ValidationError::kind`] and
//! read the offending parameter, property or claim name from
//! [`ValidationError::subject`] without parsing the display message.

use serde::Serialize;

/// Errors that can occur while validating an OIDC authentication response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required constructor parameter (request or response) is absent or empty.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// The request's `response_type` matches none of the known flows.
    #[error("Invalid response_type: '{0}'")]
    InvalidResponseType(String),

    /// A required property is absent from the parsed response.
    #[error("Missing property: {0}")]
    MissingProperty(String),

    /// A response property does not match the original request.
    #[error("Invalid property: {0}")]
    InvalidProperty(String),

    /// The compact token header could not be decoded.
    #[error("Token header is invalid: {0}")]
    TokenHeaderInvalid(String),

    /// The compact token payload could not be decoded.
    #[error("Token payload is invalid: {0}")]
    TokenPayloadInvalid(String),

    /// The token signature did not verify against the certificate.
    #[error("Token signature validation failed: {0}")]
    TokenSignatureValidationFailed(String),

    /// A required claim is absent from the token payload.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// A claim value failed its check.
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    /// The token `exp` claim is not in the future.
    #[error("Token expired at {exp} (now {now})")]
    TokenExpired {
        /// The `exp` claim of the token.
        exp: i64,
        /// The time the check was made at, in UTC seconds.
        now: i64,
    },

    /// No hash function is known for the token's signing algorithm.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The selected flow has no validation pipeline.
    #[error("Validation of the {0} flow is not implemented")]
    NotImplemented(String),
}

/// Programmatic classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingParameter,
    InvalidResponseType,
    MissingProperty,
    InvalidProperty,
    TokenHeaderInvalid,
    TokenPayloadInvalid,
    TokenSignatureValidationFailed,
    MissingClaim,
    InvalidClaim,
    TokenExpired,
    UnsupportedAlgorithm,
    NotImplemented,
}

impl ErrorKind {
    /// Returns the snake_case name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingParameter => "missing_parameter",
            Self::InvalidResponseType => "invalid_response_type",
            Self::MissingProperty => "missing_property",
            Self::InvalidProperty => "invalid_property",
            Self::TokenHeaderInvalid => "token_header_invalid",
            Self::TokenPayloadInvalid => "token_payload_invalid",
            Self::TokenSignatureValidationFailed => "token_signature_validation_failed",
            Self::MissingClaim => "missing_claim",
            Self::InvalidClaim => "invalid_claim",
            Self::TokenExpired => "token_expired",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::NotImplemented => "not_implemented",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValidationError {
    /// Creates a `MissingParameter` error.
    #[must_use]
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter(name.into())
    }

    /// Creates an `InvalidResponseType` error.
    #[must_use]
    pub fn invalid_response_type(response_type: impl Into<String>) -> Self {
        Self::InvalidResponseType(response_type.into())
    }

    /// Creates a `MissingProperty` error.
    #[must_use]
    pub fn missing_property(name: impl Into<String>) -> Self {
        Self::MissingProperty(name.into())
    }

    /// Creates an `InvalidProperty` error.
    #[must_use]
    pub fn invalid_property(name: impl Into<String>) -> Self {
        Self::InvalidProperty(name.into())
    }

    /// Creates a `TokenHeaderInvalid` error.
    #[must_use]
    pub fn header_invalid(reason: impl Into<String>) -> Self {
        Self::TokenHeaderInvalid(reason.into())
    }

    /// Creates a `TokenPayloadInvalid` error.
    #[must_use]
    pub fn payload_invalid(reason: impl Into<String>) -> Self {
        Self::TokenPayloadInvalid(reason.into())
    }

    /// Creates a `TokenSignatureValidationFailed` error.
    #[must_use]
    pub fn signature_failed(reason: impl Into<String>) -> Self {
        Self::TokenSignatureValidationFailed(reason.into())
    }

    /// Creates a `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(name: impl Into<String>) -> Self {
        Self::MissingClaim(name.into())
    }

    /// Creates an `InvalidClaim` error.
    #[must_use]
    pub fn invalid_claim(name: impl Into<String>) -> Self {
        Self::InvalidClaim(name.into())
    }

    /// Creates an `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(alg.into())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter(_) => ErrorKind::MissingParameter,
            Self::InvalidResponseType(_) => ErrorKind::InvalidResponseType,
            Self::MissingProperty(_) => ErrorKind::MissingProperty,
            Self::InvalidProperty(_) => ErrorKind::InvalidProperty,
            Self::TokenHeaderInvalid(_) => ErrorKind::TokenHeaderInvalid,
            Self::TokenPayloadInvalid(_) => ErrorKind::TokenPayloadInvalid,
            Self::TokenSignatureValidationFailed(_) => ErrorKind::TokenSignatureValidationFailed,
            Self::MissingClaim(_) => ErrorKind::MissingClaim,
            Self::InvalidClaim(_) => ErrorKind::InvalidClaim,
            Self::TokenExpired { .. } => ErrorKind::TokenExpired,
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Returns the name of the offending parameter, property, claim,
    /// response type, algorithm or flow, if the error carries one.
    ///
    /// Reasons attached to token decoding and signature errors are
    /// diagnostic text, not names, and are not returned here.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::MissingParameter(name)
            | Self::InvalidResponseType(name)
            | Self::MissingProperty(name)
            | Self::InvalidProperty(name)
            | Self::MissingClaim(name)
            | Self::InvalidClaim(name)
            | Self::UnsupportedAlgorithm(name)
            | Self::NotImplemented(name) => Some(name),
            Self::TokenExpired { .. } => Some("exp"),
            Self::TokenHeaderInvalid(_)
            | Self::TokenPayloadInvalid(_)
            | Self::TokenSignatureValidationFailed(_) => None,
        }
    }

    /// Returns `true` if the error was raised while building the validator.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidResponseType(_)
        )
    }

    /// Returns `true` if the id_token itself could not be decoded or verified.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::TokenHeaderInvalid(_)
                | Self::TokenPayloadInvalid(_)
                | Self::TokenSignatureValidationFailed(_)
                | Self::UnsupportedAlgorithm(_)
        )
    }

    /// Returns `true` if a verified token carried unacceptable claims.
    #[must_use]
    pub fn is_claim_error(&self) -> bool {
        matches!(
            self,
            Self::MissingClaim(_) | Self::InvalidClaim(_) | Self::TokenExpired { .. }
        )
    }
}
