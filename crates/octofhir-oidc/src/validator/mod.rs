//! Authentication response validation.
//!
//! [`ResponseValidator`] binds one request to one response. The flow is
//! selected from the request's `response_type` when the validator is built
//! and cannot change afterwards. [`ResponseValidator::validate`] consumes
//! the validator, so every validator reaches exactly one terminal outcome.
//!
//! # Example
//!
//! ```ignore
//! let validator = ResponseValidator::new(Some(request), Some(location_hash))?;
//! let validated = validator.validate(&certificate)?;
//! assert!(validated.signature_verified);
//! ```

pub mod implicit;

use std::fmt;

use time::OffsetDateTime;

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::flow::Flow;
use crate::request::AuthRequest;
use crate::response::AuthResponse;
use crate::token::Certificate;

pub use implicit::{ImplicitFlowValidator, REQUIRED_PROPERTIES, ValidatedResponse};

/// Lifecycle of a validator, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Parsed,
    FlowSelected,
    Validating,
    Validated,
    Rejected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parsed => "parsed",
            Self::FlowSelected => "flow_selected",
            Self::Validating => "validating",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        })
    }
}

/// Validates one authentication response against its request.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    request: AuthRequest,
    response: AuthResponse,
    flow: Flow,
    config: ValidatorConfig,
}

impl ResponseValidator {
    /// Parses the response and selects the flow.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingParameter`] if the request or response is
    ///   absent, or the response contains no parameters
    /// - [`ValidationError::InvalidResponseType`] if the request's
    ///   `response_type` selects no flow
    pub fn new(request: Option<AuthRequest>, response: Option<&str>) -> Result<Self, ValidationError> {
        let request = request.ok_or_else(|| ValidationError::missing_parameter("request"))?;
        let response = response
            .map(AuthResponse::parse)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ValidationError::missing_parameter("response"))?;
        tracing::debug!(stage = %Stage::Parsed, parameters = response.len(), "Parsed authentication response");

        let flow = Flow::select(&request.response_type)?;
        tracing::debug!(stage = %Stage::FlowSelected, flow = %flow, "Selected authentication flow");

        Ok(Self {
            request,
            response,
            flow,
            config: ValidatorConfig::default(),
        })
    }

    /// Replaces the validation settings.
    #[must_use]
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The selected flow.
    #[must_use]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    /// The original request.
    #[must_use]
    pub fn request(&self) -> &AuthRequest {
        &self.request
    }

    /// The parsed response.
    #[must_use]
    pub fn response(&self) -> &AuthResponse {
        &self.response
    }

    /// Validates the response against the issuer certificate at the current time.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, or [`ValidationError::NotImplemented`]
    /// for the Authorization Code and Hybrid flows.
    pub fn validate(self, certificate: &Certificate) -> Result<ValidatedResponse, ValidationError> {
        self.validate_at(certificate, OffsetDateTime::now_utc())
    }

    /// Validates the response as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_at(
        self,
        certificate: &Certificate,
        now: OffsetDateTime,
    ) -> Result<ValidatedResponse, ValidationError> {
        tracing::debug!(stage = %Stage::Validating, flow = %self.flow, "Validating authentication response");

        let result = match self.flow {
            Flow::Implicit => ImplicitFlowValidator::new(&self.request, &self.response, &self.config)
                .validate(certificate, now.unix_timestamp()),
            Flow::AuthorizationCode | Flow::Hybrid => {
                Err(ValidationError::NotImplemented(self.flow.to_string()))
            }
        };

        match &result {
            Ok(_) => {
                tracing::debug!(stage = %Stage::Validated, flow = %self.flow, "Authentication response validated");
            }
            Err(e) => {
                tracing::warn!(
                    stage = %Stage::Rejected,
                    flow = %self.flow,
                    kind = %e.kind(),
                    subject = e.subject().unwrap_or("-"),
                    "Authentication response rejected"
                );
            }
        }

        result
    }
}
