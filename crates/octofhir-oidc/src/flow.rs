//! OpenID Connect flow selection.
//!
//! The `response_type` of the original authorization request decides which
//! validation rules apply to the response. See
//! [OpenID Connect Core 1.0 §3](https://openid.net/specs/openid-connect-core-1_0.html#Authentication).

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

/// The authentication flow a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// `response_type=code`. Not validated by this crate.
    AuthorizationCode,
    /// `response_type=id_token token` or `response_type=id_token`.
    Implicit,
    /// `response_type` containing `code` and `id_token` or `token`. Not validated by this crate.
    Hybrid,
}

impl Flow {
    /// Selects the flow for a `response_type`.
    ///
    /// Rules are applied in order: exact `code`, exact `id_token token` or
    /// `id_token`, then any value containing `code` together with `id_token`
    /// or `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidResponseType`] when no rule matches.
    pub fn select(response_type: &str) -> Result<Self, ValidationError> {
        match response_type {
            "code" => Ok(Self::AuthorizationCode),
            "id_token token" | "id_token" => Ok(Self::Implicit),
            rt if rt.contains("code") && (rt.contains("id_token") || rt.contains("token")) => {
                Ok(Self::Hybrid)
            }
            other => Err(ValidationError::invalid_response_type(other)),
        }
    }

    /// Returns the snake_case name of the flow.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
            Self::Hybrid => "hybrid",
        }
    }

    /// Returns `true` if responses of this flow can be validated.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Implicit)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
