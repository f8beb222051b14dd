//! Claim access over a decoded token payload.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// The claims of a decoded token payload.
///
/// Lookups never perform I/O or cryptography. A claim whose value is JSON
/// `null` is considered present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Wraps a JSON object.
    #[must_use]
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Returns `true` if the claim is present.
    #[must_use]
    pub fn has_claim(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns a claim value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingClaim`] if the claim is absent.
    pub fn get_claim(&self, name: &str) -> Result<&Value, ValidationError> {
        self.0
            .get(name)
            .ok_or_else(|| ValidationError::missing_claim(name))
    }

    /// Returns `true` if the claim equals `expected`, or, when the claim is
    /// an array, if `expected` is one of its elements.
    ///
    /// Only string values can match.
    #[must_use]
    pub fn verify_claim(&self, name: &str, expected: &str) -> bool {
        match self.0.get(name) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(expected)),
            _ => false,
        }
    }

    /// Returns `true` if the claim is present and is an array.
    #[must_use]
    pub fn is_array(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(Value::Array(_)))
    }

    /// Returns a claim as a string, if it is one.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns a numeric claim as whole seconds.
    ///
    /// Fractional NumericDate values are truncated.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        let value = self.0.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    }

    /// Iterates over all claims.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the payload has no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserializes the claims into a typed structure.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TokenPayloadInvalid`] if the claims do not
    /// fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ValidationError::payload_invalid(e.to_string()))
    }

    /// Consumes the claims, returning the JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// Standard OIDC ID token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer identifier.
    pub iss: String,

    /// Subject identifier.
    pub sub: String,

    /// Audience (string or array in the token).
    #[serde(deserialize_with = "deserialize_audience")]
    pub aud: Vec<String>,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Nonce value.
    pub nonce: Option<String>,

    /// Time of authentication.
    pub auth_time: Option<i64>,

    /// Access token hash.
    pub at_hash: Option<String>,

    /// Authentication context class reference.
    pub acr: Option<String>,

    /// Authorized party.
    pub azp: Option<String>,

    /// User's full name.
    pub name: Option<String>,

    /// User's email address.
    pub email: Option<String>,

    /// User's preferred username.
    pub preferred_username: Option<String>,

    /// Claims not listed above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn deserialize_audience<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => Ok(vec![s]),
        OneOrMany::Many(v) => Ok(v),
    }
}
