//! Authorization request descriptor and Implicit flow request construction.
//!
//! An [`AuthRequest`] records what was asked of the provider. It is kept
//! between the redirect and the callback, then handed to the
//! [`ResponseValidator`](crate::validator::ResponseValidator) together with
//! the response.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::discovery::ProviderMetadata;

/// Response type requested by default: ID token plus access token.
pub const DEFAULT_RESPONSE_TYPE: &str = "id_token token";

/// Scope requested by default.
pub const DEFAULT_SCOPE: &str = "openid";

/// Errors that can occur while building an authorization request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The provider's authorization endpoint is not a valid URL.
    #[error("Invalid authorization endpoint: {0}")]
    InvalidEndpoint(String),

    /// The response type is empty.
    #[error("response_type cannot be empty")]
    EmptyResponseType,
}

/// The original authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Requested response type, e.g. `id_token token`.
    pub response_type: String,

    /// Client identifier registered with the provider.
    pub client_id: String,

    /// Opaque value echoed back by the provider.
    pub state: String,

    /// Value the provider must copy into the ID token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Issuer identifier from discovery.
    pub issuer: String,

    /// Where the provider redirects the user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Requested scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// The provider's JWKS endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,

    /// The full authorization URL the user agent was sent to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl AuthRequest {
    /// Creates a request descriptor from its required parts.
    #[must_use]
    pub fn new(
        response_type: impl Into<String>,
        client_id: impl Into<String>,
        state: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            response_type: response_type.into(),
            client_id: client_id.into(),
            state: state.into(),
            nonce: None,
            issuer: issuer.into(),
            redirect_uri: None,
            scope: None,
            jwks_uri: None,
            url: None,
        }
    }

    /// Sets the nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// Builds Implicit flow authorization requests.
///
/// # Example
///
/// ```ignore
/// let request = ImplicitRequestBuilder::new(&metadata, "ssp", "https://app.example.com/callback")
///     .scope("openid profile")
///     .build()?;
/// // Redirect the user agent to request.url, keep request for the callback.
/// ```
#[derive(Debug, Clone)]
pub struct ImplicitRequestBuilder<'a> {
    provider: &'a ProviderMetadata,
    client_id: String,
    redirect_uri: String,
    response_type: String,
    scope: String,
    state: Option<String>,
    nonce: Option<String>,
}

impl<'a> ImplicitRequestBuilder<'a> {
    /// Starts a request to `provider` for `client_id`.
    #[must_use]
    pub fn new(
        provider: &'a ProviderMetadata,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            response_type: DEFAULT_RESPONSE_TYPE.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            state: None,
            nonce: None,
        }
    }

    /// Sets the response type.
    #[must_use]
    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = response_type.into();
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Uses a fixed state instead of a random one.
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Uses a fixed nonce instead of a random one.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Builds the request and its authorization URL.
    ///
    /// # Errors
    ///
    /// - `RequestError::EmptyResponseType` if the response type is blank
    /// - `RequestError::InvalidEndpoint` if the authorization endpoint does not parse
    pub fn build(self) -> Result<AuthRequest, RequestError> {
        if self.response_type.trim().is_empty() {
            return Err(RequestError::EmptyResponseType);
        }

        let mut url = Url::parse(&self.provider.authorization_endpoint)
            .map_err(|e| RequestError::InvalidEndpoint(format!("{e}")))?;

        let state = self.state.unwrap_or_else(generate_value);
        let nonce = self.nonce.unwrap_or_else(generate_value);

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", &self.response_type)
            .append_pair("scope", &self.scope)
            .append_pair("state", &state)
            .append_pair("nonce", &nonce);

        tracing::debug!(
            client_id = %self.client_id,
            response_type = %self.response_type,
            "Built authorization request for {}",
            self.provider.issuer
        );

        Ok(AuthRequest {
            response_type: self.response_type,
            client_id: self.client_id,
            state,
            nonce: Some(nonce),
            issuer: self.provider.issuer.clone(),
            redirect_uri: Some(self.redirect_uri),
            scope: Some(self.scope),
            jwks_uri: Some(self.provider.jwks_uri.clone()),
            url: Some(url.into()),
        })
    }
}

/// 256 random bits, base64url encoded (43 characters).
fn generate_value() -> String {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ProviderMetadata {
        ProviderMetadata::new(
            "https://issuer.example",
            "https://issuer.example/connect/authorize",
            "https://issuer.example/.well-known/jwks",
        )
    }

    #[test]
    fn test_build_defaults() {
        let provider = provider();
        let request = ImplicitRequestBuilder::new(&provider, "C1", "https://app.example/cb")
            .build()
            .unwrap();

        assert_eq!(request.response_type, "id_token token");
        assert_eq!(request.client_id, "C1");
        assert_eq!(request.issuer, "https://issuer.example");
        assert_eq!(request.scope.as_deref(), Some("openid"));
        assert_eq!(request.state.len(), 43);
        assert_eq!(request.nonce.as_ref().map(String::len), Some(43));
        assert_eq!(
            request.jwks_uri.as_deref(),
            Some("https://issuer.example/.well-known/jwks")
        );
    }

    #[test]
    fn test_url_query_parameters() {
        let provider = provider();
        let request = ImplicitRequestBuilder::new(&provider, "C1", "https://app.example/cb")
            .scope("openid profile")
            .state("S1")
            .nonce("N1")
            .build()
            .unwrap();

        let url = Url::parse(request.url.as_deref().unwrap()).unwrap();
        assert_eq!(url.path(), "/connect/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let expected = [
            ("client_id", "C1"),
            ("redirect_uri", "https://app.example/cb"),
            ("response_type", "id_token token"),
            ("scope", "openid profile"),
            ("state", "S1"),
            ("nonce", "N1"),
        ];
        assert_eq!(pairs.len(), expected.len());
        for ((k, v), (ek, ev)) in pairs.iter().zip(expected) {
            assert_eq!((k.as_str(), v.as_str()), (ek, ev));
        }
    }

    #[test]
    fn test_random_values_differ() {
        let provider = provider();
        let a = ImplicitRequestBuilder::new(&provider, "C1", "https://app.example/cb")
            .build()
            .unwrap();
        let b = ImplicitRequestBuilder::new(&provider, "C1", "https://app.example/cb")
            .build()
            .unwrap();

        assert_ne!(a.state, b.state);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_build_errors() {
        let provider = provider();
        let err = ImplicitRequestBuilder::new(&provider, "C1", "https://app.example/cb")
            .response_type("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, RequestError::EmptyResponseType));

        let broken = ProviderMetadata::new("https://issuer.example", "not a url", "x");
        let err = ImplicitRequestBuilder::new(&broken, "C1", "https://app.example/cb")
            .build()
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_request_serde_shape() {
        let request = AuthRequest::new("id_token token", "C1", "S1", "https://issuer.example")
            .with_nonce("N1");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["nonce"], "N1");
        assert!(json.get("url").is_none());

        let parsed: AuthRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, request);
    }
}
