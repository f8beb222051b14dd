//! OpenID Provider discovery.
//!
//! Fetches the provider metadata published at
//! `{issuer}/.well-known/openid-configuration`. The response validator only
//! needs the `issuer` from it; the authorization endpoint and `jwks_uri` feed
//! [`ImplicitRequestBuilder`](crate::request::ImplicitRequestBuilder) and the
//! [JWKS resolver](crate::jwks).
//!
//! # Security Considerations
//!
//! - Only HTTPS issuer URLs are allowed unless `allow_http` is configured
//! - The `issuer` of the document must match the URL it was fetched from
//! - Response size is limited
//!
//! # References
//!
//! - [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::HttpConfig;

/// OpenID Provider metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// URL that the OP asserts as its Issuer Identifier.
    pub issuer: String,

    /// URL of the OP's Authorization Endpoint.
    pub authorization_endpoint: String,

    /// URL of the OP's JSON Web Key Set document.
    pub jwks_uri: String,

    /// URL of the OP's Token Endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// URL of the OP's UserInfo Endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// URL at the OP to which an RP can redirect to log the End-User out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,

    /// OAuth 2.0 response_type values the OP supports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_types_supported: Vec<String>,

    /// OAuth 2.0 scope values the OP supports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes_supported: Vec<String>,

    /// JWS algorithms the OP may sign ID tokens with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_token_signing_alg_values_supported: Vec<String>,

    /// Claim names the OP may supply values for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims_supported: Vec<String>,
}

impl ProviderMetadata {
    /// Creates metadata with only the required endpoints set.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        jwks_uri: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            authorization_endpoint: authorization_endpoint.into(),
            jwks_uri: jwks_uri.into(),
            token_endpoint: None,
            userinfo_endpoint: None,
            end_session_endpoint: None,
            response_types_supported: Vec::new(),
            scopes_supported: Vec::new(),
            id_token_signing_alg_values_supported: Vec::new(),
            claims_supported: Vec::new(),
        }
    }

    /// Returns `true` if the OP advertises `response_type`.
    ///
    /// Values are compared as space separated sets, so `token id_token`
    /// matches an advertised `id_token token`. A provider that advertises
    /// nothing is assumed to support everything.
    #[must_use]
    pub fn supports_response_type(&self, response_type: &str) -> bool {
        if self.response_types_supported.is_empty() {
            return true;
        }

        let wanted = sorted_words(response_type);
        self.response_types_supported
            .iter()
            .any(|supported| sorted_words(supported) == wanted)
    }
}

fn sorted_words(value: &str) -> Vec<&str> {
    let mut words: Vec<&str> = value.split_whitespace().collect();
    words.sort_unstable();
    words
}

/// Errors that can occur during discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// A network error occurred while fetching the discovery document.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The HTTP request returned a non-success status code.
    #[error("HTTP error: status {0}")]
    HttpError(u16),

    /// The discovery document could not be parsed as JSON.
    #[error("Failed to parse discovery document: {0}")]
    ParseError(String),

    /// The issuer in the discovery document does not match the expected issuer.
    #[error("Issuer mismatch: expected {expected}, got {actual}")]
    IssuerMismatch {
        /// The URL the document was fetched for.
        expected: String,
        /// The issuer stated by the document.
        actual: String,
    },

    /// The issuer URL scheme is not allowed.
    #[error("Invalid URL scheme: {0} (only HTTPS is allowed)")]
    InvalidScheme(String),

    /// The response exceeded the maximum allowed size.
    #[error("Response exceeds maximum size of {max_size} bytes")]
    ResponseTooLarge {
        /// The maximum allowed size.
        max_size: usize,
    },
}

/// Source of provider metadata.
#[async_trait]
pub trait DiscoveryResolver: Send + Sync {
    /// Resolves the metadata of the provider at `issuer`.
    async fn resolve(&self, issuer: &Url) -> Result<ProviderMetadata, DiscoveryError>;
}

/// Fetches provider metadata over HTTP.
pub struct HttpDiscoveryResolver {
    http_client: reqwest::Client,
    config: HttpConfig,
}

impl HttpDiscoveryResolver {
    /// Creates a resolver with the given HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::NetworkError` if the HTTP client cannot be built.
    pub fn new(config: HttpConfig) -> Result<Self, DiscoveryError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Builds the discovery URL for an issuer.
    #[must_use]
    pub fn discovery_url(issuer: &Url) -> Url {
        let mut discovery_url = issuer.clone();
        let path = issuer.path().trim_end_matches('/');
        discovery_url.set_path(&format!("{path}/.well-known/openid-configuration"));
        discovery_url
    }

    fn validate_scheme(&self, issuer: &Url) -> Result<(), DiscoveryError> {
        match issuer.scheme() {
            "https" => Ok(()),
            "http" if self.config.allow_http => Ok(()),
            scheme => Err(DiscoveryError::InvalidScheme(scheme.to_string())),
        }
    }
}

#[async_trait]
impl DiscoveryResolver for HttpDiscoveryResolver {
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer URL is not HTTPS (unless `allow_http` is true)
    /// - The document cannot be fetched, is too large or is not valid metadata
    /// - The issuer in the document does not match `issuer`
    async fn resolve(&self, issuer: &Url) -> Result<ProviderMetadata, DiscoveryError> {
        self.validate_scheme(issuer)?;

        let discovery_url = Self::discovery_url(issuer);
        tracing::debug!("Fetching OIDC discovery document from {}", discovery_url);

        let response = self
            .http_client
            .get(discovery_url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch OIDC discovery from {}: {}", issuer, e);
                DiscoveryError::NetworkError(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(DiscoveryError::HttpError(response.status().as_u16()));
        }

        let max_size = self.config.max_response_size;
        if let Some(len) = response.content_length()
            && len as usize > max_size
        {
            return Err(DiscoveryError::ResponseTooLarge { max_size });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DiscoveryError::NetworkError(e.to_string()))?;
        if body.len() > max_size {
            return Err(DiscoveryError::ResponseTooLarge { max_size });
        }

        let metadata: ProviderMetadata = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!("Failed to parse OIDC discovery document from {}: {}", issuer, e);
            DiscoveryError::ParseError(e.to_string())
        })?;

        let expected = issuer.as_str().trim_end_matches('/');
        let actual = metadata.issuer.trim_end_matches('/');
        if expected != actual {
            return Err(DiscoveryError::IssuerMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }

        tracing::debug!("Discovered OIDC configuration for {}", metadata.issuer);
        Ok(metadata)
    }
}
