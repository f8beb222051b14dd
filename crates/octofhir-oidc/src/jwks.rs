//! Issuer certificate retrieval from a JWKS endpoint.
//!
//! The response validator checks ID token signatures against an X.509
//! certificate. Providers publish theirs in the `x5c` member of each JWK;
//! this module fetches the key set and hands out those certificates.
//!
//! - [`CertificateResolver`] - Source of issuer certificates
//! - [`HttpJwksResolver`] - Fetches certificates from a `jwks_uri`
//! - [`JwksError`] - Error types for JWKS operations

use async_trait::async_trait;
use jsonwebtoken::jwk::{JwkSet, PublicKeyUse};
use url::Url;

use crate::config::HttpConfig;
use crate::token::Certificate;

/// Errors that can occur during JWKS operations.
#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    /// A network error occurred while fetching the JWKS.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The HTTP request returned a non-success status code.
    #[error("HTTP error: status {0}")]
    HttpError(u16),

    /// The JWKS response could not be parsed as JSON.
    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    /// No signing key in the JWKS carries an `x5c` certificate.
    #[error("No certificates found in JWKS")]
    NoCertificates,

    /// The JWKS URI scheme is not allowed (must be HTTPS in production).
    #[error("Invalid URL scheme: only HTTPS is allowed")]
    InvalidScheme,

    /// The response exceeded the maximum allowed size.
    #[error("Response exceeds maximum size of {max_size} bytes")]
    ResponseTooLarge {
        /// The maximum allowed size.
        max_size: usize,
    },
}

/// Returns the leaf certificate of every signing key, in key set order.
///
/// Keys marked `"use": "enc"` and keys without `x5c` are skipped.
#[must_use]
pub fn certificates(jwks: &JwkSet) -> Vec<Certificate> {
    jwks.keys
        .iter()
        .filter(|k| !matches!(&k.common.public_key_use, Some(PublicKeyUse::Encryption)))
        .filter_map(|k| k.common.x509_chain.as_ref()?.first())
        .map(|der| Certificate::from_x5c(der))
        .collect()
}

/// Returns the certificate of the first signing key.
///
/// # Errors
///
/// Returns `JwksError::NoCertificates` if no signing key carries one.
pub fn first_certificate(jwks: &JwkSet) -> Result<Certificate, JwksError> {
    certificates(jwks)
        .into_iter()
        .next()
        .ok_or(JwksError::NoCertificates)
}

/// Source of issuer certificates.
#[async_trait]
pub trait CertificateResolver: Send + Sync {
    /// Resolves all certificates published at `jwks_uri`.
    async fn resolve(&self, jwks_uri: &Url) -> Result<Vec<Certificate>, JwksError>;

    /// Resolves the certificate used to verify ID tokens.
    async fn first_certificate(&self, jwks_uri: &Url) -> Result<Certificate, JwksError> {
        self.resolve(jwks_uri)
            .await?
            .into_iter()
            .next()
            .ok_or(JwksError::NoCertificates)
    }
}

/// Fetches certificates from a JWKS endpoint over HTTP.
pub struct HttpJwksResolver {
    http_client: reqwest::Client,
    config: HttpConfig,
}

impl HttpJwksResolver {
    /// Creates a resolver with the given HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns `JwksError::NetworkError` if the HTTP client cannot be built.
    pub fn new(config: HttpConfig) -> Result<Self, JwksError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| JwksError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Fetches and parses the key set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URI scheme is not HTTPS (unless `allow_http` is configured)
    /// - The HTTP request fails or the response is too large
    /// - The response cannot be parsed as JWKS
    pub async fn fetch(&self, jwks_uri: &Url) -> Result<JwkSet, JwksError> {
        match jwks_uri.scheme() {
            "https" => {}
            "http" if self.config.allow_http => {}
            _ => return Err(JwksError::InvalidScheme),
        }

        tracing::debug!("Fetching JWKS from {}", jwks_uri);

        let response = self
            .http_client
            .get(jwks_uri.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch JWKS from {}: {}", jwks_uri, e);
                JwksError::NetworkError(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(JwksError::HttpError(response.status().as_u16()));
        }

        let max_size = self.config.max_response_size;
        if let Some(len) = response.content_length()
            && len as usize > max_size
        {
            return Err(JwksError::ResponseTooLarge { max_size });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| JwksError::NetworkError(e.to_string()))?;
        if body.len() > max_size {
            return Err(JwksError::ResponseTooLarge { max_size });
        }

        let jwks: JwkSet = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!("Failed to parse JWKS from {}: {}", jwks_uri, e);
            JwksError::ParseError(e.to_string())
        })?;

        tracing::debug!("Fetched JWKS from {} with {} keys", jwks_uri, jwks.keys.len());
        Ok(jwks)
    }
}

#[async_trait]
impl CertificateResolver for HttpJwksResolver {
    async fn resolve(&self, jwks_uri: &Url) -> Result<Vec<Certificate>, JwksError> {
        let certs = certificates(&self.fetch(jwks_uri).await?);
        if certs.is_empty() {
            return Err(JwksError::NoCertificates);
        }
        Ok(certs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RSA_CERT: &str = include_str!("../tests/fixtures/rsa_cert.pem");
    const OTHER_CERT: &str = include_str!("../tests/fixtures/other_cert.pem");
    const RSA_MODULUS: &str = "urAjZ4QHFOHrp85nialTpV6U0NmsZe225JDtWyQsaSYCinc4m1sKPpATyThD_YzZNHSsK0EK9xhbpX5ced15nfDJVWXAxbcVkd4VByqtHhvJLI_ZwmIFHVNBD3sC7VMibRggrO3yieCc_Z2IlKakOoJGUd2Wy-FK48lbWtU3PYtpCeAUnBL2vPUuIUAht5NXunEksZmVvy2IdDkwqfKx4pEDM5kvJuaMmzah9eJw-WZdv65DCEsetY61spMxjbBgDDdHtA0nAncBM1StJjK62hEYWRPsu_Gfr3i5rW6II760Rdp8WUI2nbsnsoBNXhItAD0s8TlMBrSL6MdR46cf_w";

    fn x5c(pem: &str) -> String {
        pem.lines().filter(|l| !l.starts_with("-----")).collect()
    }

    fn jwk(kid: &str, usage: &str, cert: Option<&str>) -> serde_json::Value {
        let mut key = serde_json::json!({
            "kty": "RSA",
            "use": usage,
            "kid": kid,
            "n": RSA_MODULUS,
            "e": "AQAB"
        });
        if let Some(cert) = cert {
            key["x5c"] = serde_json::json!([x5c(cert)]);
        }
        key
    }

    fn key_set(keys: Vec<serde_json::Value>) -> JwkSet {
        serde_json::from_value(serde_json::json!({ "keys": keys })).unwrap()
    }

    fn resolver() -> HttpJwksResolver {
        HttpJwksResolver::new(HttpConfig::default().with_allow_http(true)).unwrap()
    }

    #[test]
    fn test_certificates_in_order() {
        let jwks = key_set(vec![
            jwk("a", "sig", Some(RSA_CERT)),
            jwk("b", "sig", Some(OTHER_CERT)),
        ]);

        let certs = certificates(&jwks);
        assert_eq!(certs.len(), 2);
        assert_eq!(x5c(certs[0].as_pem()), x5c(RSA_CERT));
        assert_eq!(x5c(certs[1].as_pem()), x5c(OTHER_CERT));
        assert_eq!(first_certificate(&jwks).unwrap(), certs[0]);
    }

    #[test]
    fn test_encryption_keys_and_bare_keys_are_skipped() {
        let jwks = key_set(vec![
            jwk("enc", "enc", Some(OTHER_CERT)),
            jwk("bare", "sig", None),
            jwk("sig", "sig", Some(RSA_CERT)),
        ]);

        let cert = first_certificate(&jwks).unwrap();
        assert_eq!(x5c(cert.as_pem()), x5c(RSA_CERT));
    }

    #[test]
    fn test_no_certificates() {
        let jwks = key_set(vec![jwk("bare", "sig", None)]);
        assert!(matches!(first_certificate(&jwks), Err(JwksError::NoCertificates)));
    }

    #[tokio::test]
    async fn test_resolve_first_certificate() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "keys": [jwk("a", "sig", Some(RSA_CERT)), jwk("b", "sig", Some(OTHER_CERT))]
            })))
            .mount(&mock_server)
            .await;

        let uri = Url::parse(&format!("{}/.well-known/jwks", mock_server.uri())).unwrap();
        let resolver = resolver();

        assert_eq!(resolver.resolve(&uri).await.unwrap().len(), 2);
        let cert = resolver.first_certificate(&uri).await.unwrap();
        assert_eq!(x5c(cert.as_pem()), x5c(RSA_CERT));
    }

    #[tokio::test]
    async fn test_resolve_without_certificates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "keys": [jwk("a", "sig", None)] })),
            )
            .mount(&mock_server)
            .await;

        let uri = Url::parse(&mock_server.uri()).unwrap();
        let result = resolver().resolve(&uri).await;
        assert!(matches!(result, Err(JwksError::NoCertificates)));
    }

    #[tokio::test]
    async fn test_http_error_and_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let resolver = resolver();

        let uri = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
        assert!(matches!(resolver.fetch(&uri).await, Err(JwksError::HttpError(500))));

        let uri = Url::parse(&format!("{}/garbage", mock_server.uri())).unwrap();
        assert!(matches!(resolver.fetch(&uri).await, Err(JwksError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_http_scheme_rejected_by_default() {
        let resolver = HttpJwksResolver::new(HttpConfig::default()).unwrap();
        let uri = Url::parse("http://auth.example.com/jwks").unwrap();

        assert!(matches!(resolver.fetch(&uri).await, Err(JwksError::InvalidScheme)));
    }
}
