//! Relying-party configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [validator]
//! clock_skew = "0s"
//! allowed_algorithms = ["RS256", "PS256"]
//!
//! [http]
//! request_timeout = "10s"
//! allow_http = false
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Signing algorithms accepted for ID tokens unless configured otherwise.
///
/// Only asymmetric algorithms can be checked against a certificate.
pub const DEFAULT_ALLOWED_ALGORITHMS: &[&str] = &[
    "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "ES256", "ES384",
];

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Response validation settings.
    pub validator: ValidatorConfig,

    /// Discovery and JWKS HTTP client settings.
    pub http: HttpConfig,
}

/// Response validation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Tolerance subtracted from the current time before the `exp` check.
    /// Zero keeps the check at exactly `now < exp`.
    #[serde(with = "humantime_serde")]
    pub clock_skew: Duration,

    /// ID token `alg` values accepted by the signature check.
    pub allowed_algorithms: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            clock_skew: Duration::ZERO,
            allowed_algorithms: DEFAULT_ALLOWED_ALGORITHMS
                .iter()
                .map(|alg| (*alg).to_string())
                .collect(),
        }
    }
}

impl ValidatorConfig {
    /// Sets the clock skew tolerance.
    #[must_use]
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Replaces the accepted signing algorithms.
    #[must_use]
    pub fn with_allowed_algorithms<I, S>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if `alg` may sign an ID token.
    #[must_use]
    pub fn is_algorithm_allowed(&self, alg: &str) -> bool {
        self.allowed_algorithms.iter().any(|a| a == alg)
    }
}

/// HTTP client settings for discovery and JWKS fetching.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// HTTP request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Maximum response size in bytes.
    pub max_response_size: usize,

    /// Whether to allow plain HTTP endpoints.
    /// This should only be enabled for testing.
    pub allow_http: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_response_size: 1024 * 1024, // 1 MB
            allow_http: false,
        }
    }
}

impl HttpConfig {
    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum response size.
    #[must_use]
    pub fn with_max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }

    /// Allows HTTP (non-HTTPS) endpoints.
    ///
    /// # Warning
    ///
    /// This should only be used for testing.
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl OidcConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - No signing algorithm is allowed
    /// - An allowed algorithm is symmetric, `none`, or unknown
    /// - The HTTP timeout or maximum response size is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validator.allowed_algorithms.is_empty() {
            return Err(ConfigError::InvalidValue(
                "validator.allowed_algorithms cannot be empty".to_string(),
            ));
        }

        for alg in &self.validator.allowed_algorithms {
            if !DEFAULT_ALLOWED_ALGORITHMS.contains(&alg.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid signing algorithm: '{}'. Must be one of {}",
                    alg,
                    DEFAULT_ALLOWED_ALGORITHMS.join(", ")
                )));
            }
        }

        if self.http.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "http.request_timeout must be > 0".to_string(),
            ));
        }

        if self.http.max_response_size == 0 {
            return Err(ConfigError::InvalidValue(
                "http.max_response_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed input and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
