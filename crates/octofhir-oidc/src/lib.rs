//! # octofhir-oidc
//!
//! OpenID Connect relying-party support for OctoFHIR.
//!
//! This crate provides:
//! - Validation of Implicit flow authentication responses
//! - Compact ID token decoding and signature verification
//! - Implicit flow authorization request construction
//! - Provider discovery and JWKS certificate retrieval
//!
//! ## Overview
//!
//! A relying party sends the user agent to the provider with an
//! [`AuthRequest`], receives the tokens back in the redirect fragment, and
//! hands both to a [`ResponseValidator`] together with the issuer
//! certificate. Validation either returns a [`ValidatedResponse`] or the one
//! [`ValidationError`] that stopped it.
//!
//! ## Modules
//!
//! - [`validator`] - Response validation pipeline
//! - [`flow`] - Flow selection from `response_type`
//! - [`response`] - Redirect fragment parsing
//! - [`token`] - ID token decoding, claims and signatures
//! - [`request`] - Authorization request descriptor and builder
//! - [`discovery`] - Provider metadata retrieval
//! - [`jwks`] - Issuer certificate retrieval
//! - [`config`] - Validator and HTTP configuration
//! - [`error`] - Validation error taxonomy

pub mod config;
pub mod discovery;
pub mod error;
pub mod flow;
pub mod jwks;
pub mod request;
pub mod response;
pub mod token;
pub mod validator;

pub use config::{ConfigError, HttpConfig, OidcConfig, ValidatorConfig};
pub use discovery::{DiscoveryError, DiscoveryResolver, HttpDiscoveryResolver, ProviderMetadata};
pub use error::{ErrorKind, ValidationError};
pub use flow::Flow;
pub use jwks::{CertificateResolver, HttpJwksResolver, JwksError};
pub use request::{AuthRequest, ImplicitRequestBuilder, RequestError};
pub use response::AuthResponse;
pub use token::{AccessTokenHash, Certificate, Claims, CompactToken, SignatureVerifier};
pub use validator::{ResponseValidator, ValidatedResponse};

/// Type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use octofhir_oidc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ValidationResult;
    pub use crate::config::{HttpConfig, OidcConfig, ValidatorConfig};
    pub use crate::discovery::{DiscoveryResolver, HttpDiscoveryResolver, ProviderMetadata};
    pub use crate::error::{ErrorKind, ValidationError};
    pub use crate::flow::Flow;
    pub use crate::jwks::{CertificateResolver, HttpJwksResolver};
    pub use crate::request::{AuthRequest, ImplicitRequestBuilder};
    pub use crate::token::Certificate;
    pub use crate::validator::{ResponseValidator, ValidatedResponse};
}
