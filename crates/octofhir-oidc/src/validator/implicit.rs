//! Implicit flow response validation.
//!
//! Implements the checks of
//! [OpenID Connect Core 1.0 §3.2.2](https://openid.net/specs/openid-connect-core-1_0.html#ImplicitAuthResponseValidation)
//! as a strict pipeline. The first failing gate ends validation:
//!
//! 1. `state`, `token_type`, `id_token` and `access_token` are present
//! 2. `state` matches the request
//! 3. the `id_token` signature verifies against the issuer certificate
//! 4. `iss` is the discovered issuer
//! 5. `aud` is the client (or contains it, with `azp` naming it)
//! 6. `exp` is in the future
//! 7. `nonce` matches the request, if the request had one
//! 8. `at_hash` matches the access token
//!
//! No claim is read before the signature has been verified.

use serde::Serialize;

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use crate::flow::Flow;
use crate::request::AuthRequest;
use crate::response::AuthResponse;
use crate::token::{AccessTokenHash, Certificate, Claims, CompactToken, SignatureVerifier, TokenHeader};

/// Response parameters that must be present, in check order.
pub const REQUIRED_PROPERTIES: [&str; 4] = ["state", "token_type", "id_token", "access_token"];

/// A response that passed every check.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedResponse {
    /// The flow the response was validated for.
    pub flow: Flow,

    /// Always `true`: a response is only returned after its signature verified.
    pub signature_verified: bool,

    /// The verified ID token header.
    pub header: TokenHeader,

    /// The verified ID token claims.
    pub claims: Claims,

    /// The `token_type` response parameter.
    pub token_type: String,

    /// The `state` response parameter.
    pub state: String,

    /// The raw ID token.
    #[serde(skip_serializing)]
    pub id_token: String,

    /// The raw access token.
    #[serde(skip_serializing)]
    pub access_token: String,
}

/// Runs the Implicit flow checks for one request/response pair.
#[derive(Debug)]
pub struct ImplicitFlowValidator<'a> {
    request: &'a AuthRequest,
    response: &'a AuthResponse,
    config: &'a ValidatorConfig,
    verifier: SignatureVerifier,
}

impl<'a> ImplicitFlowValidator<'a> {
    /// Creates a validator for `response` to `request`.
    #[must_use]
    pub fn new(
        request: &'a AuthRequest,
        response: &'a AuthResponse,
        config: &'a ValidatorConfig,
    ) -> Self {
        Self {
            request,
            response,
            config,
            verifier: SignatureVerifier::from_config(config),
        }
    }

    /// Validates the response as of `now` (UTC seconds).
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing check.
    pub fn validate(
        &self,
        certificate: &Certificate,
        now: i64,
    ) -> Result<ValidatedResponse, ValidationError> {
        self.check_properties()?;
        self.check_state()?;

        let token = self.verify_signature(certificate)?;
        let claims = token.claims();

        self.check_issuer(claims)?;
        self.check_audience(claims)?;
        self.check_expiry(claims, now)?;
        self.check_nonce(claims)?;
        self.check_access_token_hash(&token)?;

        tracing::debug!(
            alg = %token.header().alg,
            "All implicit flow checks passed"
        );

        Ok(ValidatedResponse {
            flow: Flow::Implicit,
            signature_verified: true,
            header: token.header().clone(),
            token_type: self.property("token_type")?.to_string(),
            state: self.property("state")?.to_string(),
            id_token: self.property("id_token")?.to_string(),
            access_token: self.property("access_token")?.to_string(),
            claims: token.into_claims(),
        })
    }

    fn property(&self, name: &str) -> Result<&'a str, ValidationError> {
        self.response
            .get(name)
            .ok_or_else(|| ValidationError::missing_property(name))
    }

    fn check_properties(&self) -> Result<(), ValidationError> {
        for name in REQUIRED_PROPERTIES {
            self.property(name)?;
        }
        Ok(())
    }

    fn check_state(&self) -> Result<(), ValidationError> {
        if self.property("state")? != self.request.state {
            return Err(ValidationError::invalid_property("state"));
        }
        Ok(())
    }

    fn verify_signature(&self, certificate: &Certificate) -> Result<CompactToken, ValidationError> {
        let token = self
            .verifier
            .verify_token(self.property("id_token")?, certificate)?;
        tracing::debug!("id_token signature verified");
        Ok(token)
    }

    fn check_issuer(&self, claims: &Claims) -> Result<(), ValidationError> {
        claims.get_claim("iss")?;
        if claims.get_str("iss") != Some(self.request.issuer.as_str()) {
            return Err(ValidationError::invalid_claim("iss"));
        }
        Ok(())
    }

    fn check_audience(&self, claims: &Claims) -> Result<(), ValidationError> {
        claims.get_claim("aud")?;
        let client_id = self.request.client_id.as_str();

        if claims.get_str("aud") == Some(client_id) {
            return Ok(());
        }

        // Multiple audiences are only accepted when the client is the authorized party.
        if claims.is_array("aud")
            && claims.verify_claim("aud", client_id)
            && claims.get_str("azp") == Some(client_id)
        {
            return Ok(());
        }

        Err(ValidationError::invalid_claim("aud"))
    }

    fn check_expiry(&self, claims: &Claims, now: i64) -> Result<(), ValidationError> {
        claims.get_claim("exp")?;
        let exp = claims
            .get_i64("exp")
            .ok_or_else(|| ValidationError::invalid_claim("exp"))?;

        let skew = i64::try_from(self.config.clock_skew.as_secs()).unwrap_or(i64::MAX);
        if now.saturating_sub(skew) >= exp {
            return Err(ValidationError::TokenExpired { exp, now });
        }
        Ok(())
    }

    fn check_nonce(&self, claims: &Claims) -> Result<(), ValidationError> {
        let Some(expected) = self.request.nonce.as_deref() else {
            return Ok(());
        };

        claims.get_claim("nonce")?;
        if claims.get_str("nonce") != Some(expected) {
            return Err(ValidationError::invalid_claim("nonce"));
        }
        Ok(())
    }

    fn check_access_token_hash(&self, token: &CompactToken) -> Result<(), ValidationError> {
        let Some(access_token) = self.response.get("access_token") else {
            return Ok(());
        };

        let hash = AccessTokenHash::for_algorithm(&token.header().alg)?;
        let claims = token.claims();
        claims.get_claim("at_hash")?;

        match claims.get_str("at_hash") {
            Some(expected) if hash.matches(access_token, expected) => Ok(()),
            _ => Err(ValidationError::invalid_claim("at_hash")),
        }
    }
}
