use std::fs;

use anyhow::{Context, Result, bail};
use octofhir_oidc::{
    AuthRequest, Certificate, CertificateResolver, HttpJwksResolver, OidcConfig, ResponseValidator,
};
use serde_json::json;
use url::Url;

use crate::cli::ValidateArgs;
use crate::config::load_request;
use crate::output::{print_json, print_success};

pub async fn validate(config: &OidcConfig, args: &ValidateArgs) -> Result<()> {
    let request = load_request(&args.request)?;
    let certificate = load_certificate(config, args, &request).await?;
    let response = response_parameters(&args.response);

    let outcome = ResponseValidator::new(Some(request), Some(response))
        .and_then(|v| v.with_config(config.validator.clone()).validate(&certificate));

    match outcome {
        Ok(validated) => {
            print_json(&json!({ "valid": true, "response": validated }))?;
            print_success("Authentication response is valid");
            Ok(())
        }
        Err(e) => {
            print_json(&json!({
                "valid": false,
                "error": {
                    "kind": e.kind(),
                    "subject": e.subject(),
                    "message": e.to_string(),
                }
            }))?;
            bail!("Authentication response rejected: {e}")
        }
    }
}

async fn load_certificate(
    config: &OidcConfig,
    args: &ValidateArgs,
    request: &AuthRequest,
) -> Result<Certificate> {
    if let Some(path) = &args.cert {
        let pem = fs::read_to_string(path)
            .with_context(|| format!("Cannot read certificate {}", path.display()))?;
        return Ok(Certificate::new(pem));
    }

    let Some(jwks_uri) = &request.jwks_uri else {
        bail!("No --cert given and the saved request has no jwks_uri");
    };
    let jwks_uri = Url::parse(jwks_uri).context("Invalid jwks_uri in saved request")?;
    let certificate = HttpJwksResolver::new(config.http.clone())?
        .first_certificate(&jwks_uri)
        .await?;
    Ok(certificate)
}

/// Accepts a full redirect URL, a bare fragment, or a query string.
fn response_parameters(raw: &str) -> &str {
    let raw = raw.trim();
    if let Some((_, fragment)) = raw.split_once('#') {
        return fragment;
    }
    match raw.split_once('?') {
        Some((base, query)) if Url::parse(base).is_ok() => query,
        _ => raw,
    }
}
