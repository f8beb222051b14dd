use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "octofhir-oidc")]
#[command(about = "OctoFHIR OIDC: build and validate Implicit flow round trips")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "OCTOFHIR_OIDC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch provider metadata and the signing certificate
    Discover(DiscoverArgs),
    /// Build an authorization request and save it for validation
    Authorize(AuthorizeArgs),
    /// Validate an authentication response against a saved request
    Validate(ValidateArgs),
}

#[derive(clap::Args)]
pub struct DiscoverArgs {
    /// Issuer URL (e.g. https://auth.example.com)
    #[arg(long)]
    pub issuer: String,
    /// Write the first JWKS certificate to this file as PEM
    #[arg(long)]
    pub cert_out: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct AuthorizeArgs {
    /// Issuer URL (e.g. https://auth.example.com)
    #[arg(long)]
    pub issuer: String,
    /// Client ID registered with the provider
    #[arg(long)]
    pub client_id: String,
    /// Redirect URI registered with the provider
    #[arg(long)]
    pub redirect_uri: String,
    /// Requested scope
    #[arg(long, default_value = "openid")]
    pub scope: String,
    /// Requested response type
    #[arg(long, default_value = "id_token token")]
    pub response_type: String,
    /// Where to save the request
    #[arg(long, default_value = "request.toml")]
    pub out: PathBuf,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Saved request (written by `authorize`)
    #[arg(long, default_value = "request.toml")]
    pub request: PathBuf,
    /// Redirect URL, fragment or query string returned by the provider
    #[arg(long)]
    pub response: String,
    /// Issuer certificate (PEM). Fetched from the request's jwks_uri if omitted
    #[arg(long)]
    pub cert: Option<PathBuf>,
}
