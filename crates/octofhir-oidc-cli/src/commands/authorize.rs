use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_oidc::{DiscoveryResolver, HttpDiscoveryResolver, ImplicitRequestBuilder, OidcConfig};
use url::Url;

use crate::cli::AuthorizeArgs;
use crate::config::save_request;
use crate::output::{print_field, print_success};

pub async fn authorize(config: &OidcConfig, args: &AuthorizeArgs) -> Result<()> {
    let issuer = Url::parse(&args.issuer).context("Invalid issuer URL")?;
    let metadata = HttpDiscoveryResolver::new(config.http.clone())?
        .resolve(&issuer)
        .await?;

    if !metadata.supports_response_type(&args.response_type) {
        println!(
            "{} provider does not advertise response_type '{}'",
            "!".yellow(),
            args.response_type
        );
    }

    let request = ImplicitRequestBuilder::new(&metadata, &args.client_id, &args.redirect_uri)
        .response_type(&args.response_type)
        .scope(&args.scope)
        .build()?;

    save_request(&args.out, &request)?;

    print_field("State", &request.state);
    print_field("Nonce", request.nonce.as_deref().unwrap_or("-"));
    print_field("URL", request.url.as_deref().unwrap_or("-"));
    print_success(&format!("Saved request to {}", args.out.display()));
    Ok(())
}
