use std::fs;

use anyhow::{Context, Result};
use octofhir_oidc::{
    CertificateResolver, DiscoveryResolver, HttpDiscoveryResolver, HttpJwksResolver, OidcConfig,
};
use url::Url;

use crate::cli::DiscoverArgs;
use crate::output::{print_json, print_success};

pub async fn discover(config: &OidcConfig, args: &DiscoverArgs) -> Result<()> {
    let issuer = Url::parse(&args.issuer).context("Invalid issuer URL")?;
    let metadata = HttpDiscoveryResolver::new(config.http.clone())?
        .resolve(&issuer)
        .await?;
    print_json(&metadata)?;

    let jwks_uri = Url::parse(&metadata.jwks_uri).context("Invalid jwks_uri in provider metadata")?;
    let certificate = HttpJwksResolver::new(config.http.clone())?
        .first_certificate(&jwks_uri)
        .await?;

    match &args.cert_out {
        Some(path) => {
            fs::write(path, certificate.as_pem())
                .with_context(|| format!("Cannot write certificate to {}", path.display()))?;
            print_success(&format!("Saved signing certificate to {}", path.display()));
        }
        None => print!("{}", certificate.as_pem()),
    }

    Ok(())
}
