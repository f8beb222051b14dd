use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use octofhir_oidc::{AuthRequest, OidcConfig};

/// Loads the configuration file, or the defaults when none is given.
pub fn load(path: Option<&Path>) -> Result<OidcConfig> {
    let Some(path) = path else {
        return Ok(OidcConfig::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file {}", path.display()))?;
    let config: OidcConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    config.validate()?;

    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

pub fn load_request(path: &Path) -> Result<AuthRequest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read request file {}", path.display()))?;
    let request: AuthRequest = toml::from_str(&content)
        .with_context(|| format!("Invalid request file {}", path.display()))?;
    Ok(request)
}

pub fn save_request(path: &Path, request: &AuthRequest) -> Result<()> {
    let content = toml::to_string_pretty(request)?;
    fs::write(path, content)
        .with_context(|| format!("Cannot write request file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_load_defaults_without_file() {
        let config = load(None).unwrap();
        assert_eq!(config.validator.clock_skew, Duration::ZERO);
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oidc.toml");
        fs::write(
            &path,
            r#"
[validator]
clock_skew = "45s"
allowed_algorithms = ["RS256"]

[http]
request_timeout = "3s"
allow_http = true
"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.validator.clock_skew, Duration::from_secs(45));
        assert_eq!(config.validator.allowed_algorithms, vec!["RS256"]);
        assert_eq!(config.http.request_timeout, Duration::from_secs(3));
        assert!(config.http.allow_http);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oidc.toml");
        fs::write(&path, "[validator]\nallowed_algorithms = [\"HS256\"]\n").unwrap();

        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_request_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.toml");
        let request = AuthRequest::new("id_token token", "C1", "S1", "https://issuer.example")
            .with_nonce("N1");

        save_request(&path, &request).unwrap();
        assert_eq!(load_request(&path).unwrap(), request);
    }
}
