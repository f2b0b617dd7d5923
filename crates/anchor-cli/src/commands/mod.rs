//! CLI command implementations for Anchor.

pub mod keys;
pub mod token;

use anchor_credentials::{CredentialSettings, CredentialsConfig};
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The parts of an `anchor.toml` the CLI reads. Other tables are ignored.
#[derive(Debug, Default, Deserialize)]
struct CliConfig {
    #[serde(default)]
    credentials: CredentialsConfig,
}

/// Load and resolve the `[credentials]` table of a config file.
pub fn load_settings(path: &Path) -> anyhow::Result<CredentialSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let cfg: CliConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    cfg.credentials
        .resolve()
        .context("Invalid [credentials] configuration")
}

/// Read a token argument, accepting either the token itself or a path to a
/// file holding it.
pub fn read_token_arg(token: String) -> anyhow::Result<String> {
    let path = Path::new(&token);
    if path.is_file() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;
        return Ok(raw.trim().to_string());
    }
    Ok(token.trim().to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_reads_credentials_table() {
        let dir = tempdir().unwrap();
        let config = test_support::write_config(dir.path(), "15m");

        let settings = load_settings(&config).unwrap();
        assert_eq!(settings.issuer, "anchor");
        assert_eq!(settings.audience, "anchor-api");
        assert_eq!(settings.access_ttl, chrono::Duration::minutes(15));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let dir = tempdir().unwrap();
        assert!(load_settings(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_read_token_arg_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.jwt");
        fs::write(&path, "abc.def.ghi\n").unwrap();

        let token = read_token_arg(path.to_string_lossy().to_string()).unwrap();
        assert_eq!(token, "abc.def.ghi");
        assert_eq!(read_token_arg(" abc.def.ghi ".to_string()).unwrap(), "abc.def.ghi");
    }
}
