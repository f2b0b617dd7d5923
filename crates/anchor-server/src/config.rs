use anchor_credentials::CredentialsConfig;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Identity of the single trusted client allowed to log in. Also the
    /// subject of every credential minted at login.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Environment variable holding the trusted client's secret.
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    /// File holding the trusted client's secret (used when the env var is unset).
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_client_secret_env() -> String {
    "ANCHOR_CLIENT_SECRET".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            client_id: None,
            client_secret_env: default_client_secret_env(),
            client_secret_file: None,
        }
    }
}

impl ServerConfig {
    /// Resolve the trusted client secret: environment first, then file.
    pub fn resolve_client_secret(&self) -> anyhow::Result<String> {
        if let Ok(secret) = env::var(&self.client_secret_env) {
            if !secret.trim().is_empty() {
                return Ok(secret.trim().to_string());
            }
        }

        if let Some(path) = &self.client_secret_file {
            let secret = fs::read_to_string(path)?;
            if !secret.trim().is_empty() {
                return Ok(secret.trim().to_string());
            }
        }

        anyhow::bail!(
            "trusted client secret not found (set ${} or [server].client_secret_file)",
            self.client_secret_env
        )
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let path = config_path();
    let raw = fs::read_to_string(&path)?;
    let cfg: AppConfig = toml::from_str(&raw)?;
    Ok(cfg)
}

fn config_path() -> PathBuf {
    if let Ok(p) = env::var("ANCHOR_SERVER_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("anchor.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            bind = "127.0.0.1:9000"
            client_id = "app-1"

            [credentials]
            issuer = "anchor"
            audience = "anchor-api"
            access_ttl = "15m"
            refresh_ttl = "7d"
            revoke_lineage_on_reuse = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert_eq!(cfg.server.client_id.as_deref(), Some("app-1"));
        assert_eq!(cfg.server.client_secret_env, "ANCHOR_CLIENT_SECRET");
        assert_eq!(cfg.credentials.issuer.as_deref(), Some("anchor"));
        assert!(!cfg.credentials.revoke_lineage_on_reuse);
    }

    #[test]
    fn test_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert!(cfg.server.client_id.is_none());
        assert!(cfg.credentials.access_ttl.is_none());
    }

    #[test]
    fn test_client_secret_missing() {
        let server = ServerConfig {
            client_secret_env: "ANCHOR_TEST_UNSET_CLIENT_SECRET".to_string(),
            ..ServerConfig::default()
        };
        assert!(server.resolve_client_secret().is_err());
    }
}
