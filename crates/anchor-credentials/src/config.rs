//! Credential configuration.
//!
//! Secrets are never written into the config file itself: each one names an
//! environment variable and, optionally, a file to fall back to.

use crate::error::ConfigError;
use crate::keys::{KeySet, SigningSecret};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ACCESS_SECRET_ENV: &str = "ANCHOR_ACCESS_SECRET";
pub const DEFAULT_REFRESH_SECRET_ENV: &str = "ANCHOR_REFRESH_SECRET";

/// Raw credential options as read from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Environment variable holding the access-credential secret.
    #[serde(default = "default_access_secret_env")]
    pub access_secret_env: String,

    /// File holding the access-credential secret.
    #[serde(default)]
    pub access_secret_file: Option<PathBuf>,

    /// Environment variable holding the refresh-credential secret.
    #[serde(default = "default_refresh_secret_env")]
    pub refresh_secret_env: String,

    /// File holding the refresh-credential secret.
    #[serde(default)]
    pub refresh_secret_file: Option<PathBuf>,

    /// `iss` claim written into and required on every credential.
    #[serde(default)]
    pub issuer: Option<String>,

    /// `aud` claim written into and required on every credential.
    #[serde(default)]
    pub audience: Option<String>,

    /// Access credential lifetime (e.g., "15m").
    #[serde(default)]
    pub access_ttl: Option<String>,

    /// Refresh credential lifetime (e.g., "7d").
    #[serde(default)]
    pub refresh_ttl: Option<String>,

    /// Revoke the whole lineage when a consumed refresh credential is replayed.
    #[serde(default = "default_true")]
    pub revoke_lineage_on_reuse: bool,

    /// How often expired ledger records are swept (e.g., "5m").
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_secret_env: default_access_secret_env(),
            access_secret_file: None,
            refresh_secret_env: default_refresh_secret_env(),
            refresh_secret_file: None,
            issuer: None,
            audience: None,
            access_ttl: None,
            refresh_ttl: None,
            revoke_lineage_on_reuse: true,
            sweep_interval: default_sweep_interval(),
        }
    }
}

fn default_access_secret_env() -> String {
    DEFAULT_ACCESS_SECRET_ENV.to_string()
}

fn default_refresh_secret_env() -> String {
    DEFAULT_REFRESH_SECRET_ENV.to_string()
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> String {
    "5m".to_string()
}

/// Validated settings the credential components are built from.
#[derive(Debug, Clone)]
pub struct CredentialSettings {
    pub keys: KeySet,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub revoke_lineage_on_reuse: bool,
    pub sweep_interval: std::time::Duration,
}

impl CredentialSettings {
    /// Settings with explicit values, bypassing file/env resolution.
    pub fn new(
        keys: KeySet,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            access_ttl,
            refresh_ttl,
            revoke_lineage_on_reuse: true,
            sweep_interval: std::time::Duration::from_secs(300),
        }
    }
}

impl CredentialsConfig {
    /// Resolve secrets and parse every option. All options are required.
    pub fn resolve(&self) -> Result<CredentialSettings, ConfigError> {
        let access = resolve_secret(
            "access",
            &self.access_secret_env,
            self.access_secret_file.as_ref(),
        )?;
        let refresh = resolve_secret(
            "refresh",
            &self.refresh_secret_env,
            self.refresh_secret_file.as_ref(),
        )?;
        let keys = KeySet::new(access, refresh)?;

        let issuer = required("issuer", &self.issuer)?;
        let audience = required("audience", &self.audience)?;
        let access_ttl = parse_ttl_option("access_ttl", required("access_ttl", &self.access_ttl)?)?;
        let refresh_ttl =
            parse_ttl_option("refresh_ttl", required("refresh_ttl", &self.refresh_ttl)?)?;

        let sweep_interval = humantime::parse_duration(self.sweep_interval.trim()).map_err(|e| {
            ConfigError::InvalidDuration {
                option: "sweep_interval",
                value: self.sweep_interval.clone(),
                reason: e.to_string(),
            }
        })?;
        if sweep_interval.is_zero() {
            return Err(ConfigError::InvalidDuration {
                option: "sweep_interval",
                value: self.sweep_interval.clone(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(CredentialSettings {
            keys,
            issuer,
            audience,
            access_ttl,
            refresh_ttl,
            revoke_lineage_on_reuse: self.revoke_lineage_on_reuse,
            sweep_interval,
        })
    }
}

/// Environment first, then file.
fn resolve_secret(
    kind: &'static str,
    env_var: &str,
    file: Option<&PathBuf>,
) -> Result<SigningSecret, ConfigError> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(SigningSecret::from(value.trim()));
    }

    if let Some(path) = file {
        if path.exists() {
            return SigningSecret::load_from_file(path);
        }
    }

    Err(ConfigError::SecretNotFound {
        kind,
        env: env_var.to_string(),
    })
}

fn required(option: &'static str, value: &Option<String>) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::Missing(option)),
    }
}

/// Configured lifetimes must be positive; negative values are only for tests
/// that build settings directly.
fn parse_ttl_option(option: &'static str, value: String) -> Result<Duration, ConfigError> {
    match parse_ttl(&value) {
        Ok(ttl) if ttl > Duration::zero() => Ok(ttl),
        Ok(_) => Err(ConfigError::InvalidDuration {
            option,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Err(reason) => Err(ConfigError::InvalidDuration {
            option,
            value,
            reason,
        }),
    }
}

/// Parse a TTL string like "15m", "7d" or "1h 30m" into a signed duration.
///
/// A leading `-` yields a negative duration, which produces credentials that
/// are already expired.
pub fn parse_ttl(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };

    let std_duration = humantime::parse_duration(magnitude).map_err(|e| e.to_string())?;
    let duration = Duration::from_std(std_duration).map_err(|e| e.to_string())?;

    Ok(if negative { -duration } else { duration })
}
