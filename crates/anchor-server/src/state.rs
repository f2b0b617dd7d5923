use crate::config::AppConfig;
use anchor_credentials::{CredentialService, CredentialSettings};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;

/// Shared application state.
pub struct AppState {
    /// The single trusted client identity.
    pub client_id: String,
    client_secret: String,
    pub credentials: CredentialService,
    pub sweep_interval: Duration,
}

impl AppState {
    /// Resolve every required option. Any missing secret, TTL or identity is
    /// fatal here, before the server binds.
    pub fn init(cfg: &AppConfig) -> anyhow::Result<Self> {
        let client_id = cfg
            .server
            .client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .context("missing [server].client_id")?;
        let client_secret = cfg.server.resolve_client_secret()?;
        let settings = cfg
            .credentials
            .resolve()
            .context("invalid [credentials] configuration")?;

        Ok(Self::new(client_id, client_secret, &settings))
    }

    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        settings: &CredentialSettings,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            credentials: CredentialService::new(settings),
            sweep_interval: settings.sweep_interval,
        }
    }

    /// Check presented client credentials. The secret comparison is constant
    /// time.
    pub fn verify_client(&self, client_id: &str, client_secret: &str) -> bool {
        let secret_ok: bool = self
            .client_secret
            .as_bytes()
            .ct_eq(client_secret.as_bytes())
            .into();
        secret_ok && client_id == self.client_id
    }
}

/// Periodically drop expired refresh records from the ledger.
pub fn spawn_sweeper(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.sweep_interval);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            state.credentials.sweep_expired();
        }
    })
}
