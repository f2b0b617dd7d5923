//! Minting of access/refresh credential pairs.

use crate::claims::{Claims, CredentialKind};
use crate::codec::{ClaimCodec, EncodedToken};
use crate::error::CredentialError;
use crate::keys::generate_id;
use crate::ledger::{LineageRecord, RefreshLedger};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The credentials handed to the client after login or rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// Access credential lifetime in seconds.
    pub expires_in: i64,
    /// Refresh credential lifetime in seconds.
    pub refresh_expires_in: i64,
}

/// Mints credential pairs and registers each refresh credential in the ledger.
pub struct Issuer {
    codec: Arc<ClaimCodec>,
    ledger: Arc<RefreshLedger>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Issuer {
    pub fn new(
        codec: Arc<ClaimCodec>,
        ledger: Arc<RefreshLedger>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            ledger,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mint a pair for `subject` in a new lineage (login).
    pub fn issue(&self, subject: &str) -> Result<TokenPair, CredentialError> {
        self.issue_in_lineage(subject, &generate_id())
    }

    /// Mint a pair for `subject` in an existing lineage (rotation).
    pub fn issue_in_lineage(
        &self,
        subject: &str,
        lineage_id: &str,
    ) -> Result<TokenPair, CredentialError> {
        let access = self.mint(subject, CredentialKind::Access, self.access_ttl)?;
        let refresh = self.mint(subject, CredentialKind::Refresh, self.refresh_ttl)?;

        let registered = self.ledger.put(LineageRecord::new(
            refresh.claims.jti.clone(),
            subject,
            lineage_id,
            refresh.claims.expires_at(),
        ));
        if !registered {
            // The lineage was revoked while this rotation was in flight.
            tracing::warn!(
                subject,
                lineage_id,
                refresh_id = %refresh.claims.jti,
                "refusing to issue into a revoked lineage"
            );
            return Err(CredentialError::ReusedOrRevokedRefresh);
        }

        tracing::debug!(
            subject,
            lineage_id,
            refresh_id = %refresh.claims.jti,
            "issued credential pair"
        );

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
            refresh_expires_in: self.refresh_ttl.num_seconds(),
        })
    }

    fn mint(
        &self,
        subject: &str,
        kind: CredentialKind,
        ttl: Duration,
    ) -> Result<EncodedToken, CredentialError> {
        let claims = Claims::new(
            subject,
            self.codec.issuer(),
            self.codec.audience(),
            generate_id(),
            kind,
        );
        self.codec.encode(claims, ttl).map_err(|e| {
            tracing::error!(%kind, error = %e, "failed to sign credential");
            CredentialError::Signing(e.to_string())
        })
    }
}
