//! Wiring of the credential components around one shared ledger.

use crate::authenticator::{Authenticated, Authenticator};
use crate::codec::ClaimCodec;
use crate::config::CredentialSettings;
use crate::error::CredentialError;
use crate::issuer::{Issuer, TokenPair};
use crate::ledger::RefreshLedger;
use crate::revoker::Revoker;
use crate::rotator::Rotator;
use chrono::Utc;
use std::sync::Arc;

/// Login, refresh, authenticate and revoke over a single ledger instance.
pub struct CredentialService {
    codec: Arc<ClaimCodec>,
    ledger: Arc<RefreshLedger>,
    issuer: Arc<Issuer>,
    rotator: Rotator,
    authenticator: Authenticator,
    revoker: Revoker,
}

impl CredentialService {
    pub fn new(settings: &CredentialSettings) -> Self {
        Self::with_ledger(settings, Arc::new(RefreshLedger::new()))
    }

    /// Build the components around an existing ledger.
    pub fn with_ledger(settings: &CredentialSettings, ledger: Arc<RefreshLedger>) -> Self {
        let codec = Arc::new(ClaimCodec::new(
            settings.keys.clone(),
            settings.issuer.clone(),
            settings.audience.clone(),
        ));
        let issuer = Arc::new(Issuer::new(
            codec.clone(),
            ledger.clone(),
            settings.access_ttl,
            settings.refresh_ttl,
        ));
        let rotator = Rotator::new(codec.clone(), ledger.clone(), issuer.clone())
            .with_lineage_revocation(settings.revoke_lineage_on_reuse);

        Self {
            authenticator: Authenticator::new(codec.clone()),
            revoker: Revoker::new(ledger.clone()),
            codec,
            ledger,
            issuer,
            rotator,
        }
    }

    /// Mint a pair in a new lineage for an already-authenticated subject.
    pub fn login(&self, subject: &str) -> Result<TokenPair, CredentialError> {
        self.issuer.issue(subject)
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, CredentialError> {
        self.rotator.rotate(refresh_token)
    }

    pub fn authenticate(&self, access_token: &str) -> Result<Authenticated, CredentialError> {
        self.authenticator.authenticate(access_token)
    }

    pub fn revoke_all(&self, subject: &str) -> usize {
        self.revoker.revoke_all(subject)
    }

    /// Drop ledger records whose refresh credential has expired.
    pub fn sweep_expired(&self) -> usize {
        let purged = self.ledger.purge_expired(Utc::now());
        if purged > 0 {
            tracing::debug!(purged, remaining = self.ledger.len(), "swept expired refresh records");
        }
        purged
    }

    pub fn codec(&self) -> &ClaimCodec {
        &self.codec
    }

    pub fn ledger(&self) -> &RefreshLedger {
        &self.ledger
    }
}
