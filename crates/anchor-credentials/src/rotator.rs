//! Single-use refresh credential rotation.
//!
//! A refresh credential is redeemed at most once. The ledger record is moved
//! to `Consumed` before the replacement pair is minted, so two concurrent
//! rotations of the same credential cannot both succeed.

use crate::claims::CredentialKind;
use crate::codec::ClaimCodec;
use crate::error::CredentialError;
use crate::issuer::{Issuer, TokenPair};
use crate::ledger::{ConsumeOutcome, RefreshLedger};
use std::sync::Arc;

pub struct Rotator {
    codec: Arc<ClaimCodec>,
    ledger: Arc<RefreshLedger>,
    issuer: Arc<Issuer>,
    revoke_lineage_on_reuse: bool,
}

impl Rotator {
    pub fn new(codec: Arc<ClaimCodec>, ledger: Arc<RefreshLedger>, issuer: Arc<Issuer>) -> Self {
        Self {
            codec,
            ledger,
            issuer,
            revoke_lineage_on_reuse: true,
        }
    }

    /// Whether replaying a consumed credential revokes its whole lineage.
    pub fn with_lineage_revocation(mut self, enabled: bool) -> Self {
        self.revoke_lineage_on_reuse = enabled;
        self
    }

    /// Exchange a refresh credential for a new pair in the same lineage.
    pub fn rotate(&self, presented: &str) -> Result<TokenPair, CredentialError> {
        let claims = self
            .codec
            .decode(presented, CredentialKind::Refresh)
            .map_err(|e| {
                tracing::debug!(cause = %e, "refresh credential rejected");
                CredentialError::InvalidRefresh
            })?;

        if !claims.is_refresh() {
            tracing::debug!(kind = %claims.kind, "non-refresh credential presented for rotation");
            return Err(CredentialError::InvalidRefresh);
        }

        let record = match self.ledger.consume(&claims.jti) {
            ConsumeOutcome::Consumed(record) => record,
            ConsumeOutcome::AlreadyInvalid(record) => {
                tracing::warn!(
                    subject = %record.subject,
                    refresh_id = %record.id,
                    lineage_id = %record.lineage_id,
                    state = ?record.state,
                    "refresh credential replayed"
                );
                if self.revoke_lineage_on_reuse {
                    let revoked = self.ledger.invalidate_lineage(&record.lineage_id);
                    tracing::warn!(
                        subject = %record.subject,
                        lineage_id = %record.lineage_id,
                        revoked,
                        "revoked lineage after refresh credential reuse"
                    );
                }
                return Err(CredentialError::ReusedOrRevokedRefresh);
            }
            ConsumeOutcome::Unknown => {
                tracing::warn!(
                    subject = %claims.sub,
                    refresh_id = %claims.jti,
                    "validly signed refresh credential has no ledger record"
                );
                return Err(CredentialError::ReusedOrRevokedRefresh);
            }
        };

        let pair = self
            .issuer
            .issue_in_lineage(&record.subject, &record.lineage_id)?;

        tracing::info!(
            subject = %record.subject,
            lineage_id = %record.lineage_id,
            "rotated refresh credential"
        );
        Ok(pair)
    }
}
