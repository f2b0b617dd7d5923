//! Subject-wide refresh credential revocation.

use crate::ledger::RefreshLedger;
use std::sync::Arc;

pub struct Revoker {
    ledger: Arc<RefreshLedger>,
}

impl Revoker {
    pub fn new(ledger: Arc<RefreshLedger>) -> Self {
        Self { ledger }
    }

    /// Invalidate every outstanding refresh credential of `subject`, across
    /// all lineages. Idempotent. Returns how many credentials were revoked.
    ///
    /// Access credentials already handed out stay valid until they expire.
    pub fn revoke_all(&self, subject: &str) -> usize {
        let revoked = self.ledger.invalidate_all_for_subject(subject);
        tracing::info!(subject, revoked, "revoked refresh credentials");
        revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LineageRecord;
    use chrono::{Duration, Utc};

    #[test]
    fn test_revoke_all_is_idempotent() {
        let ledger = Arc::new(RefreshLedger::new());
        let expires = Utc::now() + Duration::days(1);
        ledger.put(LineageRecord::new("r1", "app-1", "l1", expires));
        ledger.put(LineageRecord::new("r2", "app-1", "l2", expires));

        let revoker = Revoker::new(ledger.clone());
        assert_eq!(revoker.revoke_all("app-1"), 2);
        assert_eq!(revoker.revoke_all("app-1"), 0);
        assert_eq!(revoker.revoke_all("unknown"), 0);
        assert!(ledger.valid_for_subject("app-1").is_empty());
    }
}
