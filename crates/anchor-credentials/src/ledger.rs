//! In-memory ledger of refresh credentials.
//!
//! One [`LineageRecord`] exists per minted refresh credential, keyed by its
//! `jti`. A record moves out of [`RefreshState::Issued`] at most once and never
//! back. All operations take the single map lock, so a check-and-invalidate
//! through [`RefreshLedger::consume`] is atomic with respect to every other
//! operation.
//!
//! Revoking a lineage also marks it revoked. A record registered later in a
//! marked lineage (a rotation that consumed its predecessor just before the
//! revocation) is stored as `Revoked`, never `Issued`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle state of a refresh credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    /// Minted and not yet redeemed.
    Issued,
    /// Redeemed once through rotation.
    Consumed,
    /// Invalidated by revocation or reuse detection.
    Revoked,
}

/// Server-side record for one refresh credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRecord {
    /// Refresh credential id (`jti`).
    pub id: String,
    /// Subject the credential was minted for.
    pub subject: String,
    /// Shared by every refresh credential derived from one login.
    pub lineage_id: String,
    pub state: RefreshState,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// When the record left `Issued`.
    pub invalidated_at: Option<DateTime<Utc>>,
}

impl LineageRecord {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        lineage_id: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            lineage_id: lineage_id.into(),
            state: RefreshState::Issued,
            issued_at: Utc::now(),
            expires_at,
            invalidated_at: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state == RefreshState::Issued
    }

    /// Expiry at whole-second resolution, matching the `exp` check done when
    /// the credential is decoded.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.timestamp() < now.timestamp()
    }

    /// Move to a terminal state. Returns false if already invalid.
    fn transition(&mut self, to: RefreshState) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.state = to;
        self.invalidated_at = Some(Utc::now());
        true
    }
}

/// Result of an atomic consume attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The record was valid and is now consumed. Carries the record as it was
    /// before consumption.
    Consumed(LineageRecord),
    /// The record exists but was already consumed or revoked.
    AlreadyInvalid(LineageRecord),
    /// No record for this id.
    Unknown,
}

#[derive(Debug, Default)]
struct LedgerState {
    records: HashMap<String, LineageRecord>,
    revoked_lineages: HashSet<String>,
}

impl LedgerState {
    fn invalidate_where(&mut self, predicate: impl Fn(&LineageRecord) -> bool) -> usize {
        let mut changed = 0;
        for record in self.records.values_mut() {
            if !predicate(record) {
                continue;
            }
            // Consumed records still mark their lineage: a rotation that
            // consumed one may not have registered its replacement yet.
            self.revoked_lineages.insert(record.lineage_id.clone());
            if record.transition(RefreshState::Revoked) {
                changed += 1;
            }
        }
        changed
    }
}

/// Owned, thread-safe refresh credential store.
#[derive(Debug, Default)]
pub struct RefreshLedger {
    state: Mutex<LedgerState>,
}

impl RefreshLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation leaves the map consistent, so a poisoned lock is safe to
    // reuse.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store or overwrite a record by id.
    ///
    /// Returns false if the record's lineage has been revoked. The record is
    /// then stored as `Revoked` and can never be consumed.
    pub fn put(&self, mut record: LineageRecord) -> bool {
        let mut state = self.lock();
        let accepted = !state.revoked_lineages.contains(&record.lineage_id);
        if !accepted {
            record.transition(RefreshState::Revoked);
        }
        state.records.insert(record.id.clone(), record);
        accepted
    }

    pub fn get(&self, id: &str) -> Option<LineageRecord> {
        self.lock().records.get(id).cloned()
    }

    /// Whether `lineage_id` has been revoked as a whole.
    pub fn is_lineage_revoked(&self, lineage_id: &str) -> bool {
        self.lock().revoked_lineages.contains(lineage_id)
    }

    /// Mark a record revoked. No-op if absent or already invalid; returns
    /// whether a valid record was invalidated.
    pub fn invalidate(&self, id: &str) -> bool {
        self.lock()
            .records
            .get_mut(id)
            .is_some_and(|record| record.transition(RefreshState::Revoked))
    }

    /// Check validity and consume in one step.
    pub fn consume(&self, id: &str) -> ConsumeOutcome {
        let mut state = self.lock();
        match state.records.get_mut(id) {
            None => ConsumeOutcome::Unknown,
            Some(record) => {
                let before = record.clone();
                if record.transition(RefreshState::Consumed) {
                    ConsumeOutcome::Consumed(before)
                } else {
                    ConsumeOutcome::AlreadyInvalid(before)
                }
            }
        }
    }

    /// Revoke every valid record of `subject` and mark each of its lineages
    /// revoked. Returns how many records changed.
    pub fn invalidate_all_for_subject(&self, subject: &str) -> usize {
        self.lock()
            .invalidate_where(|record| record.subject == subject)
    }

    /// Revoke every valid record sharing `lineage_id` and mark the lineage
    /// revoked. Returns how many records changed.
    pub fn invalidate_lineage(&self, lineage_id: &str) -> usize {
        let mut state = self.lock();
        state.revoked_lineages.insert(lineage_id.to_string());
        state.invalidate_where(|record| record.lineage_id == lineage_id)
    }

    /// Drop records whose expiry is before `now`, and lineage marks with no
    /// record left. Returns how many records were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.lock();
        let before = state.records.len();
        state.records.retain(|_, record| !record.is_expired_at(now));
        let removed = before - state.records.len();

        let LedgerState {
            records,
            revoked_lineages,
        } = &mut *state;
        revoked_lineages.retain(|lineage| records.values().any(|r| &r.lineage_id == lineage));

        removed
    }

    /// Valid records currently held for `subject`.
    pub fn valid_for_subject(&self, subject: &str) -> Vec<LineageRecord> {
        self.lock()
            .records
            .values()
            .filter(|record| record.subject == subject && record.is_valid())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }
}
