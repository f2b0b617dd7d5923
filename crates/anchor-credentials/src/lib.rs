//! # anchor-credentials
//!
//! Credential issuance and rotation for the Anchor API.
//!
//! This crate provides functionality for:
//! - Minting short-lived access credentials and rotating refresh credentials
//! - Enforcing single use of every refresh credential (replay detection)
//! - Revoking every refresh credential of a subject, or of one lineage
//! - Verifying access credentials before protected operations
//!
//! ## Credential Model
//!
//! | Credential | Signed With | Lifetime | Server State |
//! |------------|-------------|----------|--------------|
//! | **Access** | access secret (HS256) | Short (e.g., 15m) | None |
//! | **Refresh** | refresh secret (HS256) | Long (e.g., 7d) | One ledger record |
//!
//! Every refresh credential produced by rotating the credentials of one login
//! shares a lineage id. Presenting a consumed refresh credential again is
//! treated as theft: the whole lineage is revoked.
//!
//! All state lives in one in-memory [`RefreshLedger`] per process.

pub mod authenticator;
pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod ledger;
pub mod revoker;
pub mod rotator;
pub mod service;

pub use authenticator::{Authenticated, Authenticator, bearer_token};
pub use claims::{Claims, CredentialKind};
pub use codec::{ClaimCodec, EncodedToken, inspect_unverified};
pub use config::{CredentialSettings, CredentialsConfig, parse_ttl};
pub use error::{CodecError, ConfigError, CredentialError};
pub use issuer::{Issuer, TokenPair};
pub use keys::{KeySet, SigningSecret, generate_id};
pub use ledger::{ConsumeOutcome, LineageRecord, RefreshLedger, RefreshState};
pub use revoker::Revoker;
pub use rotator::Rotator;
pub use service::CredentialService;
