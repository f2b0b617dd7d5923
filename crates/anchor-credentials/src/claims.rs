//! Claim sets carried inside access and refresh credentials.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which secret signs a credential and what it may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// Short-lived credential for protected operations.
    Access,
    /// Single-use credential exchangeable for a new pair.
    Refresh,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Access => "access",
            CredentialKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed claim set.
///
/// Field names follow the registered JWT claim names so the token is a
/// standard compact JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the client identity the credential was minted for).
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Unique credential id.
    pub jti: String,

    /// Credential kind.
    pub kind: CredentialKind,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Create an unsigned claim set. `iat` and `exp` are filled in by the codec.
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        id: impl Into<String>,
        kind: CredentialKind,
    ) -> Self {
        Self {
            sub: subject.into(),
            iss: issuer.into(),
            aud: audience.into(),
            jti: id.into(),
            kind,
            iat: 0,
            exp: 0,
        }
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Issued-at as a timestamp.
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_access(&self) -> bool {
        self.kind == CredentialKind::Access
    }

    pub fn is_refresh(&self) -> bool {
        self.kind == CredentialKind::Refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        let claims = Claims::new("app-1", "anchor", "anchor-api", "abc", CredentialKind::Refresh);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["kind"], "refresh");
        assert_eq!(json["sub"], "app-1");
    }

    #[test]
    fn test_timestamps() {
        let mut claims = Claims::new("app-1", "anchor", "anchor-api", "abc", CredentialKind::Access);
        claims.iat = 1_700_000_000;
        claims.exp = 1_700_000_900;

        assert_eq!(claims.issued_at().timestamp(), 1_700_000_000);
        assert_eq!((claims.expires_at() - claims.issued_at()).num_minutes(), 15);
        assert!(claims.is_access());
        assert!(!claims.is_refresh());
    }
}
