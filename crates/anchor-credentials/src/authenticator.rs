//! Access credential verification for protected operations.

use crate::claims::{Claims, CredentialKind};
use crate::codec::ClaimCodec;
use crate::error::CredentialError;
use std::sync::Arc;

/// The caller identity established by a valid access credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub subject: String,
    pub claims: Claims,
}

/// Guards protected operations. Never mutates any store.
pub struct Authenticator {
    codec: Arc<ClaimCodec>,
}

impl Authenticator {
    pub fn new(codec: Arc<ClaimCodec>) -> Self {
        Self { codec }
    }

    /// Verify an access credential and expose its subject.
    pub fn authenticate(&self, presented: &str) -> Result<Authenticated, CredentialError> {
        let claims = match self.codec.decode(presented, CredentialKind::Access) {
            Ok(claims) => claims,
            Err(e) => {
                // Refresh credentials are signed with the other secret, so they
                // only show up here as a signature failure.
                if self.codec.decode(presented, CredentialKind::Refresh).is_ok() {
                    tracing::debug!("refresh credential presented as access credential");
                    return Err(CredentialError::WrongCredentialType);
                }
                tracing::debug!(cause = %e, "access credential rejected");
                return Err(CredentialError::InvalidCredential);
            }
        };

        if !claims.is_access() {
            tracing::debug!(kind = %claims.kind, "non-access credential presented");
            return Err(CredentialError::WrongCredentialType);
        }

        Ok(Authenticated {
            subject: claims.sub.clone(),
            claims,
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let rest = header_value.strip_prefix("Bearer ")?;
    let token = rest.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::Issuer;
    use crate::keys::{KeySet, SigningSecret};
    use crate::ledger::RefreshLedger;
    use chrono::Duration;

    fn setup() -> (Authenticator, Issuer, Arc<ClaimCodec>) {
        let codec = Arc::new(ClaimCodec::new(KeySet::generate(), "anchor", "anchor-api"));
        let issuer = Issuer::new(
            codec.clone(),
            Arc::new(RefreshLedger::new()),
            Duration::minutes(15),
            Duration::days(7),
        );
        (Authenticator::new(codec.clone()), issuer, codec)
    }

    #[test]
    fn test_authenticate_access_token() {
        let (auth, issuer, _) = setup();
        let pair = issuer.issue("app-1").unwrap();

        let authenticated = auth.authenticate(&pair.access_token).unwrap();
        assert_eq!(authenticated.subject, "app-1");
        assert!(authenticated.claims.is_access());
    }

    #[test]
    fn test_refresh_token_is_wrong_type() {
        let (auth, issuer, _) = setup();
        let pair = issuer.issue("app-1").unwrap();

        assert_eq!(
            auth.authenticate(&pair.refresh_token),
            Err(CredentialError::WrongCredentialType)
        );
    }

    #[test]
    fn test_expired_access_token_is_invalid() {
        let (auth, _, codec) = setup();
        let claims = Claims::new("app-1", "anchor", "anchor-api", "id-1", CredentialKind::Access);
        let token = codec.encode(claims, Duration::seconds(-1)).unwrap().token;

        assert_eq!(
            auth.authenticate(&token),
            Err(CredentialError::InvalidCredential)
        );
    }

    #[test]
    fn test_refresh_kind_under_access_secret_is_wrong_type() {
        let access = SigningSecret::from("access-secret-for-authenticator-tests");
        let refresh = SigningSecret::from("refresh-secret-for-authenticator-test");
        let codec = Arc::new(ClaimCodec::new(
            KeySet::new(access.clone(), refresh.clone()).unwrap(),
            "anchor",
            "anchor-api",
        ));
        let auth = Authenticator::new(codec);

        // Swapped secrets: a refresh-kind claim set signed with the access secret.
        let swapped = ClaimCodec::new(KeySet::new(refresh, access).unwrap(), "anchor", "anchor-api");
        let token = swapped
            .encode(
                Claims::new("app-1", "anchor", "anchor-api", "id-1", CredentialKind::Refresh),
                Duration::minutes(5),
            )
            .unwrap()
            .token;

        assert_eq!(
            auth.authenticate(&token),
            Err(CredentialError::WrongCredentialType)
        );
    }

    #[test]
    fn test_foreign_token_is_invalid() {
        let (auth, _, _) = setup();
        let codec = ClaimCodec::new(KeySet::generate(), "anchor", "anchor-api");
        let foreign = codec
            .encode(
                Claims::new("app-1", "anchor", "anchor-api", "id-1", CredentialKind::Access),
                Duration::minutes(5),
            )
            .unwrap()
            .token;

        // Signed by a different deployment entirely.
        assert_eq!(
            auth.authenticate(&foreign),
            Err(CredentialError::InvalidCredential)
        );
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    }
}
