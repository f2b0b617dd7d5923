//! Credential encoding and verification.
//!
//! Credentials are compact HS256 JWS tokens. Access and refresh credentials are
//! signed with independent secrets, so a leaked refresh secret cannot forge
//! access credentials and vice versa.

use crate::claims::{Claims, CredentialKind};
use crate::error::CodecError;
use crate::keys::KeySet;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// A freshly signed credential together with the claims it carries.
#[derive(Debug, Clone)]
pub struct EncodedToken {
    pub token: String,
    pub claims: Claims,
}

/// Stateless signer/verifier for claim sets.
#[derive(Debug, Clone)]
pub struct ClaimCodec {
    keys: KeySet,
    issuer: String,
    audience: String,
}

impl ClaimCodec {
    pub fn new(keys: KeySet, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Sign `claims` with the secret for `claims.kind`, stamping
    /// `iat = now` and `exp = now + ttl`.
    pub fn encode(&self, mut claims: Claims, ttl: Duration) -> Result<EncodedToken, CodecError> {
        let now = Utc::now();
        claims.iat = now.timestamp();
        claims.exp = (now + ttl).timestamp();

        let key = EncodingKey::from_secret(self.keys.secret_for(claims.kind).as_bytes());
        let token = jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &key)
            .map_err(|e| CodecError::Signing(e.to_string()))?;

        Ok(EncodedToken { token, claims })
    }

    /// Verify signature, expiry, issuer and audience against the secret for
    /// `kind`. Expiry is checked with zero leeway.
    ///
    /// This does not check `claims.kind`; callers decide what a kind mismatch
    /// means in their context.
    pub fn decode(&self, token: &str, kind: CredentialKind) -> Result<Claims, CodecError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let key = DecodingKey::from_secret(self.keys.secret_for(kind).as_bytes());
        let data = jsonwebtoken::decode::<Claims>(token.trim(), &key, &validation)?;
        Ok(data.claims)
    }
}

/// Read the claims of a token without verifying anything (for debugging).
pub fn inspect_unverified(token: &str) -> Result<Claims, CodecError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(&[]),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{SigningSecret, generate_id};

    fn codec() -> ClaimCodec {
        ClaimCodec::new(KeySet::generate(), "anchor", "anchor-api")
    }

    fn claims(kind: CredentialKind) -> Claims {
        Claims::new("app-1", "anchor", "anchor-api", generate_id(), kind)
    }

    #[test]
    fn test_encode_and_decode() {
        let codec = codec();
        let encoded = codec
            .encode(claims(CredentialKind::Access), Duration::minutes(15))
            .unwrap();

        let decoded = codec.decode(&encoded.token, CredentialKind::Access).unwrap();
        assert_eq!(decoded, encoded.claims);
        assert_eq!(decoded.sub, "app-1");
        assert_eq!(decoded.exp - decoded.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let encoded = codec
            .encode(claims(CredentialKind::Access), Duration::seconds(-1))
            .unwrap();

        let err = codec.decode(&encoded.token, CredentialKind::Access).unwrap_err();
        assert_eq!(err, CodecError::Expired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = codec();
        let encoded = codec
            .encode(claims(CredentialKind::Refresh), Duration::minutes(5))
            .unwrap();

        // Refresh tokens are signed with the refresh secret only.
        let err = codec.decode(&encoded.token, CredentialKind::Access).unwrap_err();
        assert_eq!(err, CodecError::BadSignature);
    }

    #[test]
    fn test_foreign_key_rejected() {
        let ours = codec();
        let theirs = codec();
        let encoded = theirs
            .encode(claims(CredentialKind::Access), Duration::minutes(5))
            .unwrap();

        let err = ours.decode(&encoded.token, CredentialKind::Access).unwrap_err();
        assert_eq!(err, CodecError::BadSignature);
    }

    #[test]
    fn test_issuer_and_audience_checked() {
        let keys = KeySet::new(
            SigningSecret::from("access-secret-for-codec-tests-000000"),
            SigningSecret::from("refresh-secret-for-codec-tests-00000"),
        )
        .unwrap();
        let codec = ClaimCodec::new(keys.clone(), "anchor", "anchor-api");

        let other_issuer = ClaimCodec::new(keys.clone(), "someone-else", "anchor-api");
        let mut wrong_iss = claims(CredentialKind::Access);
        wrong_iss.iss = "someone-else".to_string();
        let token = other_issuer.encode(wrong_iss, Duration::minutes(5)).unwrap().token;
        assert_eq!(
            codec.decode(&token, CredentialKind::Access).unwrap_err(),
            CodecError::IssuerMismatch
        );

        let mut wrong_aud = claims(CredentialKind::Access);
        wrong_aud.aud = "another-api".to_string();
        let token = codec.encode(wrong_aud, Duration::minutes(5)).unwrap().token;
        assert_eq!(
            codec.decode(&token, CredentialKind::Access).unwrap_err(),
            CodecError::AudienceMismatch
        );
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = codec();
        let err = codec.decode("not-a-token", CredentialKind::Access).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let encoded = codec
            .encode(claims(CredentialKind::Access), Duration::minutes(5))
            .unwrap();

        let mut forged = claims(CredentialKind::Access);
        forged.sub = "app-2".to_string();
        let forged_token = codec.encode(forged, Duration::minutes(5)).unwrap().token;

        // Splice the forged payload onto the original signature.
        let original: Vec<&str> = encoded.token.split('.').collect();
        let payload = forged_token.split('.').nth(1).unwrap();
        let spliced = format!("{}.{}.{}", original[0], payload, original[2]);

        let err = codec.decode(&spliced, CredentialKind::Access).unwrap_err();
        assert_eq!(err, CodecError::BadSignature);
    }

    #[test]
    fn test_inspect_unverified() {
        let codec = codec();
        let encoded = codec
            .encode(claims(CredentialKind::Refresh), Duration::seconds(-30))
            .unwrap();

        let inspected = inspect_unverified(&encoded.token).unwrap();
        assert_eq!(inspected.jti, encoded.claims.jti);
        assert!(inspected.is_refresh());
    }
}
