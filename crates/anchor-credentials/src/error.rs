//! Error types for the credentials crate.

use thiserror::Error;

/// Precise failure causes raised by the claim codec.
///
/// These never leave the crate's public operations unchanged: the issuer,
/// rotator and authenticator collapse them into a [`CredentialError`] and only
/// log the precise cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The `exp` claim is in the past.
    #[error("credential has expired")]
    Expired,

    /// The HMAC signature does not match the secret for this kind.
    #[error("credential signature is invalid")]
    BadSignature,

    /// The `iss` claim does not match the configured issuer.
    #[error("credential issuer does not match")]
    IssuerMismatch,

    /// The `aud` claim does not match the configured audience.
    #[error("credential audience does not match")]
    AudienceMismatch,

    /// The token is not a well-formed compact JWS or lacks required claims.
    #[error("malformed credential: {0}")]
    Malformed(String),

    /// Signing failed while encoding.
    #[error("failed to sign credential: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => CodecError::Expired,
            ErrorKind::InvalidSignature => CodecError::BadSignature,
            ErrorKind::InvalidIssuer => CodecError::IssuerMismatch,
            ErrorKind::InvalidAudience => CodecError::AudienceMismatch,
            _ => CodecError::Malformed(err.to_string()),
        }
    }
}

/// Outcomes surfaced to callers of the issuer, rotator and authenticator.
///
/// Every variant except [`CredentialError::Signing`] maps to a generic
/// "unauthorized" response at the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Access credential is unusable (bad signature, expired, wrong issuer or
    /// audience, malformed).
    #[error("invalid credential")]
    InvalidCredential,

    /// A valid credential of the wrong kind was presented.
    #[error("wrong credential type")]
    WrongCredentialType,

    /// Refresh credential failed verification or is not a refresh credential.
    #[error("invalid refresh credential")]
    InvalidRefresh,

    /// Refresh credential is unknown, already consumed, or revoked.
    #[error("refresh credential reused or revoked")]
    ReusedOrRevokedRefresh,

    /// Signing failed. Indicates broken configuration, not bad input.
    #[error("failed to sign credential: {0}")]
    Signing(String),
}

impl CredentialError {
    /// Whether this outcome should be reported to the client as unauthorized.
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, CredentialError::Signing(_))
    }
}

/// Start-up configuration errors. Never produced at request time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required option is absent.
    #[error("missing required credentials option: {0}")]
    Missing(&'static str),

    /// A secret could not be found in the environment or on disk.
    #[error("{kind} secret not found (set ${env} or {kind}_secret_file)")]
    SecretNotFound { kind: &'static str, env: String },

    /// A secret resolved to an empty value.
    #[error("{0} secret is empty")]
    EmptySecret(&'static str),

    /// Access and refresh credentials must not share a secret.
    #[error("access and refresh secrets must differ")]
    SharedSecret,

    /// A duration option could not be parsed.
    #[error("invalid duration for {option}: {value:?} ({reason})")]
    InvalidDuration {
        option: &'static str,
        value: String,
        reason: String,
    },

    /// IO error (reading secret files).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
