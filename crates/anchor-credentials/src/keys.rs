//! Signing secrets and random identifiers.

use crate::claims::CredentialKind;
use crate::error::ConfigError;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use std::fmt;
use std::path::Path;

/// Bytes of entropy in generated secrets and credential ids.
pub const RANDOM_BYTES: usize = 32;

/// Fill a fresh buffer from the thread-local CSPRNG and encode it as
/// unpadded URL-safe base64.
fn random_token() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; RANDOM_BYTES];
    rng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a unique credential or lineage id.
pub fn generate_id() -> String {
    random_token()
}

/// A symmetric HMAC signing secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([redacted; {} bytes])", self.bytes.len())
    }
}

impl SigningSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        Self::from(random_token())
    }

    /// Use raw bytes as a secret.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Load a secret from a file, trimming surrounding whitespace.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from(raw.trim()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The secret as text, for writing generated secrets out.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<&str> for SigningSecret {
    fn from(value: &str) -> Self {
        Self::from_bytes(value.as_bytes())
    }
}

impl From<String> for SigningSecret {
    fn from(value: String) -> Self {
        Self::from_bytes(value.into_bytes())
    }
}

/// The pair of independent secrets used for access and refresh credentials.
#[derive(Debug, Clone)]
pub struct KeySet {
    access: SigningSecret,
    refresh: SigningSecret,
}

impl KeySet {
    /// Build a key set, rejecting empty or shared secrets.
    pub fn new(access: SigningSecret, refresh: SigningSecret) -> Result<Self, ConfigError> {
        if access.is_empty() {
            return Err(ConfigError::EmptySecret("access"));
        }
        if refresh.is_empty() {
            return Err(ConfigError::EmptySecret("refresh"));
        }
        if access == refresh {
            return Err(ConfigError::SharedSecret);
        }
        for (kind, secret) in [("access", &access), ("refresh", &refresh)] {
            if secret.len() < RANDOM_BYTES {
                tracing::warn!(
                    kind,
                    len = secret.len(),
                    "signing secret is shorter than {} bytes",
                    RANDOM_BYTES
                );
            }
        }
        Ok(Self { access, refresh })
    }

    /// Generate a fresh random key set.
    pub fn generate() -> Self {
        Self {
            access: SigningSecret::generate(),
            refresh: SigningSecret::generate(),
        }
    }

    /// The secret that signs credentials of `kind`.
    pub fn secret_for(&self, kind: CredentialKind) -> &SigningSecret {
        match kind {
            CredentialKind::Access => &self.access,
            CredentialKind::Refresh => &self.refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_generated_ids_are_unique_and_fixed_length() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.len() == 43));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SigningSecret::from("super-secret-value");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_secret_file_load() {
        let secret = SigningSecret::generate();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", secret.to_text()).unwrap();

        let loaded = SigningSecret::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, secret);
    }

    #[test]
    fn test_keyset_rejects_shared_secret() {
        let secret = SigningSecret::generate();
        let err = KeySet::new(secret.clone(), secret).unwrap_err();
        assert!(matches!(err, ConfigError::SharedSecret));
    }

    #[test]
    fn test_keyset_rejects_empty_secret() {
        let err = KeySet::new(SigningSecret::from(""), SigningSecret::generate()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySecret("access")));
    }

    #[test]
    fn test_keyset_selects_by_kind() {
        let access = SigningSecret::generate();
        let refresh = SigningSecret::generate();
        let keys = KeySet::new(access.clone(), refresh.clone()).unwrap();

        assert_eq!(keys.secret_for(CredentialKind::Access), &access);
        assert_eq!(keys.secret_for(CredentialKind::Refresh), &refresh);
    }
}
