//! Signing credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SigningError;
use super::algorithm::SigningAlgorithm;
use super::key::{Jwk, KeyCapabilities, SigningKey};

/// Intended usage of a credential's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    /// The key signs issued tokens.
    Signing,
}

impl KeyUse {
    /// JWK `use` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signing => "sig",
        }
    }
}

impl fmt::Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (key, algorithm) pair used to sign issued tokens.
///
/// Immutable once constructed. Credentials live on the configuration
/// record's ordered list for the server lifetime; there is no removal.
#[derive(Clone)]
pub struct SigningCredential {
    key: SigningKey,
    algorithm: SigningAlgorithm,
    key_use: KeyUse,
}

impl SigningCredential {
    /// Wraps a key and its declared signing algorithm as a credential.
    ///
    /// The key's capability set is queried before acceptance.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::IncompatibleKey` if the key does not support
    /// the declared algorithm.
    pub fn new(key: SigningKey, algorithm: SigningAlgorithm) -> Result<Self, SigningError> {
        if !key.supports_algorithm(algorithm) {
            return Err(SigningError::incompatible_key(key.key_type(), algorithm));
        }
        Ok(Self {
            key,
            algorithm,
            key_use: KeyUse::Signing,
        })
    }

    /// Generates an ephemeral credential for `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate(algorithm: SigningAlgorithm) -> Result<Self, SigningError> {
        Self::new(SigningKey::generate(algorithm)?, algorithm)
    }

    /// The wrapped key handle.
    #[must_use]
    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    /// The declared signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// The key usage (always signing).
    #[must_use]
    pub fn key_use(&self) -> KeyUse {
        self.key_use
    }

    /// Key ID of the wrapped key.
    #[must_use]
    pub fn kid(&self) -> &str {
        self.key.kid()
    }

    /// Exports the public half as a JWK; `None` for symmetric keys.
    #[must_use]
    pub fn to_jwk(&self) -> Option<Jwk> {
        self.key.to_jwk(self.algorithm)
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("kid", &self.kid())
            .field("algorithm", &self.algorithm)
            .field("key_use", &self.key_use)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_rs256_credential() {
        let credential = SigningCredential::generate(SigningAlgorithm::RS256).unwrap();
        assert_eq!(credential.algorithm(), SigningAlgorithm::RS256);
        assert_eq!(credential.algorithm().as_str(), "RS256");
        assert_eq!(credential.key_use(), KeyUse::Signing);
        assert!(!credential.kid().is_empty());
    }

    #[test]
    fn test_incompatible_key_is_rejected() {
        let ec_key = SigningKey::generate(SigningAlgorithm::ES256).unwrap();
        let err = SigningCredential::new(ec_key, SigningAlgorithm::RS256).unwrap_err();
        assert!(matches!(
            err,
            SigningError::IncompatibleKey {
                key_type: "EC",
                algorithm: SigningAlgorithm::RS256,
            }
        ));
    }

    #[test]
    fn test_imported_key_with_supported_algorithm() {
        let key = SigningKey::from_hmac_secret(b"a shared secret of reasonable size");
        let credential = SigningCredential::new(key, SigningAlgorithm::HS512).unwrap();
        assert_eq!(credential.algorithm(), SigningAlgorithm::HS512);
        assert!(credential.to_jwk().is_none());
    }

    #[test]
    fn test_credential_jwk_carries_kid_and_use() {
        let credential = SigningCredential::generate(SigningAlgorithm::ES384).unwrap();
        let jwk = credential.to_jwk().unwrap();
        assert_eq!(jwk.kid, credential.kid());
        assert_eq!(jwk.use_, "sig");
        assert_eq!(jwk.alg, "ES384");
    }
}
