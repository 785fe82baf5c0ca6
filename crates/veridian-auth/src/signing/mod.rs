//! Signing-credential assembly.
//!
//! Signing credentials reach the configuration record through three paths:
//! ephemeral in-process generation, import of externally supplied key
//! material, and password-protected certificate resources. Every path
//! validates the key's capability set against the declared algorithm before
//! the credential is accepted, so a mismatch fails configuration instead of
//! surfacing at token-signing time.

pub mod algorithm;
pub mod certificate;
pub mod credential;
pub mod key;

pub use algorithm::{AlgorithmFamily, SigningAlgorithm};
pub use certificate::{
    CertificateStore, DirCertificateStore, MemoryCertificateStore, load_certificate_key,
};
pub use credential::{KeyUse, SigningCredential};
pub use key::{Jwk, JwkSet, KeyCapabilities, SigningKey};

/// Errors that can occur while assembling signing credentials.
///
/// All variants are raised synchronously during the configuration phase and
/// are fatal to the call; cryptographic misconfiguration is never transient.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The requested algorithm has no generator in this server.
    #[error("Unsupported signing algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// The unsupported algorithm identifier.
        algorithm: String,
    },

    /// The supplied key does not support the declared algorithm.
    #[error("Incompatible key: {key_type} key cannot sign with {algorithm}")]
    IncompatibleKey {
        /// Key type of the rejected key.
        key_type: &'static str,
        /// The algorithm the key was paired with.
        algorithm: SigningAlgorithm,
    },

    /// No certificate resource exists for the locator.
    #[error("Certificate not found: {locator}")]
    CertificateNotFound {
        /// The locator that failed to resolve.
        locator: String,
    },

    /// The certificate resource could not be decrypted with the password.
    #[error("Invalid password for certificate: {locator}")]
    InvalidPassword {
        /// The locator of the certificate resource.
        locator: String,
    },

    /// Key material could not be generated or parsed.
    #[error("Key error: {message}")]
    Key {
        /// Description of the key error.
        message: String,
    },
}

impl SigningError {
    /// Creates a new `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }

    /// Creates a new `IncompatibleKey` error.
    #[must_use]
    pub fn incompatible_key(key_type: &'static str, algorithm: SigningAlgorithm) -> Self {
        Self::IncompatibleKey {
            key_type,
            algorithm,
        }
    }

    /// Creates a new `CertificateNotFound` error.
    #[must_use]
    pub fn certificate_not_found(locator: impl Into<String>) -> Self {
        Self::CertificateNotFound {
            locator: locator.into(),
        }
    }

    /// Creates a new `InvalidPassword` error.
    #[must_use]
    pub fn invalid_password(locator: impl Into<String>) -> Self {
        Self::InvalidPassword {
            locator: locator.into(),
        }
    }

    /// Creates a new `Key` error.
    #[must_use]
    pub fn key(message: impl Into<String>) -> Self {
        Self::Key {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a certificate-resource error.
    #[must_use]
    pub fn is_certificate_error(&self) -> bool {
        matches!(
            self,
            Self::CertificateNotFound { .. } | Self::InvalidPassword { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SigningError::unsupported_algorithm("EdDSA");
        assert_eq!(err.to_string(), "Unsupported signing algorithm: EdDSA");

        let err = SigningError::incompatible_key("EC", SigningAlgorithm::RS256);
        assert_eq!(
            err.to_string(),
            "Incompatible key: EC key cannot sign with RS256"
        );

        let err = SigningError::certificate_not_found("signing.pem");
        assert_eq!(err.to_string(), "Certificate not found: signing.pem");
    }

    #[test]
    fn test_certificate_error_predicate() {
        assert!(SigningError::certificate_not_found("a").is_certificate_error());
        assert!(SigningError::invalid_password("a").is_certificate_error());
        assert!(!SigningError::unsupported_algorithm("a").is_certificate_error());
        assert!(!SigningError::key("a").is_certificate_error());
    }
}
