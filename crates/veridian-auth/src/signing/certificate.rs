//! Certificate-backed signing keys.
//!
//! The core's contract is "locator + password -> private key or failure",
//! independent of where certificates actually live. Resolution goes through
//! the narrow [`CertificateStore`] trait so deployments can plug in embedded
//! resources, a filesystem directory, or a key vault without touching the
//! loading logic.
//!
//! Certificate resources are PKCS#8 encrypted PEM. The private key is
//! decrypted with the supplied password and wrapped as a credential whose
//! algorithm is implied by the key type: RSA keys sign RS256, P-256 keys
//! ES256, P-384 keys ES384.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use p256::SecretKey as P256SecretKey;
use p384::SecretKey as P384SecretKey;
use rsa::RsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use tracing::debug;

use super::SigningError;
use super::algorithm::SigningAlgorithm;
use super::credential::SigningCredential;
use super::key::SigningKey;

/// Certificate resolution contract.
pub trait CertificateStore {
    /// Resolves the PEM body for a locator.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::CertificateNotFound` if no resource exists
    /// for the locator.
    fn resolve(&self, locator: &str) -> Result<String, SigningError>;
}

/// Certificate store over embedded in-memory resources.
#[derive(Debug, Clone, Default)]
pub struct MemoryCertificateStore {
    certificates: HashMap<String, String>,
}

impl MemoryCertificateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a PEM resource under a locator.
    pub fn insert(&mut self, locator: impl Into<String>, pem: impl Into<String>) {
        self.certificates.insert(locator.into(), pem.into());
    }
}

impl CertificateStore for MemoryCertificateStore {
    fn resolve(&self, locator: &str) -> Result<String, SigningError> {
        self.certificates
            .get(locator)
            .cloned()
            .ok_or_else(|| SigningError::certificate_not_found(locator))
    }
}

/// Certificate store over a filesystem directory.
///
/// The locator is interpreted as a path relative to the store root.
#[derive(Debug, Clone)]
pub struct DirCertificateStore {
    root: PathBuf,
}

impl DirCertificateStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CertificateStore for DirCertificateStore {
    fn resolve(&self, locator: &str) -> Result<String, SigningError> {
        fs::read_to_string(self.root.join(locator))
            .map_err(|_| SigningError::certificate_not_found(locator))
    }
}

/// Loads a signing credential from a password-protected certificate
/// resource.
///
/// # Errors
///
/// Returns `SigningError::CertificateNotFound` if the locator does not
/// resolve, and `SigningError::InvalidPassword` if the resource cannot be
/// decrypted with the password. Nothing is committed on failure.
pub fn load_certificate_key(
    store: &dyn CertificateStore,
    locator: &str,
    password: &str,
) -> Result<SigningCredential, SigningError> {
    let pem = store.resolve(locator)?;
    let (key, algorithm) =
        decrypt_private_key(&pem, password).ok_or_else(|| SigningError::invalid_password(locator))?;
    debug!(locator, algorithm = %algorithm, kid = key.kid(), "loaded certificate-backed signing key");
    SigningCredential::new(key, algorithm)
}

fn decrypt_private_key(pem: &str, password: &str) -> Option<(SigningKey, SigningAlgorithm)> {
    if let Ok(private_key) = RsaPrivateKey::from_pkcs8_encrypted_pem(pem, password) {
        let key = SigningKey::from_rsa_private_key(private_key).ok()?;
        return Some((key, SigningAlgorithm::RS256));
    }
    if let Ok(secret_key) = P256SecretKey::from_pkcs8_encrypted_pem(pem, password) {
        let key = SigningKey::from_p256_secret_key(secret_key).ok()?;
        return Some((key, SigningAlgorithm::ES256));
    }
    if let Ok(secret_key) = P384SecretKey::from_pkcs8_encrypted_pem(pem, password) {
        let key = SigningKey::from_p384_secret_key(secret_key).ok()?;
        return Some((key, SigningAlgorithm::ES384));
    }
    None
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};

    use super::*;
    use crate::signing::key::KeyCapabilities;

    const PASSWORD: &str = "correct horse battery staple";

    fn encrypted_p256_pem() -> String {
        let secret_key = P256SecretKey::random(&mut OsRng);
        secret_key
            .to_pkcs8_encrypted_pem(&mut OsRng, PASSWORD.as_bytes(), LineEnding::LF)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_missing_locator_fails_with_certificate_not_found() {
        let store = MemoryCertificateStore::new();
        let err = load_certificate_key(&store, "missing.pem", PASSWORD).unwrap_err();
        assert!(matches!(err, SigningError::CertificateNotFound { .. }));
    }

    #[test]
    fn test_correct_password_yields_certificate_derived_credential() {
        let mut store = MemoryCertificateStore::new();
        store.insert("signing.pem", encrypted_p256_pem());

        let credential = load_certificate_key(&store, "signing.pem", PASSWORD).unwrap();
        assert_eq!(credential.algorithm(), SigningAlgorithm::ES256);
        assert_eq!(credential.key().key_type(), "EC");
        assert!(credential.key().supports_algorithm(SigningAlgorithm::ES256));
    }

    #[test]
    fn test_wrong_password_fails_with_invalid_password() {
        let mut store = MemoryCertificateStore::new();
        store.insert("signing.pem", encrypted_p256_pem());

        let err = load_certificate_key(&store, "signing.pem", "wrong password").unwrap_err();
        assert!(matches!(err, SigningError::InvalidPassword { .. }));
    }

    #[test]
    fn test_dir_store_resolves_relative_locators() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("signing.pem"), encrypted_p256_pem()).unwrap();

        let store = DirCertificateStore::new(dir.path());
        let credential = load_certificate_key(&store, "signing.pem", PASSWORD).unwrap();
        assert_eq!(credential.algorithm(), SigningAlgorithm::ES256);

        let err = load_certificate_key(&store, "other.pem", PASSWORD).unwrap_err();
        assert!(matches!(err, SigningError::CertificateNotFound { .. }));
    }

    #[test]
    fn test_encrypted_rsa_certificate_implies_rs256() {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let pem = private_key
            .to_pkcs8_encrypted_pem(&mut OsRng, PASSWORD.as_bytes(), LineEnding::LF)
            .unwrap()
            .to_string();

        let mut store = MemoryCertificateStore::new();
        store.insert("rsa.pem", pem);

        let credential = load_certificate_key(&store, "rsa.pem", PASSWORD).unwrap();
        assert_eq!(credential.algorithm(), SigningAlgorithm::RS256);
        assert_eq!(credential.key().key_type(), "RSA");
    }
}
