//! Signing key material.
//!
//! A [`SigningKey`] is the opaque key handle a credential wraps. Keys come
//! from ephemeral in-process generation or from externally supplied
//! material, and answer the capability query that gates credential
//! construction: whether the key can sign with a given algorithm.
//!
//! RSA and ECDSA keys are generated with the RustCrypto stack and handed to
//! `jsonwebtoken` as PEM; HMAC secrets are random bytes. Ephemeral keys are
//! never persisted and live only for the process lifetime.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::EncodingKey;
use p256::SecretKey as P256SecretKey;
use p256::ecdsa::SigningKey as P256SigningKey;
use p384::SecretKey as P384SecretKey;
use p384::ecdsa::SigningKey as P384SigningKey;
use rand::RngCore;
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::algorithm::{AlgorithmFamily, SigningAlgorithm};
use super::SigningError;

/// Bit size for generated RSA keys.
const RSA_KEY_BITS: usize = 2048;

/// Byte length of generated HMAC secrets.
const HMAC_SECRET_LEN: usize = 64;

// ============================================================================
// Capability query
// ============================================================================

/// Capability-query contract implemented by key objects.
///
/// A credential is only accepted when its key answers `true` for the
/// declared signing algorithm.
pub trait KeyCapabilities {
    /// Returns `true` if the key can sign with `algorithm`.
    fn supports_algorithm(&self, algorithm: SigningAlgorithm) -> bool;
}

// ============================================================================
// Key material
// ============================================================================

/// Internal representation of key material.
///
/// Asymmetric variants carry the public components needed for JWK export.
#[derive(Clone)]
enum KeyMaterial {
    Rsa {
        encoding_key: EncodingKey,
        n: Vec<u8>,
        e: Vec<u8>,
    },
    EcP256 {
        encoding_key: EncodingKey,
        x: Vec<u8>,
        y: Vec<u8>,
    },
    EcP384 {
        encoding_key: EncodingKey,
        x: Vec<u8>,
        y: Vec<u8>,
    },
    Hmac {
        encoding_key: EncodingKey,
    },
}

/// An opaque signing key handle.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    material: KeyMaterial,
    created_at: OffsetDateTime,
}

impl SigningKey {
    fn new(material: KeyMaterial) -> Self {
        Self {
            kid: uuid::Uuid::new_v4().to_string(),
            material,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Generates a fresh ephemeral key for `algorithm`.
    ///
    /// RSA and ECDSA families produce asymmetric key pairs; the HMAC family
    /// produces a random symmetric secret. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate(algorithm: SigningAlgorithm) -> Result<Self, SigningError> {
        match algorithm {
            SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512 => {
                let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
                    .map_err(|e| SigningError::key(e.to_string()))?;
                Self::from_rsa_private_key(private_key)
            }
            SigningAlgorithm::ES256 => Self::from_p256_secret_key(P256SecretKey::random(&mut OsRng)),
            SigningAlgorithm::ES384 => Self::from_p384_secret_key(P384SecretKey::random(&mut OsRng)),
            SigningAlgorithm::HS256 | SigningAlgorithm::HS384 | SigningAlgorithm::HS512 => {
                let mut secret = [0u8; HMAC_SECRET_LEN];
                OsRng.fill_bytes(&mut secret);
                Ok(Self::from_hmac_secret(&secret))
            }
        }
    }

    /// Imports an RSA private key from PKCS#8 PEM.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM data is invalid.
    pub fn from_rsa_pem(private_pem: &str) -> Result<Self, SigningError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem)
            .map_err(|e| SigningError::key(e.to_string()))?;
        Self::from_rsa_private_key(private_key)
    }

    /// Imports an EC private key (P-256 or P-384) from PKCS#8 PEM.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM data is not a P-256 or P-384 key.
    pub fn from_ec_pem(private_pem: &str) -> Result<Self, SigningError> {
        if let Ok(secret_key) = P256SecretKey::from_pkcs8_pem(private_pem) {
            return Self::from_p256_secret_key(secret_key);
        }
        if let Ok(secret_key) = P384SecretKey::from_pkcs8_pem(private_pem) {
            return Self::from_p384_secret_key(secret_key);
        }
        Err(SigningError::key("not a P-256 or P-384 PKCS#8 private key"))
    }

    /// Wraps an HMAC secret as a signing key.
    #[must_use]
    pub fn from_hmac_secret(secret: &[u8]) -> Self {
        Self::new(KeyMaterial::Hmac {
            encoding_key: EncodingKey::from_secret(secret),
        })
    }

    pub(crate) fn from_rsa_private_key(private_key: RsaPrivateKey) -> Result<Self, SigningError> {
        let public_key = private_key.to_public_key();
        let n = public_key.n().to_bytes_be();
        let e = public_key.e().to_bytes_be();

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SigningError::key(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| SigningError::key(e.to_string()))?;

        Ok(Self::new(KeyMaterial::Rsa { encoding_key, n, e }))
    }

    pub(crate) fn from_p256_secret_key(secret_key: P256SecretKey) -> Result<Self, SigningError> {
        let signing_key = P256SigningKey::from(&secret_key);
        let point = signing_key.verifying_key().to_encoded_point(false);
        let x = point
            .x()
            .ok_or_else(|| SigningError::key("missing x coordinate"))?
            .to_vec();
        let y = point
            .y()
            .ok_or_else(|| SigningError::key("missing y coordinate"))?
            .to_vec();

        let private_pem = secret_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SigningError::key(e.to_string()))?;
        let encoding_key = EncodingKey::from_ec_pem(private_pem.as_bytes())
            .map_err(|e| SigningError::key(e.to_string()))?;

        Ok(Self::new(KeyMaterial::EcP256 { encoding_key, x, y }))
    }

    pub(crate) fn from_p384_secret_key(secret_key: P384SecretKey) -> Result<Self, SigningError> {
        let signing_key = P384SigningKey::from(&secret_key);
        let point = signing_key.verifying_key().to_encoded_point(false);
        let x = point
            .x()
            .ok_or_else(|| SigningError::key("missing x coordinate"))?
            .to_vec();
        let y = point
            .y()
            .ok_or_else(|| SigningError::key("missing y coordinate"))?
            .to_vec();

        let private_pem = secret_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SigningError::key(e.to_string()))?;
        let encoding_key = EncodingKey::from_ec_pem(private_pem.as_bytes())
            .map_err(|e| SigningError::key(e.to_string()))?;

        Ok(Self::new(KeyMaterial::EcP384 { encoding_key, x, y }))
    }

    /// Key ID (random UUID assigned at creation).
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// When the key was created.
    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// JWK key type of this key ("RSA", "EC", or "oct").
    #[must_use]
    pub fn key_type(&self) -> &'static str {
        match &self.material {
            KeyMaterial::Rsa { .. } => "RSA",
            KeyMaterial::EcP256 { .. } | KeyMaterial::EcP384 { .. } => "EC",
            KeyMaterial::Hmac { .. } => "oct",
        }
    }

    /// Returns `true` for RSA and ECDSA keys.
    #[must_use]
    pub fn is_asymmetric(&self) -> bool {
        !matches!(self.material, KeyMaterial::Hmac { .. })
    }

    /// The encoding key handed to the token serialization layer.
    #[must_use]
    pub fn encoding_key(&self) -> &EncodingKey {
        match &self.material {
            KeyMaterial::Rsa { encoding_key, .. }
            | KeyMaterial::EcP256 { encoding_key, .. }
            | KeyMaterial::EcP384 { encoding_key, .. }
            | KeyMaterial::Hmac { encoding_key } => encoding_key,
        }
    }

    /// Exports the public key as a JWK.
    ///
    /// Returns `None` for symmetric keys, which are never published.
    #[must_use]
    pub fn to_jwk(&self, algorithm: SigningAlgorithm) -> Option<Jwk> {
        match &self.material {
            KeyMaterial::Rsa { n, e, .. } => Some(Jwk {
                kty: "RSA".to_string(),
                kid: self.kid.clone(),
                use_: "sig".to_string(),
                alg: algorithm.as_str().to_string(),
                n: Some(URL_SAFE_NO_PAD.encode(n)),
                e: Some(URL_SAFE_NO_PAD.encode(e)),
                crv: None,
                x: None,
                y: None,
            }),
            KeyMaterial::EcP256 { x, y, .. } => Some(Self::ec_jwk(
                self.kid.clone(),
                algorithm,
                "P-256",
                x,
                y,
            )),
            KeyMaterial::EcP384 { x, y, .. } => Some(Self::ec_jwk(
                self.kid.clone(),
                algorithm,
                "P-384",
                x,
                y,
            )),
            KeyMaterial::Hmac { .. } => None,
        }
    }

    fn ec_jwk(kid: String, algorithm: SigningAlgorithm, crv: &str, x: &[u8], y: &[u8]) -> Jwk {
        Jwk {
            kty: "EC".to_string(),
            kid,
            use_: "sig".to_string(),
            alg: algorithm.as_str().to_string(),
            n: None,
            e: None,
            crv: Some(crv.to_string()),
            x: Some(URL_SAFE_NO_PAD.encode(x)),
            y: Some(URL_SAFE_NO_PAD.encode(y)),
        }
    }
}

impl KeyCapabilities for SigningKey {
    fn supports_algorithm(&self, algorithm: SigningAlgorithm) -> bool {
        match &self.material {
            // An RSA key pair signs with any RSA digest size.
            KeyMaterial::Rsa { .. } => algorithm.family() == AlgorithmFamily::Rsa,
            // EC keys are curve-bound to exactly one algorithm.
            KeyMaterial::EcP256 { .. } => algorithm == SigningAlgorithm::ES256,
            KeyMaterial::EcP384 { .. } => algorithm == SigningAlgorithm::ES384,
            // A MAC secret is not digest-bound.
            KeyMaterial::Hmac { .. } => algorithm.family() == AlgorithmFamily::Hmac,
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("key_type", &self.key_type())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// JWKS types
// ============================================================================

/// JSON Web Key Set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwkSet {
    /// The keys in this set.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Creates a new empty key set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key to the set.
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }
}

/// JSON Web Key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" or "EC").
    pub kty: String,

    /// Key ID.
    pub kid: String,

    /// Key use ("sig" for signing).
    #[serde(rename = "use")]
    pub use_: String,

    /// Algorithm.
    pub alg: String,

    // RSA-specific fields
    /// RSA modulus (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    // EC-specific fields
    /// EC curve name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// EC x coordinate (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// EC y coordinate (base64url encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}
