//! Signing algorithm identifiers.

use std::fmt;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use super::SigningError;

/// Supported token signing algorithms.
///
/// Identifiers follow the standard JOSE names shared with the broader
/// OIDC ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
    /// RSA with SHA-256 (widely compatible, the default).
    RS256,
    /// RSA with SHA-384.
    RS384,
    /// RSA with SHA-512.
    RS512,
    /// ECDSA with P-256 curve.
    ES256,
    /// ECDSA with P-384 curve.
    ES384,
}

/// Algorithm families, each backed by its own key generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Symmetric HMAC secrets.
    Hmac,
    /// RSA key pairs.
    Rsa,
    /// ECDSA key pairs.
    Ecdsa,
}

impl SigningAlgorithm {
    /// Returns the algorithm name as used in JWK/JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
        }
    }

    /// Returns the algorithm family.
    #[must_use]
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => AlgorithmFamily::Hmac,
            Self::RS256 | Self::RS384 | Self::RS512 => AlgorithmFamily::Rsa,
            Self::ES256 | Self::ES384 => AlgorithmFamily::Ecdsa,
        }
    }

    /// Returns `true` if the algorithm uses a symmetric secret.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.family() == AlgorithmFamily::Hmac
    }

    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::ES256 => Algorithm::ES256,
            Self::ES384 => Algorithm::ES384,
        }
    }

    /// Parses a JOSE algorithm identifier.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::UnsupportedAlgorithm` for identifiers this
    /// server has no generator for (e.g. `PS256`, `EdDSA`).
    pub fn parse(value: &str) -> Result<Self, SigningError> {
        match value {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            other => Err(SigningError::unsupported_algorithm(other)),
        }
    }

    /// Returns all supported algorithms.
    #[must_use]
    pub fn all() -> &'static [SigningAlgorithm] {
        &[
            Self::HS256,
            Self::HS384,
            Self::HS512,
            Self::RS256,
            Self::RS384,
            Self::RS512,
            Self::ES256,
            Self::ES384,
        ]
    }
}

impl Default for SigningAlgorithm {
    /// The default signing algorithm when none is specified.
    fn default() -> Self {
        Self::RS256
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac => write!(f, "HMAC"),
            Self::Rsa => write!(f, "RSA"),
            Self::Ecdsa => write!(f, "ECDSA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rs256() {
        assert_eq!(SigningAlgorithm::default(), SigningAlgorithm::RS256);
    }

    #[test]
    fn test_parse_roundtrip() {
        for algorithm in SigningAlgorithm::all() {
            assert_eq!(SigningAlgorithm::parse(algorithm.as_str()).unwrap(), *algorithm);
        }
    }

    #[test]
    fn test_parse_unsupported_algorithm() {
        for identifier in ["PS256", "EdDSA", "none", ""] {
            let err = SigningAlgorithm::parse(identifier).unwrap_err();
            assert!(matches!(err, SigningError::UnsupportedAlgorithm { .. }));
        }
    }

    #[test]
    fn test_family_classification() {
        assert_eq!(SigningAlgorithm::HS384.family(), AlgorithmFamily::Hmac);
        assert_eq!(SigningAlgorithm::RS512.family(), AlgorithmFamily::Rsa);
        assert_eq!(SigningAlgorithm::ES256.family(), AlgorithmFamily::Ecdsa);

        assert!(SigningAlgorithm::HS256.is_symmetric());
        assert!(!SigningAlgorithm::RS256.is_symmetric());
        assert!(!SigningAlgorithm::ES384.is_symmetric());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(SigningAlgorithm::ES384.to_string(), "ES384");
        assert_eq!(AlgorithmFamily::Ecdsa.to_string(), "ECDSA");
    }
}
