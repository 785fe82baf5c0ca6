//! Crate-level error type for the configuration phase.

use veridian_events::EventsError;

use crate::signing::SigningError;

/// Errors raised while assembling the server configuration.
///
/// All variants represent programmer or deployment misconfiguration, not
/// transient conditions: they are raised synchronously, are fatal to the
/// configuration call that triggered them, and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A signing-credential operation failed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// An event-handler registration failed.
    #[error(transparent)]
    Events(#[from] EventsError),

    /// A configuration value is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a signing-credential error.
    #[must_use]
    pub fn is_signing_error(&self) -> bool {
        matches!(self, Self::Signing(_))
    }

    /// Returns `true` if this is an event-handler registration error.
    #[must_use]
    pub fn is_handler_error(&self) -> bool {
        matches!(self, Self::Events(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = AuthError::configuration("empty endpoint path");
        assert_eq!(err.to_string(), "Configuration error: empty endpoint path");
        assert!(!err.is_signing_error());
        assert!(!err.is_handler_error());
    }

    #[test]
    fn test_signing_error_is_transparent() {
        let err = AuthError::from(SigningError::unsupported_algorithm("PS256"));
        assert!(err.is_signing_error());
        assert_eq!(err.to_string(), "Unsupported signing algorithm: PS256");
    }

    #[test]
    fn test_events_error_is_transparent() {
        let err = AuthError::from(EventsError::invalid_handler_type(
            "Handler",
            "apply_token_response",
            "apply_authorization_response",
        ));
        assert!(err.is_handler_error());
    }
}
