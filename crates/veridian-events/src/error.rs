//! Event pipeline error types.

/// Errors that can occur while assembling the event pipeline.
///
/// All variants are raised synchronously at registration time, during the
/// configuration phase. None are deferred to dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventsError {
    /// A type-based handler was registered for a notification type it does
    /// not handle.
    #[error("Invalid handler type {handler}: handles '{declared}', registered for '{expected}'")]
    InvalidHandlerType {
        /// Name of the offending handler type.
        handler: &'static str,
        /// Stage of the notification type the registration targeted.
        expected: &'static str,
        /// Stage of the notification type the handler actually handles.
        declared: &'static str,
    },
}

impl EventsError {
    /// Creates a new `InvalidHandlerType` error.
    #[must_use]
    pub fn invalid_handler_type(
        handler: &'static str,
        expected: &'static str,
        declared: &'static str,
    ) -> Self {
        Self::InvalidHandlerType {
            handler,
            expected,
            declared,
        }
    }

    /// Returns the name of the handler type that failed registration.
    #[must_use]
    pub fn handler(&self) -> &'static str {
        match self {
            Self::InvalidHandlerType { handler, .. } => handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handler_type_display() {
        let err = EventsError::invalid_handler_type(
            "my_crate::AuditHandler",
            "apply_authorization_response",
            "apply_token_response",
        );
        assert_eq!(
            err.to_string(),
            "Invalid handler type my_crate::AuditHandler: handles 'apply_token_response', \
             registered for 'apply_authorization_response'"
        );
        assert_eq!(err.handler(), "my_crate::AuditHandler");
    }
}
