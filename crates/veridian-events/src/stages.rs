//! Concrete protocol-stage notification types.
//!
//! Each endpoint goes through three stages: validating the incoming request,
//! handling the validated request, and applying the outgoing response. The
//! notification carries the state for its stage; handlers mutate it in place
//! and may short-circuit the rest of the chain.

use indexmap::IndexMap;
use serde_json::Value;

use crate::notification::Notification;

/// Parameters of a protocol response under construction.
///
/// Insertion order is preserved so handlers can rely on the order earlier
/// handlers produced.
pub type ResponseParameters = IndexMap<String, Value>;

/// A rejection recorded by a validation-stage handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRejection {
    /// Protocol error code (e.g. `invalid_request`).
    pub error: String,
    /// Optional human-readable description.
    pub description: Option<String>,
}

/// Validation stage of an incoming authorization request.
#[derive(Debug, Clone, Default)]
pub struct ValidateAuthorizationRequest {
    /// Client identifier from the request, if present.
    pub client_id: Option<String>,
    /// Redirect URI from the request, if present.
    pub redirect_uri: Option<String>,
    /// Scopes the client requested.
    pub requested_scopes: Vec<String>,
    /// Rejection recorded by a handler, if any.
    pub rejection: Option<StageRejection>,
}

impl ValidateAuthorizationRequest {
    /// Rejects the request with a protocol error code.
    pub fn reject(&mut self, error: impl Into<String>, description: Option<String>) {
        self.rejection = Some(StageRejection {
            error: error.into(),
            description,
        });
    }

    /// Returns `true` if a handler rejected the request.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

impl Notification for ValidateAuthorizationRequest {
    const STAGE: &'static str = "validate_authorization_request";
}

/// Handling stage of a validated authorization request.
#[derive(Debug, Clone, Default)]
pub struct HandleAuthorizationRequest {
    /// Client identifier of the validated request.
    pub client_id: Option<String>,
    /// Authenticated subject, once established.
    pub subject: Option<String>,
    /// Scopes granted so far.
    pub granted_scopes: Vec<String>,
}

impl Notification for HandleAuthorizationRequest {
    const STAGE: &'static str = "handle_authorization_request";
}

/// Apply stage of an outgoing authorization response.
///
/// Handlers see the response just before it leaves the server and may add,
/// rewrite, or remove parameters.
#[derive(Debug, Clone, Default)]
pub struct ApplyAuthorizationResponse {
    /// Response parameters under construction.
    pub response: ResponseParameters,
    /// Redirect URI the response will be returned to, if any.
    pub redirect_uri: Option<String>,
    /// Opaque state echoed back to the client, if any.
    pub state: Option<String>,
}

impl Notification for ApplyAuthorizationResponse {
    const STAGE: &'static str = "apply_authorization_response";
}

/// Validation stage of an incoming token request.
#[derive(Debug, Clone, Default)]
pub struct ValidateTokenRequest {
    /// Client identifier from the request, if present.
    pub client_id: Option<String>,
    /// Grant type from the request, if present.
    pub grant_type: Option<String>,
    /// Rejection recorded by a handler, if any.
    pub rejection: Option<StageRejection>,
}

impl ValidateTokenRequest {
    /// Rejects the request with a protocol error code.
    pub fn reject(&mut self, error: impl Into<String>, description: Option<String>) {
        self.rejection = Some(StageRejection {
            error: error.into(),
            description,
        });
    }

    /// Returns `true` if a handler rejected the request.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

impl Notification for ValidateTokenRequest {
    const STAGE: &'static str = "validate_token_request";
}

/// Handling stage of a validated token request.
#[derive(Debug, Clone, Default)]
pub struct HandleTokenRequest {
    /// Client identifier of the validated request.
    pub client_id: Option<String>,
    /// Authenticated subject, once established.
    pub subject: Option<String>,
    /// Scopes granted so far.
    pub granted_scopes: Vec<String>,
}

impl Notification for HandleTokenRequest {
    const STAGE: &'static str = "handle_token_request";
}

/// Apply stage of an outgoing token response.
#[derive(Debug, Clone, Default)]
pub struct ApplyTokenResponse {
    /// Response parameters under construction.
    pub response: ResponseParameters,
}

impl Notification for ApplyTokenResponse {
    const STAGE: &'static str = "apply_token_response";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels_are_distinct() {
        let stages = [
            ValidateAuthorizationRequest::STAGE,
            HandleAuthorizationRequest::STAGE,
            ApplyAuthorizationResponse::STAGE,
            ValidateTokenRequest::STAGE,
            HandleTokenRequest::STAGE,
            ApplyTokenResponse::STAGE,
        ];
        for (i, a) in stages.iter().enumerate() {
            for b in &stages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_reject_records_rejection() {
        let mut notification = ValidateTokenRequest::default();
        assert!(!notification.is_rejected());

        notification.reject("invalid_request", Some("missing grant_type".to_string()));
        assert!(notification.is_rejected());
        let rejection = notification.rejection.unwrap();
        assert_eq!(rejection.error, "invalid_request");
        assert_eq!(rejection.description.as_deref(), Some("missing grant_type"));
    }

    #[test]
    fn test_response_parameters_preserve_insertion_order() {
        let mut notification = ApplyTokenResponse::default();
        notification
            .response
            .insert("access_token".to_string(), Value::from("at-1"));
        notification
            .response
            .insert("token_type".to_string(), Value::from("Bearer"));
        notification
            .response
            .insert("expires_in".to_string(), Value::from(3600));

        let keys: Vec<&str> = notification.response.keys().map(String::as_str).collect();
        assert_eq!(keys, ["access_token", "token_type", "expires_in"]);
    }
}
