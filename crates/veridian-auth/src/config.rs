//! Server configuration record.
//!
//! The record is the mutable aggregate assembled during the configuration
//! phase: signing credentials, grant types, scopes, claims, endpoint paths,
//! token lifetimes, feature flags, and the event-handler registry. After
//! the configuration phase it is treated as read-only and shared across
//! concurrent request processing.

use std::fmt;
use std::time::Duration;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use veridian_events::HandlerRegistry;

use crate::signing::{JwkSet, SigningAlgorithm, SigningCredential};

/// Kinds of protocol endpoints the server can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// Authorization endpoint.
    Authorization,
    /// Token endpoint.
    Token,
    /// Userinfo endpoint.
    Userinfo,
    /// Token introspection endpoint.
    Introspection,
    /// Token revocation endpoint.
    Revocation,
    /// Provider configuration (discovery) endpoint.
    Configuration,
    /// JSON Web Key Set endpoint.
    Jwks,
}

impl EndpointKind {
    /// Returns all endpoint kinds.
    #[must_use]
    pub fn all() -> &'static [EndpointKind] {
        &[
            Self::Authorization,
            Self::Token,
            Self::Userinfo,
            Self::Introspection,
            Self::Revocation,
            Self::Configuration,
            Self::Jwks,
        ]
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Userinfo => write!(f, "userinfo"),
            Self::Introspection => write!(f, "introspection"),
            Self::Revocation => write!(f, "revocation"),
            Self::Configuration => write!(f, "configuration"),
            Self::Jwks => write!(f, "jwks"),
        }
    }
}

/// Endpoint path configuration.
///
/// `None` means the endpoint was never set; the empty string is the
/// canonical "disabled" sentinel. Both are disabled; the distinction only
/// matters because enabling always requires an explicit non-empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Authorization endpoint path.
    pub authorization: Option<String>,
    /// Token endpoint path.
    pub token: Option<String>,
    /// Userinfo endpoint path.
    pub userinfo: Option<String>,
    /// Introspection endpoint path.
    pub introspection: Option<String>,
    /// Revocation endpoint path.
    pub revocation: Option<String>,
    /// Provider configuration endpoint path.
    pub configuration: Option<String>,
    /// JWKS endpoint path.
    pub jwks: Option<String>,
}

impl EndpointConfig {
    /// Returns the stored path for an endpoint kind, if set.
    #[must_use]
    pub fn get(&self, kind: EndpointKind) -> Option<&str> {
        self.slot(kind).as_deref()
    }

    /// Stores a path for an endpoint kind (last write wins).
    pub fn set(&mut self, kind: EndpointKind, path: String) {
        *self.slot_mut(kind) = Some(path);
    }

    /// Returns `true` if the endpoint has a non-empty path.
    #[must_use]
    pub fn is_enabled(&self, kind: EndpointKind) -> bool {
        self.get(kind).is_some_and(|path| !path.is_empty())
    }

    fn slot(&self, kind: EndpointKind) -> &Option<String> {
        match kind {
            EndpointKind::Authorization => &self.authorization,
            EndpointKind::Token => &self.token,
            EndpointKind::Userinfo => &self.userinfo,
            EndpointKind::Introspection => &self.introspection,
            EndpointKind::Revocation => &self.revocation,
            EndpointKind::Configuration => &self.configuration,
            EndpointKind::Jwks => &self.jwks,
        }
    }

    fn slot_mut(&mut self, kind: EndpointKind) -> &mut Option<String> {
        match kind {
            EndpointKind::Authorization => &mut self.authorization,
            EndpointKind::Token => &mut self.token,
            EndpointKind::Userinfo => &mut self.userinfo,
            EndpointKind::Introspection => &mut self.introspection,
            EndpointKind::Revocation => &mut self.revocation,
            EndpointKind::Configuration => &mut self.configuration,
            EndpointKind::Jwks => &mut self.jwks,
        }
    }
}

/// Token lifetime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenLifetimes {
    /// Authorization code lifetime.
    /// Codes should be short-lived for security.
    #[serde(with = "humantime_serde")]
    pub authorization_code: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token: Duration,

    /// Identity token lifetime.
    #[serde(with = "humantime_serde")]
    pub identity_token: Duration,

    /// Refresh token lifetime.
    /// Can be longer since refresh tokens require client authentication.
    #[serde(with = "humantime_serde")]
    pub refresh_token: Duration,

    /// Device code lifetime.
    #[serde(with = "humantime_serde")]
    pub device_code: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            authorization_code: Duration::from_secs(300), // 5 minutes
            access_token: Duration::from_secs(3600),      // 1 hour
            identity_token: Duration::from_secs(1200),    // 20 minutes
            refresh_token: Duration::from_secs(14 * 24 * 3600), // 14 days
            device_code: Duration::from_secs(300),        // 5 minutes
        }
    }
}

/// Boolean feature flags of the configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerFlags {
    /// Extend a refresh token's lifetime each time it is used.
    pub sliding_refresh_token_expiration: bool,

    /// Cache validated request payloads between pipeline stages.
    pub enable_request_caching: bool,

    /// Run without persisting issued tokens (degraded/stateless mode).
    pub disable_token_storage: bool,

    /// Skip scope validation against the registered scope set.
    pub disable_scope_validation: bool,

    /// Accept token requests from clients without credentials.
    pub accept_anonymous_clients: bool,
}

impl Default for ServerFlags {
    fn default() -> Self {
        Self {
            sliding_refresh_token_expiration: true,
            enable_request_caching: false,
            disable_token_storage: false,
            disable_scope_validation: false,
            accept_anonymous_clients: false,
        }
    }
}

/// Which access token handler issues tokens.
///
/// Only the selection lives here; the handler implementations are outside
/// this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTokenFormat {
    /// Self-contained signed JWT access tokens.
    #[default]
    Jwt,
    /// Opaque reference tokens resolved through introspection.
    Reference,
}

/// The server configuration record.
///
/// Created once per server instance at startup and mutated only through
/// the configuration store during the configuration phase. Set-valued
/// fields are idempotent-additive; scalar fields are last-write-wins; the
/// credential list is append-only in preference order.
#[derive(Debug, Clone, Default)]
pub struct ServerConfiguration {
    /// Ordered signing credentials; insertion order is preference order.
    pub signing_credentials: Vec<SigningCredential>,

    /// Allowed grant types.
    pub grant_types: IndexSet<String>,

    /// Registered scopes.
    pub scopes: IndexSet<String>,

    /// Registered claims.
    pub claims: IndexSet<String>,

    /// Endpoint paths.
    pub endpoints: EndpointConfig,

    /// Token lifetimes.
    pub lifetimes: TokenLifetimes,

    /// Feature flags.
    pub flags: ServerFlags,

    /// Selected access token handler.
    pub access_token_format: AccessTokenFormat,

    /// Event handler registry.
    pub handlers: HandlerRegistry,
}

impl ServerConfiguration {
    /// Creates a record with default settings and nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first registered credential declaring `algorithm`.
    ///
    /// First match wins: when several credentials could satisfy a request,
    /// registration order is preference order.
    #[must_use]
    pub fn credential_for(&self, algorithm: SigningAlgorithm) -> Option<&SigningCredential> {
        self.signing_credentials
            .iter()
            .find(|credential| credential.algorithm() == algorithm)
    }

    /// Returns the most-preferred credential, if any.
    #[must_use]
    pub fn default_credential(&self) -> Option<&SigningCredential> {
        self.signing_credentials.first()
    }

    /// Exports the public halves of all asymmetric credentials.
    #[must_use]
    pub fn jwks(&self) -> JwkSet {
        let mut set = JwkSet::new();
        for credential in &self.signing_credentials {
            if let Some(jwk) = credential.to_jwk() {
                set.add_key(jwk);
            }
        }
        set
    }
}
