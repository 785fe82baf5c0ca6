//! Fluent configuration builder.
//!
//! The builder is a thin mutator over the configuration store: each call
//! validates or constructs a value, then commits it through the store's
//! read-modify-write contract so the latest committed record is always the
//! one mutated. The builder never holds the record directly.
//!
//! Fallible steps (credential assembly, deferred handler registration,
//! endpoint enabling) commit nothing on failure; callers are expected to
//! halt startup on any error instead of recovering.

use std::time::Duration;

use tracing::info;

use crate::config::{AccessTokenFormat, EndpointKind, ServerConfiguration, TokenLifetimes};
use crate::error::AuthError;
use crate::signing::{
    CertificateStore, SigningAlgorithm, SigningCredential, SigningKey, load_certificate_key,
};
use crate::store::ConfigStore;
use crate::AuthResult;

use veridian_events::{EventHandler, HandlerType, Notification};

/// Fluent façade over the configuration store.
///
/// ```ignore
/// let store = InMemoryConfigStore::new();
/// ServerBuilder::new(store.clone())
///     .add_ephemeral_signing_key(SigningAlgorithm::RS256)?
///     .allow_grant_type("authorization_code")
///     .set_endpoint(EndpointKind::Token, "/connect/token")?;
/// ```
#[derive(Debug)]
pub struct ServerBuilder<S: ConfigStore> {
    store: S,
}

impl<S: ConfigStore> ServerBuilder<S> {
    /// Creates a builder over `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ==========================================================================
    // Signing credentials
    // ==========================================================================

    /// Appends an already-assembled signing credential.
    #[must_use]
    pub fn add_signing_credential(self, credential: SigningCredential) -> Self {
        info!(kid = credential.kid(), algorithm = %credential.algorithm(), "adding signing credential");
        self.store.update(|configuration| {
            configuration.signing_credentials.push(credential);
        });
        self
    }

    /// Generates an ephemeral signing key for `algorithm` and appends it.
    ///
    /// The key exists only for the process lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails for the algorithm.
    pub fn add_ephemeral_signing_key(self, algorithm: SigningAlgorithm) -> AuthResult<Self> {
        let credential = SigningCredential::generate(algorithm)?;
        Ok(self.add_signing_credential(credential))
    }

    /// Generates an ephemeral signing key for the default algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn add_default_signing_key(self) -> AuthResult<Self> {
        self.add_ephemeral_signing_key(SigningAlgorithm::default())
    }

    /// Imports an externally supplied key for `algorithm` and appends it.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::IncompatibleKey` if the key does not declare
    /// support for `algorithm`; the credential list is unchanged.
    pub fn add_signing_key(self, key: SigningKey, algorithm: SigningAlgorithm) -> AuthResult<Self> {
        let credential = SigningCredential::new(key, algorithm)?;
        Ok(self.add_signing_credential(credential))
    }

    /// Loads a password-protected certificate resource and appends the
    /// resulting credential.
    ///
    /// # Errors
    ///
    /// Returns `SigningError::CertificateNotFound` if the locator does not
    /// resolve and `SigningError::InvalidPassword` if decryption fails; the
    /// credential list is unchanged in both cases.
    pub fn add_certificate_signing_key(
        self,
        certificates: &dyn CertificateStore,
        locator: &str,
        password: &str,
    ) -> AuthResult<Self> {
        let credential = load_certificate_key(certificates, locator, password)?;
        Ok(self.add_signing_credential(credential))
    }

    // ==========================================================================
    // Grant types, scopes, claims
    // ==========================================================================

    /// Allows a grant type. Registering the same grant type twice keeps a
    /// single entry.
    #[must_use]
    pub fn allow_grant_type(self, grant_type: impl Into<String>) -> Self {
        let grant_type = grant_type.into();
        self.store.update(|configuration| {
            configuration.grant_types.insert(grant_type);
        });
        self
    }

    /// Registers scopes. Duplicates are ignored.
    #[must_use]
    pub fn register_scopes<I, T>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        self.store.update(|configuration| {
            configuration.scopes.extend(scopes);
        });
        self
    }

    /// Registers claims. Duplicates are ignored.
    #[must_use]
    pub fn register_claims<I, T>(self, claims: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let claims: Vec<String> = claims.into_iter().map(Into::into).collect();
        self.store.update(|configuration| {
            configuration.claims.extend(claims);
        });
        self
    }

    // ==========================================================================
    // Endpoints
    // ==========================================================================

    /// Enables an endpoint at `path` (last write wins).
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty path; disabling goes
    /// through [`disable_endpoint`](Self::disable_endpoint) instead.
    pub fn set_endpoint(self, kind: EndpointKind, path: impl Into<String>) -> AuthResult<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(AuthError::configuration(format!(
                "endpoint '{kind}' requires a non-empty path; use disable_endpoint to disable it"
            )));
        }
        self.store.update(|configuration| {
            configuration.endpoints.set(kind, path);
        });
        Ok(self)
    }

    /// Disables an endpoint by storing the empty-path sentinel.
    #[must_use]
    pub fn disable_endpoint(self, kind: EndpointKind) -> Self {
        self.store.update(|configuration| {
            configuration.endpoints.set(kind, String::new());
        });
        self
    }

    // ==========================================================================
    // Lifetimes, flags, token format
    // ==========================================================================

    /// Replaces all token lifetimes at once.
    #[must_use]
    pub fn set_token_lifetimes(self, lifetimes: TokenLifetimes) -> Self {
        self.store.update(|configuration| {
            configuration.lifetimes = lifetimes;
        });
        self
    }

    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn set_authorization_code_lifetime(self, lifetime: Duration) -> Self {
        self.store.update(|configuration| {
            configuration.lifetimes.authorization_code = lifetime;
        });
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn set_access_token_lifetime(self, lifetime: Duration) -> Self {
        self.store.update(|configuration| {
            configuration.lifetimes.access_token = lifetime;
        });
        self
    }

    /// Sets the identity token lifetime.
    #[must_use]
    pub fn set_identity_token_lifetime(self, lifetime: Duration) -> Self {
        self.store.update(|configuration| {
            configuration.lifetimes.identity_token = lifetime;
        });
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn set_refresh_token_lifetime(self, lifetime: Duration) -> Self {
        self.store.update(|configuration| {
            configuration.lifetimes.refresh_token = lifetime;
        });
        self
    }

    /// Sets the device code lifetime.
    #[must_use]
    pub fn set_device_code_lifetime(self, lifetime: Duration) -> Self {
        self.store.update(|configuration| {
            configuration.lifetimes.device_code = lifetime;
        });
        self
    }

    /// Enables or disables sliding refresh token expiration.
    #[must_use]
    pub fn use_sliding_refresh_token_expiration(self, enabled: bool) -> Self {
        self.store.update(|configuration| {
            configuration.flags.sliding_refresh_token_expiration = enabled;
        });
        self
    }

    /// Caches validated request payloads between pipeline stages.
    #[must_use]
    pub fn enable_request_caching(self) -> Self {
        self.store.update(|configuration| {
            configuration.flags.enable_request_caching = true;
        });
        self
    }

    /// Runs without persisting issued tokens.
    #[must_use]
    pub fn disable_token_storage(self) -> Self {
        self.store.update(|configuration| {
            configuration.flags.disable_token_storage = true;
        });
        self
    }

    /// Skips scope validation against the registered scope set.
    #[must_use]
    pub fn disable_scope_validation(self) -> Self {
        self.store.update(|configuration| {
            configuration.flags.disable_scope_validation = true;
        });
        self
    }

    /// Accepts token requests from clients without credentials.
    #[must_use]
    pub fn accept_anonymous_clients(self) -> Self {
        self.store.update(|configuration| {
            configuration.flags.accept_anonymous_clients = true;
        });
        self
    }

    /// Issues self-contained signed JWT access tokens.
    #[must_use]
    pub fn use_jwt_access_tokens(self) -> Self {
        self.store.update(|configuration| {
            configuration.access_token_format = AccessTokenFormat::Jwt;
        });
        self
    }

    /// Issues opaque reference access tokens.
    #[must_use]
    pub fn use_reference_access_tokens(self) -> Self {
        self.store.update(|configuration| {
            configuration.access_token_format = AccessTokenFormat::Reference;
        });
        self
    }

    // ==========================================================================
    // Event handlers
    // ==========================================================================

    /// Registers an instance-bound event handler for notification `N`.
    #[must_use]
    pub fn add_event_handler<N: Notification>(self, handler: impl EventHandler<N>) -> Self {
        self.store.update(|configuration| {
            configuration.handlers.register_instance::<N>(handler);
        });
        self
    }

    /// Registers a deferred-construction event handler type for
    /// notification `N`.
    ///
    /// # Errors
    ///
    /// Returns `EventsError::InvalidHandlerType` if the token targets a
    /// different notification type; nothing is committed on failure.
    pub fn add_event_handler_type<N: Notification>(self, token: HandlerType) -> AuthResult<Self> {
        let mut configuration = self.store.current();
        configuration.handlers.register_type::<N>(token)?;
        self.store.set(configuration);
        Ok(self)
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    /// Returns a copy of the latest committed record.
    #[must_use]
    pub fn configuration(&self) -> ServerConfiguration {
        self.store.current()
    }

    /// Consumes the builder, returning the underlying store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
