//! # veridian-auth
//!
//! Cryptographic-identity and configuration core for the Veridian
//! OAuth 2.0 / OpenID Connect authorization server.
//!
//! This crate provides:
//! - Signing-credential assembly: ephemeral key generation, external key
//!   import, and certificate-backed key loading, all validated against the
//!   declared signing algorithm before acceptance
//! - The server configuration record: credentials, grant types, scopes,
//!   claims, endpoint paths, token lifetimes, and feature flags
//! - A configuration-store contract guaranteeing mutations always apply to
//!   the latest committed state
//! - A fluent builder façade translating high-level intents into record
//!   mutations and event-handler registrations
//!
//! ## Configuration phase
//!
//! Everything here runs during the single-threaded configuration phase,
//! strictly before the server accepts requests. Every error is raised
//! synchronously at the point of misuse and is fatal to the configuration
//! call; startup code is expected to halt rather than recover. Once
//! committed, the configuration record is read-only and shared across
//! request processing without synchronization.
//!
//! ## Modules
//!
//! - [`builder`] - Fluent configuration builder
//! - [`config`] - Server configuration record
//! - [`signing`] - Signing algorithms, keys, and credentials
//! - [`store`] - Configuration store contract and in-memory implementation

pub mod builder;
pub mod config;
pub mod error;
pub mod signing;
pub mod store;

pub use builder::ServerBuilder;
pub use config::{
    AccessTokenFormat, EndpointConfig, EndpointKind, ServerConfiguration, ServerFlags,
    TokenLifetimes,
};
pub use error::AuthError;
pub use signing::{
    AlgorithmFamily, CertificateStore, DirCertificateStore, Jwk, JwkSet, KeyCapabilities, KeyUse,
    MemoryCertificateStore, SigningAlgorithm, SigningCredential, SigningError, SigningKey,
    load_certificate_key,
};
pub use store::{ConfigStore, InMemoryConfigStore};

/// Type alias for configuration-phase results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use veridian_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::builder::ServerBuilder;
    pub use crate::config::{
        AccessTokenFormat, EndpointKind, ServerConfiguration, ServerFlags, TokenLifetimes,
    };
    pub use crate::error::AuthError;
    pub use crate::signing::{
        CertificateStore, KeyCapabilities, SigningAlgorithm, SigningCredential, SigningKey,
    };
    pub use crate::store::{ConfigStore, InMemoryConfigStore};
    pub use veridian_events::{
        EventHandler, HandlerRegistry, HandlerType, Notification, Outcome,
    };
}
