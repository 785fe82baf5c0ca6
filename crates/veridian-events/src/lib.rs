//! # veridian-events
//!
//! Typed event-notification pipeline for the Veridian authorization server.
//!
//! Every stage of protocol processing (validating an authorization request,
//! producing a token response, and so on) is modeled as a [`Notification`]
//! type. External handlers observe and mutate a notification's request-scoped
//! state by registering with the [`HandlerRegistry`], either as a bound
//! instance or as a deferred-construction type token whose instantiation is
//! left to a [`HandlerResolver`] at dispatch time.
//!
//! Handlers run in strict registration order. Registration-time validation
//! guarantees that a misregistered handler type is rejected before the server
//! starts serving traffic.
//!
//! ## Modules
//!
//! - [`notification`] - Notification and handler contracts
//! - [`registry`] - Ordered handler registry and dispatch
//! - [`stages`] - Concrete protocol-stage notification types

pub mod error;
pub mod notification;
pub mod registry;
pub mod stages;

pub use error::EventsError;
pub use notification::{ErasedHandler, EventHandler, Notification, Outcome};
pub use registry::{
    DefaultResolver, HandlerDescriptor, HandlerRegistry, HandlerResolver, HandlerType,
};
pub use stages::{
    ApplyAuthorizationResponse, ApplyTokenResponse, HandleAuthorizationRequest, HandleTokenRequest,
    ResponseParameters, StageRejection, ValidateAuthorizationRequest, ValidateTokenRequest,
};

/// Type alias for event pipeline results.
pub type EventsResult<T> = Result<T, EventsError>;
