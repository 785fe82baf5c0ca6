//! Ordered handler registry and dispatch.
//!
//! The registry maps each notification type to the ordered sequence of
//! handler descriptors registered for it. Insertion order is dispatch order;
//! there is no priority or topological reordering, so each stage's handlers
//! see the mutations made by earlier handlers in the same stage.
//!
//! Two descriptor variants exist: an instance bound at registration time,
//! and a deferred-construction type token instantiated at dispatch time
//! through the [`HandlerResolver`] contract. Type-token registration is
//! validated synchronously so a misconfigured handler fails configuration
//! instead of degrading silently at request time.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::EventsError;
use crate::notification::{Erased, ErasedHandler, EventHandler, Notification, Outcome};

/// A deferred-construction handler type token.
///
/// The token records which notification type the handler targets, so the
/// registry can validate a registration without instantiating anything.
/// Construction is deferred to dispatch time and goes through the
/// [`HandlerResolver`] passed into [`HandlerRegistry::dispatch`].
#[derive(Debug, Clone, Copy)]
pub struct HandlerType {
    name: &'static str,
    id: TypeId,
    notification: TypeId,
    stage: &'static str,
    construct: fn() -> Arc<dyn ErasedHandler>,
}

impl HandlerType {
    /// Creates a type token for handler type `H` targeting notification `N`.
    ///
    /// `H` must implement the handler capability for exactly `N`; the bound
    /// is checked by the compiler here, and the recorded notification type
    /// is re-checked against the registration target at registration time.
    #[must_use]
    pub fn of<N, H>() -> Self
    where
        N: Notification,
        H: EventHandler<N> + Default,
    {
        let construct: fn() -> Arc<dyn ErasedHandler> =
            || Arc::new(Erased::<N, H>::new(H::default()));
        Self {
            name: std::any::type_name::<H>(),
            id: TypeId::of::<H>(),
            notification: TypeId::of::<N>(),
            stage: N::STAGE,
            construct,
        }
    }

    /// Name of the handler type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `TypeId` of the handler type.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Stage label of the notification type this handler targets.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Returns `true` if this handler type targets notification `N`.
    #[must_use]
    pub fn handles<N: Notification>(&self) -> bool {
        self.notification == TypeId::of::<N>()
    }

    /// Constructs a handler instance using the token's own constructor.
    ///
    /// Resolvers may ignore this and supply an instance from elsewhere.
    #[must_use]
    pub fn instantiate(&self) -> Arc<dyn ErasedHandler> {
        (self.construct)()
    }
}

/// A registered unit of extensibility for one notification type.
#[derive(Clone)]
pub enum HandlerDescriptor {
    /// A concrete handler bound at registration time.
    Instance(Arc<dyn ErasedHandler>),
    /// A type token whose instantiation is deferred to dispatch time.
    Deferred(HandlerType),
}

impl HandlerDescriptor {
    /// Returns `true` for the deferred-construction variant.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Stage label of the notification type this descriptor targets.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Instance(handler) => handler.stage(),
            Self::Deferred(token) => token.stage(),
        }
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(handler) => f
                .debug_struct("Instance")
                .field("stage", &handler.stage())
                .finish(),
            Self::Deferred(token) => f
                .debug_struct("Deferred")
                .field("handler", &token.name())
                .field("stage", &token.stage())
                .finish(),
        }
    }
}

/// Resolution contract for deferred handler types.
///
/// Supplied by the request-processing layer at dispatch time; the registry
/// owns only the descriptors, never the instantiation mechanism.
pub trait HandlerResolver {
    /// Produces a handler instance for a deferred type token.
    fn resolve(&self, token: &HandlerType) -> Arc<dyn ErasedHandler>;
}

/// Resolver that instantiates deferred handlers through the constructor
/// captured in the type token.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl HandlerResolver for DefaultResolver {
    fn resolve(&self, token: &HandlerType) -> Arc<dyn ErasedHandler> {
        token.instantiate()
    }
}

/// Per-notification-type collection of ordered handler descriptors.
///
/// Assembled during the single-threaded configuration phase, then shared
/// read-only across request processing. Cloning is cheap: instance
/// descriptors are shared through `Arc`.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, Vec<HandlerDescriptor>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instance-bound handler for notification `N`.
    pub fn register_instance<N: Notification>(&mut self, handler: impl EventHandler<N>) {
        debug!(stage = N::STAGE, "registering instance event handler");
        self.handlers
            .entry(TypeId::of::<N>())
            .or_default()
            .push(HandlerDescriptor::Instance(Arc::new(Erased::<N, _>::new(
                handler,
            ))));
    }

    /// Appends a deferred-construction handler for notification `N`.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::InvalidHandlerType`] if the token targets a
    /// different notification type than `N`. The registry is unchanged on
    /// failure.
    pub fn register_type<N: Notification>(&mut self, token: HandlerType) -> Result<(), EventsError> {
        if !token.handles::<N>() {
            return Err(EventsError::invalid_handler_type(
                token.name(),
                N::STAGE,
                token.stage(),
            ));
        }
        debug!(
            stage = N::STAGE,
            handler = token.name(),
            "registering deferred event handler"
        );
        self.handlers
            .entry(TypeId::of::<N>())
            .or_default()
            .push(HandlerDescriptor::Deferred(token));
        Ok(())
    }

    /// Returns the ordered descriptors registered for notification `N`.
    ///
    /// The iterator is lazy, restartable, and empty when nothing is
    /// registered.
    pub fn resolve<N: Notification>(&self) -> impl Iterator<Item = &HandlerDescriptor> {
        self.handlers
            .get(&TypeId::of::<N>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
    }

    /// Number of handlers registered for notification `N`.
    #[must_use]
    pub fn len<N: Notification>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<N>())
            .map_or(0, Vec::len)
    }

    /// Returns `true` if no handler is registered for any notification type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }

    /// Invokes the handlers for `notification` in strict registration order.
    ///
    /// Deferred descriptors are instantiated through `resolver`. Dispatch
    /// short-circuits at the first handler returning [`Outcome::Stop`].
    pub fn dispatch<N: Notification>(
        &self,
        resolver: &dyn HandlerResolver,
        notification: &mut N,
    ) -> Outcome {
        for descriptor in self.resolve::<N>() {
            let handler = match descriptor {
                HandlerDescriptor::Instance(handler) => Arc::clone(handler),
                HandlerDescriptor::Deferred(token) => resolver.resolve(token),
            };
            trace!(stage = N::STAGE, "invoking event handler");
            if handler.handle_erased(notification).is_stop() {
                debug!(stage = N::STAGE, "event handler stopped processing");
                return Outcome::Stop;
            }
        }
        Outcome::Continue
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.handlers.values().map(Vec::len).sum();
        f.debug_struct("HandlerRegistry")
            .field("notification_types", &self.handlers.len())
            .field("handlers", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::stages::{ApplyAuthorizationResponse, ApplyTokenResponse};

    #[derive(Default)]
    struct StampHandler;

    impl EventHandler<ApplyAuthorizationResponse> for StampHandler {
        fn handle(&self, notification: &mut ApplyAuthorizationResponse) -> Outcome {
            notification
                .response
                .insert("iss".to_string(), serde_json::Value::from("veridian"));
            Outcome::Continue
        }
    }

    #[derive(Default)]
    struct TokenStampHandler;

    impl EventHandler<ApplyTokenResponse> for TokenStampHandler {
        fn handle(&self, _notification: &mut ApplyTokenResponse) -> Outcome {
            Outcome::Continue
        }
    }

    #[test]
    fn test_register_instance_then_resolve() {
        let mut registry = HandlerRegistry::new();
        registry.register_instance::<ApplyAuthorizationResponse>(StampHandler);

        let descriptors: Vec<_> = registry.resolve::<ApplyAuthorizationResponse>().collect();
        assert_eq!(descriptors.len(), 1);
        assert!(!descriptors[0].is_deferred());
        assert_eq!(descriptors[0].stage(), "apply_authorization_response");
    }

    #[test]
    fn test_resolve_unregistered_type_is_empty() {
        let registry = HandlerRegistry::new();
        assert_eq!(registry.resolve::<ApplyTokenResponse>().count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_type_for_matching_notification() {
        let mut registry = HandlerRegistry::new();
        let token = HandlerType::of::<ApplyAuthorizationResponse, StampHandler>();
        registry
            .register_type::<ApplyAuthorizationResponse>(token)
            .unwrap();

        let descriptors: Vec<_> = registry.resolve::<ApplyAuthorizationResponse>().collect();
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].is_deferred());
    }

    #[test]
    fn test_register_type_mismatch_fails_and_leaves_registry_unchanged() {
        let mut registry = HandlerRegistry::new();
        let token = HandlerType::of::<ApplyTokenResponse, TokenStampHandler>();

        let err = registry
            .register_type::<ApplyAuthorizationResponse>(token)
            .unwrap_err();
        assert!(matches!(err, EventsError::InvalidHandlerType { .. }));
        assert!(err.handler().contains("TokenStampHandler"));
        assert_eq!(registry.resolve::<ApplyAuthorizationResponse>().count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dispatch_runs_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = HandlerRegistry::new();

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            registry.register_instance::<ApplyTokenResponse>(
                move |_: &mut ApplyTokenResponse| {
                    order.lock().unwrap().push(label);
                    Outcome::Continue
                },
            );
        }

        let mut notification = ApplyTokenResponse::default();
        let outcome = registry.dispatch(&DefaultResolver, &mut notification);
        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn test_dispatch_short_circuits_on_stop() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();

        let counter = Arc::clone(&invoked);
        registry.register_instance::<ApplyTokenResponse>(move |_: &mut ApplyTokenResponse| {
            counter.fetch_add(1, Ordering::SeqCst);
            Outcome::Stop
        });
        let counter = Arc::clone(&invoked);
        registry.register_instance::<ApplyTokenResponse>(move |_: &mut ApplyTokenResponse| {
            counter.fetch_add(1, Ordering::SeqCst);
            Outcome::Continue
        });

        let mut notification = ApplyTokenResponse::default();
        let outcome = registry.dispatch(&DefaultResolver, &mut notification);
        assert_eq!(outcome, Outcome::Stop);
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_instantiates_deferred_handler() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_type::<ApplyAuthorizationResponse>(HandlerType::of::<
                ApplyAuthorizationResponse,
                StampHandler,
            >())
            .unwrap();

        let mut notification = ApplyAuthorizationResponse::default();
        registry.dispatch(&DefaultResolver, &mut notification);
        assert_eq!(
            notification.response.get("iss"),
            Some(&serde_json::Value::from("veridian"))
        );
    }

    #[test]
    fn test_dispatch_only_touches_targeted_notification_type() {
        let mut registry = HandlerRegistry::new();
        registry.register_instance::<ApplyAuthorizationResponse>(StampHandler);

        let mut notification = ApplyTokenResponse::default();
        registry.dispatch(&DefaultResolver, &mut notification);
        assert!(notification.response.is_empty());
    }

    #[test]
    fn test_registry_clone_shares_instances() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        let counter = Arc::clone(&invoked);
        registry.register_instance::<ApplyTokenResponse>(move |_: &mut ApplyTokenResponse| {
            counter.fetch_add(1, Ordering::SeqCst);
            Outcome::Continue
        });

        let cloned = registry.clone();
        let mut notification = ApplyTokenResponse::default();
        registry.dispatch(&DefaultResolver, &mut notification);
        cloned.dispatch(&DefaultResolver, &mut notification);
        assert_eq!(invoked.load(Ordering::SeqCst), 2);
    }
}
