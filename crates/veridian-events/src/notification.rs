//! Notification and handler contracts.
//!
//! A [`Notification`] is a closed, per-stage identity: one concrete type per
//! protocol stage, carrying the request-scoped mutable state that handlers
//! read and modify in place. Handlers implement [`EventHandler<N>`] for
//! exactly the notification type they target, which makes the handler
//! contract compile-time checked at the typed registration surface and
//! synchronously validated on the type-erased one.

use std::any::{Any, TypeId};
use std::marker::PhantomData;

/// A protocol-stage notification.
///
/// The stage label indexes the handler registry and shows up in dispatch
/// logging; it must be unique per notification type.
pub trait Notification: Send + 'static {
    /// Stage label for this notification type.
    const STAGE: &'static str;
}

/// Result of a single handler invocation.
///
/// Returning [`Outcome::Stop`] short-circuits dispatch for the current
/// notification; later handlers in the chain are not invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Continue with the next handler in registration order.
    Continue,
    /// Stop processing this notification.
    Stop,
}

impl Outcome {
    /// Returns `true` if this outcome stops further processing.
    #[must_use]
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// A handler for notifications of type `N`.
///
/// Handlers are invoked sequentially in registration order and mutate the
/// notification's state in place. Implementations must be `Send + Sync`
/// because the registry is shared read-only across request processing.
pub trait EventHandler<N: Notification>: Send + Sync + 'static {
    /// Processes a notification, mutating its state in place.
    fn handle(&self, notification: &mut N) -> Outcome;
}

impl<N, F> EventHandler<N> for F
where
    N: Notification,
    F: Fn(&mut N) -> Outcome + Send + Sync + 'static,
{
    fn handle(&self, notification: &mut N) -> Outcome {
        self(notification)
    }
}

/// Object-safe form of [`EventHandler`], used by the registry to store
/// handlers for heterogeneous notification types in one collection.
pub trait ErasedHandler: Send + Sync {
    /// `TypeId` of the notification type this handler processes.
    fn notification_type(&self) -> TypeId;

    /// Stage label of the notification type this handler processes.
    fn stage(&self) -> &'static str;

    /// Processes a type-erased notification.
    ///
    /// The registry only routes notifications of the declared type here, so
    /// a failed downcast indicates a registration invariant violation and is
    /// treated as a no-op.
    fn handle_erased(&self, notification: &mut dyn Any) -> Outcome;
}

/// Wrapper binding a typed handler to its notification type.
pub(crate) struct Erased<N, H> {
    inner: H,
    _notification: PhantomData<fn(N)>,
}

impl<N, H> Erased<N, H>
where
    N: Notification,
    H: EventHandler<N>,
{
    pub(crate) fn new(inner: H) -> Self {
        Self {
            inner,
            _notification: PhantomData,
        }
    }
}

impl<N, H> ErasedHandler for Erased<N, H>
where
    N: Notification,
    H: EventHandler<N>,
{
    fn notification_type(&self) -> TypeId {
        TypeId::of::<N>()
    }

    fn stage(&self) -> &'static str {
        N::STAGE
    }

    fn handle_erased(&self, notification: &mut dyn Any) -> Outcome {
        match notification.downcast_mut::<N>() {
            Some(notification) => self.inner.handle(notification),
            None => {
                debug_assert!(false, "notification routed to handler of another type");
                Outcome::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping {
        count: usize,
    }

    impl Notification for Ping {
        const STAGE: &'static str = "ping";
    }

    #[test]
    fn test_closure_handler() {
        let handler = |ping: &mut Ping| {
            ping.count += 1;
            Outcome::Continue
        };
        let mut ping = Ping { count: 0 };
        assert_eq!(handler.handle(&mut ping), Outcome::Continue);
        assert_eq!(ping.count, 1);
    }

    #[test]
    fn test_erased_handler_reports_notification_type() {
        let erased = Erased::<Ping, _>::new(|_: &mut Ping| Outcome::Stop);
        assert_eq!(erased.notification_type(), TypeId::of::<Ping>());
        assert_eq!(erased.stage(), "ping");

        let mut ping = Ping { count: 0 };
        let outcome = erased.handle_erased(&mut ping);
        assert!(outcome.is_stop());
    }
}
