//! Typed front door over the type-erased engine.
//!
//! Each registration builds a predicate testing the runtime type of the event (and of
//! the requested result, for processors) together with an action that downcasts the
//! event before calling the user's callback. Both halves come from the same type
//! parameters, which is what makes the downcasts infallible.

use std::any::{type_name, Any, TypeId};

use crate::entry::ANY_TYPE;
use crate::{
    BoxError, BusError, Context, EventBus, EventRef, HandlerEntry, ProcessorEntry, ResultType,
    Subscription,
};

/// Downcasts an event that a predicate has already accepted.
///
/// # Panics
///
/// A mismatch means an entry was built with a predicate that does not guard its action.
fn accepted<'a, E: Any>(event: EventRef<'a>) -> &'a E {
    match event.downcast_ref::<E>() {
        Some(event) => event,
        None => panic!(
            "entry accepted `{}` but its action expects `{}`",
            event.type_name(),
            type_name::<E>()
        ),
    }
}

fn typed_handler<E, F>(handler: F) -> HandlerEntry
where
    E: Any,
    F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    HandlerEntry::new(
        type_name::<E>(),
        |event| event.is::<E>(),
        move |ctx, event| handler(ctx, accepted::<E>(event)),
    )
}

fn any_handler<F>(handler: F) -> HandlerEntry
where
    F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    HandlerEntry::new(ANY_TYPE, |_| true, handler)
}

impl EventBus {
    /// Publishes `event` to every handler registered for its type and to every
    /// wildcard handler, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Handler`] with the first handler error. Handlers after the
    /// failing one are not invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_eventbus::{Context, EventBus};
    ///
    /// let bus = EventBus::new();
    /// bus.subscribe(|_ctx, n: &u32| if *n > 10 { Err("too large".into()) } else { Ok(()) });
    ///
    /// assert!(bus.publish(&Context::new(), 3u32).is_ok());
    /// assert_eq!(bus.publish(&Context::new(), 42u32).unwrap_err().to_string(), "too large");
    /// ```
    pub fn publish<E: Any>(&self, ctx: &Context, event: E) -> Result<(), BusError> {
        self.publish_event(ctx, EventRef::new(&event))
    }

    /// Subscribes `handler` to events of type `E` until the subscription is disposed.
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: Any,
        F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register_handler(typed_handler(handler))
    }

    /// Subscribes `handler` to every event, whatever its type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    /// use typed_eventbus::{Context, EventBus};
    ///
    /// let bus = EventBus::new();
    /// let seen = Arc::new(AtomicUsize::new(0));
    /// let counter = seen.clone();
    /// bus.subscribe_any(move |_ctx, _event| {
    ///     counter.fetch_add(1, Ordering::SeqCst);
    ///     Ok(())
    /// });
    ///
    /// bus.publish(&Context::new(), 1u8).unwrap();
    /// bus.publish(&Context::new(), "text").unwrap();
    /// assert_eq!(seen.load(Ordering::SeqCst), 2);
    /// ```
    pub fn subscribe_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register_handler(any_handler(handler))
    }

    /// Subscribes `handler` to events of type `E` until it first succeeds.
    ///
    /// If the handler returns an error it stays subscribed and sees the next
    /// matching event.
    pub fn subscribe_once<E, F>(&self, handler: F) -> Subscription
    where
        E: Any,
        F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register_handler(typed_handler(handler).once())
    }

    /// Wildcard variant of [`subscribe_once`](Self::subscribe_once).
    pub fn subscribe_once_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register_handler(any_handler(handler).once())
    }

    /// Registers `processor` to answer dispatches of `E` that expect an `R`.
    ///
    /// Processors for the same event type but different result types coexist and are
    /// selected by the result type the caller asks for.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use typed_eventbus::{Context, EventBus};
    ///
    /// struct Celsius(f64);
    /// struct Fahrenheit(f64);
    ///
    /// let bus = EventBus::new();
    /// bus.add_processor(|_ctx, c: &Celsius| Ok(Fahrenheit(c.0 * 9.0 / 5.0 + 32.0)));
    ///
    /// let f: Fahrenheit = bus.dispatch(&Context::new(), Celsius(100.0)).unwrap();
    /// assert_eq!(f.0, 212.0);
    /// ```
    pub fn add_processor<E, R, F>(&self, processor: F) -> Subscription
    where
        E: Any,
        R: Send + 'static,
        F: Fn(&Context, &E) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.register_processor(ProcessorEntry::new(
            type_name::<E>(),
            type_name::<R>(),
            |event, wanted| event.is::<E>() && wanted.accepts(TypeId::of::<R>()),
            move |ctx, event| {
                processor(ctx, accepted::<E>(event))
                    .map(|result| Box::new(result) as Box<dyn Any + Send>)
            },
        ))
    }

    /// Registers `processor` to answer dispatches of any event type that expect an `R`.
    pub fn add_any_processor<R, F>(&self, processor: F) -> Subscription
    where
        R: Send + 'static,
        F: Fn(&Context, EventRef<'_>) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.register_processor(ProcessorEntry::new(
            ANY_TYPE,
            type_name::<R>(),
            |_event, wanted| wanted.accepts(TypeId::of::<R>()),
            move |ctx, event| {
                processor(ctx, event).map(|result| Box::new(result) as Box<dyn Any + Send>)
            },
        ))
    }

    /// Sends `event` to the first processor registered for `(E, R)` and returns its result.
    ///
    /// # Errors
    ///
    /// - [`BusError::NotProcessor`] if no processor handles `E` with result `R`
    /// - [`BusError::Handler`] with the matched processor's error
    ///
    /// # Panics
    ///
    /// If a hand-built [`ProcessorEntry`] accepts `R` but produces another type.
    pub fn dispatch<E, R>(&self, ctx: &Context, event: E) -> Result<R, BusError>
    where
        E: Any,
        R: Send + 'static,
    {
        let output = self.dispatch_event(ctx, EventRef::new(&event), ResultType::of::<R>())?;
        match output.downcast::<R>() {
            Ok(result) => Ok(*result),
            Err(_) => panic!(
                "processor for `{}` accepted result type `{}` but produced another type",
                type_name::<E>(),
                type_name::<R>()
            ),
        }
    }

    /// Sends `event` to the first processor registered for `E`, whatever its result type.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub fn dispatch_any<E: Any>(
        &self,
        ctx: &Context,
        event: E,
    ) -> Result<Box<dyn Any + Send>, BusError> {
        self.dispatch_event(ctx, EventRef::new(&event), ResultType::Any)
    }
}
