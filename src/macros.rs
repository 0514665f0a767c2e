//! Macros for creating named, statically allocated buses.

/// Creates an isolated, process-wide bus inside a module with a single macro invocation.
///
/// The macro generates a module containing:
/// - a private `LazyLock<EventBus>`
/// - `bus()`, returning the `&'static EventBus`
/// - free functions mirroring the typed API of [`EventBus`](crate::EventBus)
///
/// # Examples
///
/// ```rust
/// use typed_eventbus::{define_bus, Context};
///
/// define_bus!(orders);
///
/// struct OrderPlaced {
///     id: u64,
/// }
///
/// orders::subscribe(|_ctx, order: &OrderPlaced| {
///     assert_eq!(order.id, 7);
///     Ok(())
/// });
/// orders::publish(&Context::new(), OrderPlaced { id: 7 }).unwrap();
/// ```
///
/// # Multiple Buses
///
/// Every invocation creates a separate bus:
///
/// ```rust
/// use typed_eventbus::{define_bus, Context};
///
/// define_bus!(billing);
/// define_bus!(shipping);
///
/// billing::add_processor(|_ctx, amount: &u32| Ok(*amount as u64 * 100));
///
/// let cents: u64 = billing::dispatch(&Context::new(), 3u32).unwrap();
/// assert_eq!(cents, 300);
///
/// // Nothing registered on the other bus
/// let missing: Result<u64, _> = shipping::dispatch(&Context::new(), 3u32);
/// assert!(missing.unwrap_err().is_not_processor());
/// ```
#[macro_export]
macro_rules! define_bus {
    ($name:ident) => {
        pub mod $name {
            use std::any::Any;
            use std::sync::LazyLock;

            use $crate::{BoxError, BusError, BusTrace, Context, EventBus, EventRef, Subscription};

            // Storage for the bus (module-private)
            static BUS: LazyLock<EventBus> = LazyLock::new(EventBus::new);

            /// Returns this module's bus.
            pub fn bus() -> &'static EventBus {
                &BUS
            }

            /// Publish an event.
            pub fn publish<E: Any>(ctx: &Context, event: E) -> Result<(), BusError> {
                BUS.publish(ctx, event)
            }

            /// Subscribe to events of type `E`.
            pub fn subscribe<E, F>(handler: F) -> Subscription
            where
                E: Any,
                F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
            {
                BUS.subscribe(handler)
            }

            /// Subscribe to every event.
            pub fn subscribe_any<F>(handler: F) -> Subscription
            where
                F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
            {
                BUS.subscribe_any(handler)
            }

            /// Subscribe to events of type `E` until the first success.
            pub fn subscribe_once<E, F>(handler: F) -> Subscription
            where
                E: Any,
                F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
            {
                BUS.subscribe_once(handler)
            }

            /// Subscribe to every event until the first success.
            pub fn subscribe_once_any<F>(handler: F) -> Subscription
            where
                F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
            {
                BUS.subscribe_once_any(handler)
            }

            /// Register a processor for `(E, R)`.
            pub fn add_processor<E, R, F>(processor: F) -> Subscription
            where
                E: Any,
                R: Send + 'static,
                F: Fn(&Context, &E) -> Result<R, BoxError> + Send + Sync + 'static,
            {
                BUS.add_processor(processor)
            }

            /// Register a processor producing `R` for any event.
            pub fn add_any_processor<R, F>(processor: F) -> Subscription
            where
                R: Send + 'static,
                F: Fn(&Context, EventRef<'_>) -> Result<R, BoxError> + Send + Sync + 'static,
            {
                BUS.add_any_processor(processor)
            }

            /// Dispatch an event and wait for its result.
            pub fn dispatch<E, R>(ctx: &Context, event: E) -> Result<R, BusError>
            where
                E: Any,
                R: Send + 'static,
            {
                BUS.dispatch(ctx, event)
            }

            /// Dispatch an event, accepting any result type.
            pub fn dispatch_any<E: Any>(
                ctx: &Context,
                event: E,
            ) -> Result<Box<dyn Any + Send>, BusError> {
                BUS.dispatch_any(ctx, event)
            }

            /// Set a tracing callback for this bus.
            pub fn set_trace_callback(callback: impl Fn(&BusTrace) + Send + Sync + 'static) {
                BUS.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                BUS.clear_trace_callback()
            }
        }
    };
}
