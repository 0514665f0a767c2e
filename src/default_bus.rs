//! The process-wide default bus and free functions operating on it.
//!
//! Prefer passing an explicit [`EventBus`] where possible; the default instance is a
//! convenience for code that has no natural owner for a bus.
//!
//! # Examples
//!
//! ```
//! use typed_eventbus::{publish, subscribe, Context};
//!
//! struct Tick;
//!
//! let subscription = subscribe(|_ctx, _tick: &Tick| Ok(()));
//! publish(&Context::new(), Tick).unwrap();
//! subscription.dispose();
//! ```

use std::any::Any;
use std::sync::LazyLock;

use crate::{BoxError, BusError, BusTrace, Context, EventBus, EventRef, Subscription};

/// Global bus, initialised on first use.
static DEFAULT_BUS: LazyLock<EventBus> = LazyLock::new(EventBus::new);

/// Returns the process-wide default bus.
pub fn default_bus() -> &'static EventBus {
    &DEFAULT_BUS
}

/// Publishes `event` on the default bus. See [`EventBus::publish`].
pub fn publish<E: Any>(ctx: &Context, event: E) -> Result<(), BusError> {
    DEFAULT_BUS.publish(ctx, event)
}

/// Subscribes to events of type `E` on the default bus. See [`EventBus::subscribe`].
pub fn subscribe<E, F>(handler: F) -> Subscription
where
    E: Any,
    F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    DEFAULT_BUS.subscribe(handler)
}

/// Subscribes to every event on the default bus.
pub fn subscribe_any<F>(handler: F) -> Subscription
where
    F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    DEFAULT_BUS.subscribe_any(handler)
}

/// Subscribes until the first success. See [`EventBus::subscribe_once`].
pub fn subscribe_once<E, F>(handler: F) -> Subscription
where
    E: Any,
    F: Fn(&Context, &E) -> Result<(), BoxError> + Send + Sync + 'static,
{
    DEFAULT_BUS.subscribe_once(handler)
}

pub fn subscribe_once_any<F>(handler: F) -> Subscription
where
    F: Fn(&Context, EventRef<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    DEFAULT_BUS.subscribe_once_any(handler)
}

/// Registers a processor on the default bus. See [`EventBus::add_processor`].
pub fn add_processor<E, R, F>(processor: F) -> Subscription
where
    E: Any,
    R: Send + 'static,
    F: Fn(&Context, &E) -> Result<R, BoxError> + Send + Sync + 'static,
{
    DEFAULT_BUS.add_processor(processor)
}

pub fn add_any_processor<R, F>(processor: F) -> Subscription
where
    R: Send + 'static,
    F: Fn(&Context, EventRef<'_>) -> Result<R, BoxError> + Send + Sync + 'static,
{
    DEFAULT_BUS.add_any_processor(processor)
}

/// Dispatches `event` on the default bus. See [`EventBus::dispatch`].
///
/// # Errors
///
/// [`BusError::NotProcessor`] if no processor is registered for `(E, R)`, or the
/// processor's own error.
pub fn dispatch<E, R>(ctx: &Context, event: E) -> Result<R, BusError>
where
    E: Any,
    R: Send + 'static,
{
    DEFAULT_BUS.dispatch(ctx, event)
}

pub fn dispatch_any<E: Any>(ctx: &Context, event: E) -> Result<Box<dyn Any + Send>, BusError> {
    DEFAULT_BUS.dispatch_any(ctx, event)
}

/// Sets a tracing callback on the default bus.
///
/// # Example
/// ```rust
/// use typed_eventbus::{clear_trace_callback, set_trace_callback};
///
/// set_trace_callback(|trace| println!("[bus-trace] {trace}"));
/// clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&BusTrace) + Send + Sync + 'static) {
    DEFAULT_BUS.set_trace_callback(callback);
}

/// Clears the tracing callback of the default bus.
pub fn clear_trace_callback() {
    DEFAULT_BUS.clear_trace_callback();
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    struct Greeting(String);

    #[test]
    #[serial]
    fn test_publish_and_subscribe() -> Result<(), BusError> {
        default_bus().clear();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        subscribe(move |_ctx, greeting: &Greeting| {
            assert_eq!(greeting.0, "hello");
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        publish(&Context::new(), Greeting("hello".into()))?;
        publish(&Context::new(), 1u8)?;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        default_bus().clear();
        Ok(())
    }

    #[test]
    #[serial]
    fn test_dispatch() -> Result<(), BusError> {
        default_bus().clear();

        add_processor(|_ctx, greeting: &Greeting| Ok(greeting.0.len()));

        let len: usize = dispatch(&Context::new(), Greeting("four".into()))?;
        assert_eq!(len, 4);

        let any = dispatch_any(&Context::new(), Greeting("sixsix".into()))?;
        assert_eq!(*any.downcast::<usize>().unwrap(), 6);

        default_bus().clear();
        Ok(())
    }

    #[test]
    #[serial]
    fn test_dispatch_nonexistent() {
        default_bus().clear();

        let result: Result<String, _> = dispatch(&Context::new(), Greeting("hi".into()));
        assert!(result.unwrap_err().is_not_processor());
    }

    #[test]
    #[serial]
    fn test_subscribe_once() {
        default_bus().clear();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        subscribe_once_any(move |_ctx, _event| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        publish(&Context::new(), 1u32).unwrap();
        publish(&Context::new(), 2u32).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(default_bus().handler_count(), 0);
    }

    #[test]
    #[serial]
    fn test_trace_callback_publish_event() {
        default_bus().clear();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(format!("{}", e));
        });

        subscribe(|_ctx, _n: &u8| Ok(()));
        publish(&Context::new(), 5u8).unwrap();

        clear_trace_callback();
        publish(&Context::new(), 6u8).unwrap();

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0], "subscribe { event_type: u8, once: false }");
        assert_eq!(
            captured[1],
            "publish { event_type: u8, delivered: 1, failed: false }"
        );

        default_bus().clear();
    }
}
