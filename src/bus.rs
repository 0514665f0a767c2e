//! The publish/dispatch engine over the type-erased registry.
//!
//! [`EventBus::publish_event`] fans an event out to every accepting handler, in
//! registration order, and stops at the first error. [`EventBus::dispatch_event`]
//! routes a request to the first accepting processor and returns its outcome.
//!
//! Both work on a snapshot of their entry list, so callbacks run without any bus
//! lock held and may freely publish, subscribe or dispose on the same bus. Entries
//! registered while a traversal is running are not visible to that traversal.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::entry::Delivery;
use crate::registry::Registry;
use crate::{
    BusError, BusTrace, Context, EventRef, HandlerEntry, Lifetime, ProcessorEntry, ResultType,
    Subscription,
};

/// An in-process, synchronous event bus.
///
/// A bus owns its entries. Subscriptions returned by registrations only refer to
/// it weakly, so dropping the bus drops every entry and turns outstanding
/// subscriptions into no-ops.
///
/// # Examples
///
/// ```rust
/// use typed_eventbus::{Context, EventBus};
///
/// #[derive(Debug)]
/// struct UserCreated {
///     name: String,
/// }
///
/// let bus = EventBus::new();
/// let ctx = Context::new();
///
/// bus.subscribe(|_ctx, event: &UserCreated| {
///     println!("welcome, {}", event.name);
///     Ok(())
/// });
///
/// bus.publish(&ctx, UserCreated { name: "ada".into() }).unwrap();
/// ```
pub struct EventBus {
    registry: Arc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Sets a tracing callback invoked for every operation on this bus.
    ///
    /// Replaces any previously installed callback.
    pub fn set_trace_callback(&self, callback: impl Fn(&BusTrace) + Send + Sync + 'static) {
        self.registry.set_trace_callback(Arc::new(callback));
    }

    /// Clears the tracing callback.
    ///
    /// Registered handlers and processors are not affected.
    pub fn clear_trace_callback(&self) {
        self.registry.clear_trace_callback();
    }

    // ---------------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------------

    /// Appends a handler entry and returns the subscription that removes it.
    pub fn register_handler(&self, entry: HandlerEntry) -> Subscription {
        let entry = Arc::new(entry);
        let once = entry.lifetime() == Lifetime::Once;

        self.registry.emit_event(&BusTrace::Subscribe {
            event_type: entry.event_type(),
            once,
        });

        self.registry.handlers.append(Arc::clone(&entry));
        debug!(event_type = entry.event_type(), once, "handler subscribed");

        Subscription::handler(&self.registry, &entry)
    }

    /// Appends a processor entry and returns the subscription that removes it.
    pub fn register_processor(&self, entry: ProcessorEntry) -> Subscription {
        let entry = Arc::new(entry);

        self.registry.emit_event(&BusTrace::AddProcessor {
            event_type: entry.event_type(),
            result_type: entry.result_type(),
        });

        self.registry.processors.append(Arc::clone(&entry));
        debug!(
            event_type = entry.event_type(),
            result_type = entry.result_type(),
            "processor added"
        );

        Subscription::processor(&self.registry, &entry)
    }

    // ---------------------------------------------------------------------------------------------
    // Publish / dispatch
    // ---------------------------------------------------------------------------------------------

    /// Offers `event` to every handler, in registration order.
    ///
    /// Handlers whose predicate rejects the event are skipped. The first handler
    /// error aborts the traversal and is returned as [`BusError::Handler`]; later
    /// handlers do not see the event. Once-handlers that succeeded during the
    /// traversal are removed afterwards, even when it aborted.
    pub fn publish_event(&self, ctx: &Context, event: EventRef<'_>) -> Result<(), BusError> {
        let handlers = self.registry.handlers.snapshot();

        let mut delivered = 0usize;
        let mut consumed = Vec::new();
        let mut failure = None;

        for entry in &handlers {
            match entry.deliver(ctx, event) {
                Delivery::Skipped => {}
                Delivery::Handled => delivered += 1,
                Delivery::Consumed => {
                    delivered += 1;
                    consumed.push(Arc::clone(entry));
                }
                Delivery::Failed(err) => {
                    delivered += 1;
                    failure = Some(err);
                    break;
                }
            }
        }

        if !consumed.is_empty() {
            self.registry.handlers.remove_all(&consumed);
        }

        let failed = failure.is_some();
        trace!(
            event_type = event.type_name(),
            delivered,
            failed,
            "event published"
        );
        self.registry.emit_event(&BusTrace::Publish {
            event_type: event.type_name(),
            delivered,
            failed,
        });

        match failure {
            Some(err) => {
                debug!(
                    event_type = event.type_name(),
                    error = %err,
                    "handler failed, publish aborted"
                );
                Err(BusError::Handler(err))
            }
            None => Ok(()),
        }
    }

    /// Routes `event` to the first processor accepting it and the `wanted` result type.
    ///
    /// The first match wins even if it fails: its error is returned and no later
    /// processor is consulted.
    ///
    /// # Errors
    ///
    /// - [`BusError::NotProcessor`] if no processor accepts the pair
    /// - [`BusError::Handler`] with the processor's own error
    pub fn dispatch_event(
        &self,
        ctx: &Context,
        event: EventRef<'_>,
        wanted: ResultType,
    ) -> Result<Box<dyn Any + Send>, BusError> {
        let processors = self.registry.processors.snapshot();
        let matched = processors
            .iter()
            .find(|entry| entry.is_active() && entry.can_process(event, wanted));

        let found = matched.is_some();
        trace!(
            event_type = event.type_name(),
            result_type = wanted.name(),
            found,
            "event dispatched"
        );
        self.registry.emit_event(&BusTrace::Dispatch {
            event_type: event.type_name(),
            result_type: wanted.name(),
            found,
        });

        match matched {
            Some(entry) => entry.process(ctx, event).map_err(BusError::Handler),
            None => Err(BusError::NotProcessor),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------------------------------

    /// Number of registered handlers, once-handlers included.
    pub fn handler_count(&self) -> usize {
        self.registry.handlers.len()
    }

    /// Number of registered processors.
    pub fn processor_count(&self) -> usize {
        self.registry.processors.len()
    }

    /// Removes every handler and processor from the bus.
    ///
    /// This method is primarily intended for testing with shared buses. Outstanding
    /// subscriptions become no-ops. The tracing callback is kept.
    #[doc(hidden)]
    pub fn clear(&self) {
        for entry in self.registry.handlers.drain() {
            entry.deactivate();
        }
        for entry in self.registry.processors.drain() {
            entry.deactivate();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .field("processors", &self.processor_count())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
