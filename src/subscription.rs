use std::sync::{Arc, Weak};

use tracing::debug;

use crate::registry::Registry;
use crate::{BusTrace, HandlerEntry, ProcessorEntry};

#[derive(Debug, Clone)]
enum Target {
    Handler(Weak<HandlerEntry>),
    Processor(Weak<ProcessorEntry>),
}

/// Capability returned by every registration; disposing it cancels that registration.
///
/// A subscription does not keep the bus or its entry alive, and dropping it does
/// **not** unsubscribe: the entry stays registered until [`dispose`](Self::dispose)
/// is called, a once-handler succeeds, or the bus is dropped.
///
/// # Examples
///
/// ```rust
/// use typed_eventbus::EventBus;
///
/// let bus = EventBus::new();
/// let subscription = bus.subscribe(|_ctx, _n: &u32| Ok(()));
/// assert_eq!(bus.handler_count(), 1);
///
/// subscription.dispose();
/// subscription.dispose(); // no-op
/// assert_eq!(bus.handler_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Subscription {
    registry: Weak<Registry>,
    target: Target,
    event_type: &'static str,
}

impl Subscription {
    pub(crate) fn handler(registry: &Arc<Registry>, entry: &Arc<HandlerEntry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            target: Target::Handler(Arc::downgrade(entry)),
            event_type: entry.event_type(),
        }
    }

    pub(crate) fn processor(registry: &Arc<Registry>, entry: &Arc<ProcessorEntry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            target: Target::Processor(Arc::downgrade(entry)),
            event_type: entry.event_type(),
        }
    }

    /// Removes the entry from its bus.
    ///
    /// Idempotent: disposing an entry that is already gone (disposed before, consumed
    /// as a once-handler, or whose bus was dropped) does nothing. Never fails.
    ///
    /// Once this returns, no publish or dispatch starts a new invocation of the entry.
    /// An invocation that another thread had already begun runs to completion; a
    /// once-handler waiting behind a running invocation of itself is skipped.
    pub fn dispose(&self) {
        let removed = match &self.target {
            Target::Handler(entry) => match entry.upgrade() {
                Some(entry) => {
                    entry.deactivate()
                        && self
                            .registry
                            .upgrade()
                            .is_some_and(|registry| registry.handlers.remove(&entry))
                }
                None => false,
            },
            Target::Processor(entry) => match entry.upgrade() {
                Some(entry) => {
                    entry.deactivate()
                        && self
                            .registry
                            .upgrade()
                            .is_some_and(|registry| registry.processors.remove(&entry))
                }
                None => false,
            },
        };

        debug!(event_type = self.event_type, removed, "subscription disposed");

        if let Some(registry) = self.registry.upgrade() {
            registry.emit_event(&BusTrace::Dispose {
                event_type: self.event_type,
                removed,
            });
        }
    }

    /// Returns `true` while the entry can still receive events.
    pub fn is_active(&self) -> bool {
        if self.registry.strong_count() == 0 {
            return false;
        }
        match &self.target {
            Target::Handler(entry) => entry.upgrade().is_some_and(|e| e.is_active()),
            Target::Processor(entry) => entry.upgrade().is_some_and(|e| e.is_active()),
        }
    }

    /// The event type this subscription was registered for.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }
}
