//! Type-erased registry entries.
//!
//! An entry binds a predicate to an action. The predicate decides from the runtime
//! type of an event (and, for processors, of the requested result) whether the
//! entry is responsible; the action then does the work. Typed registrations build
//! both halves from the same type parameters, so a predicate that returns `true`
//! guarantees that the downcast inside the action succeeds.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::{BoxError, Context};

/// Type name reported for wildcard registrations and requests.
pub const ANY_TYPE: &str = "any";

/// Result of a handler action.
pub type HandlerResult = Result<(), BoxError>;

/// Result of a processor action before it is downcast to the caller's type.
pub type ProcessorOutput = Result<Box<dyn Any + Send>, BoxError>;

type HandlerPredicate = Box<dyn Fn(EventRef<'_>) -> bool + Send + Sync>;
type HandlerAction = Box<dyn Fn(&Context, EventRef<'_>) -> HandlerResult + Send + Sync>;
type ProcessorPredicate = Box<dyn Fn(EventRef<'_>, ResultType) -> bool + Send + Sync>;
type ProcessorAction = Box<dyn Fn(&Context, EventRef<'_>) -> ProcessorOutput + Send + Sync>;

// -------------------------------------------------------------------------------------------------
// Type descriptors
// -------------------------------------------------------------------------------------------------

/// Borrowed, type-erased view of a published or dispatched event.
///
/// # Examples
///
/// ```rust
/// use typed_eventbus::EventRef;
///
/// let value = 7u32;
/// let event = EventRef::new(&value);
/// assert!(event.is::<u32>());
/// assert_eq!(event.downcast_ref::<u32>(), Some(&7));
/// assert_eq!(event.type_name(), "u32");
/// ```
#[derive(Clone, Copy)]
pub struct EventRef<'a> {
    value: &'a dyn Any,
    type_name: &'static str,
}

impl<'a> EventRef<'a> {
    /// Wraps a borrowed event, remembering its static type name.
    pub fn new<T: Any>(value: &'a T) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns `true` if the event's dynamic type is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns the event as `T`, or `None` if it has another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }

    /// The `TypeId` of the event's dynamic type.
    pub fn type_id(&self) -> TypeId {
        Any::type_id(self.value)
    }

    /// The event's type name, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for EventRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRef")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The result type a dispatch caller expects.
///
/// Used only to pick a processor; it never carries data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    /// Any result type is acceptable.
    Any,
    /// Exactly this result type.
    Of { id: TypeId, name: &'static str },
}

impl ResultType {
    /// Requests exactly the result type `R`.
    pub fn of<R: Any>() -> Self {
        ResultType::Of {
            id: TypeId::of::<R>(),
            name: std::any::type_name::<R>(),
        }
    }

    /// Returns `true` if a processor producing `id` satisfies this request.
    pub fn accepts(&self, id: TypeId) -> bool {
        match self {
            ResultType::Any => true,
            ResultType::Of { id: wanted, .. } => *wanted == id,
        }
    }

    /// Type name used in logs and traces; [`ANY_TYPE`] for the wildcard.
    pub fn name(&self) -> &'static str {
        match self {
            ResultType::Any => ANY_TYPE,
            ResultType::Of { name, .. } => name,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Handler entries
// -------------------------------------------------------------------------------------------------

/// How long a handler entry stays registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Until disposed.
    Persistent,
    /// Until the first successful invocation, or until disposed.
    Once,
}

/// Outcome of offering one event to one handler entry.
pub(crate) enum Delivery {
    /// The entry was inactive or did not accept the event.
    Skipped,
    Handled,
    /// A once entry succeeded and must be removed from the live list.
    Consumed,
    Failed(BoxError),
}

/// A handler predicate and action bound together.
///
/// Identity is the entry's allocation: the bus removes an entry by pointer
/// comparison, never by position.
pub struct HandlerEntry {
    predicate: HandlerPredicate,
    action: HandlerAction,
    event_type: &'static str,
    lifetime: Lifetime,
    active: AtomicBool,
    // Held across a once invocation; contending publishes wait on it.
    run_guard: Mutex<()>,
}

impl HandlerEntry {
    /// Creates a persistent entry.
    ///
    /// `event_type` is only used for logging and tracing.
    pub fn new(
        event_type: &'static str,
        predicate: impl Fn(EventRef<'_>) -> bool + Send + Sync + 'static,
        action: impl Fn(&Context, EventRef<'_>) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            action: Box::new(action),
            event_type,
            lifetime: Lifetime::Persistent,
            active: AtomicBool::new(true),
            run_guard: Mutex::new(()),
        }
    }

    /// Turns this entry into one that removes itself after its first success.
    ///
    /// A failing invocation leaves it registered.
    pub fn once(self) -> Self {
        Self {
            lifetime: Lifetime::Once,
            ..self
        }
    }

    /// Type name the entry was registered for.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// Whether the entry survives a successful invocation.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Returns `false` once the entry was disposed or consumed.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Runs the predicate.
    pub fn can_handle(&self, event: EventRef<'_>) -> bool {
        (self.predicate)(event)
    }

    /// Runs the action without checking the predicate or lifetime.
    pub fn handle(&self, ctx: &Context, event: EventRef<'_>) -> HandlerResult {
        (self.action)(ctx, event)
    }

    /// Clears the active flag. Returns `true` if this call did it.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn deliver(&self, ctx: &Context, event: EventRef<'_>) -> Delivery {
        if !self.is_active() || !self.can_handle(event) {
            return Delivery::Skipped;
        }

        match self.lifetime {
            Lifetime::Persistent => match self.handle(ctx, event) {
                Ok(()) => Delivery::Handled,
                Err(err) => Delivery::Failed(err),
            },
            Lifetime::Once => {
                let _guard = self.run_guard.lock().unwrap_or_else(|p| p.into_inner());
                // Disposed or consumed while this traversal waited for the guard.
                if !self.is_active() {
                    return Delivery::Skipped;
                }

                match self.handle(ctx, event) {
                    Ok(()) => {
                        self.deactivate();
                        Delivery::Consumed
                    }
                    Err(err) => Delivery::Failed(err),
                }
            }
        }
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("event_type", &self.event_type)
            .field("lifetime", &self.lifetime)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Processor entries
// -------------------------------------------------------------------------------------------------

/// A processor predicate and action bound together.
pub struct ProcessorEntry {
    predicate: ProcessorPredicate,
    action: ProcessorAction,
    event_type: &'static str,
    result_type: &'static str,
    active: AtomicBool,
}

impl ProcessorEntry {
    /// Creates a processor entry.
    ///
    /// The predicate receives the event and the result type the caller asked for.
    /// Type names are only used for logging and tracing.
    pub fn new(
        event_type: &'static str,
        result_type: &'static str,
        predicate: impl Fn(EventRef<'_>, ResultType) -> bool + Send + Sync + 'static,
        action: impl Fn(&Context, EventRef<'_>) -> ProcessorOutput + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            action: Box::new(action),
            event_type,
            result_type,
            active: AtomicBool::new(true),
        }
    }

    /// Type name of the events this processor was registered for.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// Type name of the result it produces.
    pub fn result_type(&self) -> &'static str {
        self.result_type
    }

    /// Returns `false` once the processor was disposed.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn can_process(&self, event: EventRef<'_>, wanted: ResultType) -> bool {
        (self.predicate)(event, wanted)
    }

    /// Runs the action without checking the predicate.
    pub fn process(&self, ctx: &Context, event: EventRef<'_>) -> ProcessorOutput {
        (self.action)(ctx, event)
    }

    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }
}

impl fmt::Debug for ProcessorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorEntry")
            .field("event_type", &self.event_type)
            .field("result_type", &self.result_type)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
