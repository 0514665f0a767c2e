/// Trace records emitted by a bus during operations.
///
/// These values are passed to the callback installed with
/// [`EventBus::set_trace_callback`](crate::EventBus::set_trace_callback).
/// Type names come from [`std::any::type_name`]; wildcard registrations report `"any"`.
///
/// # Examples
///
/// ```rust
/// use typed_eventbus::BusTrace;
///
/// let trace = BusTrace::Subscribe { event_type: "u32", once: false };
/// assert_eq!(trace.to_string(), "subscribe { event_type: u32, once: false }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusTrace {
    /// A handler was registered.
    Subscribe {
        /// The event type the handler accepts
        event_type: &'static str,
        /// Whether the handler removes itself after its first success
        once: bool,
    },

    /// A processor was registered.
    AddProcessor {
        event_type: &'static str,
        result_type: &'static str,
    },

    /// An event was published.
    Publish {
        event_type: &'static str,
        /// Number of handlers invoked, including a failing one
        delivered: usize,
        /// Whether a handler error aborted the traversal
        failed: bool,
    },

    /// An event was dispatched to the processors.
    Dispatch {
        event_type: &'static str,
        result_type: &'static str,
        /// Whether a processor accepted the request
        found: bool,
    },

    /// A subscription was disposed.
    Dispose {
        event_type: &'static str,
        /// `false` when the entry had already been removed
        removed: bool,
    },
}

impl std::fmt::Display for BusTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusTrace::Subscribe { event_type, once } => {
                write!(f, "subscribe {{ event_type: {event_type}, once: {once} }}")
            }
            BusTrace::AddProcessor {
                event_type,
                result_type,
            } => write!(
                f,
                "add_processor {{ event_type: {event_type}, result_type: {result_type} }}"
            ),
            BusTrace::Publish {
                event_type,
                delivered,
                failed,
            } => write!(
                f,
                "publish {{ event_type: {event_type}, delivered: {delivered}, failed: {failed} }}"
            ),
            BusTrace::Dispatch {
                event_type,
                result_type,
                found,
            } => write!(
                f,
                "dispatch {{ event_type: {event_type}, result_type: {result_type}, found: {found} }}"
            ),
            BusTrace::Dispose {
                event_type,
                removed,
            } => write!(f, "dispose {{ event_type: {event_type}, removed: {removed} }}"),
        }
    }
}
