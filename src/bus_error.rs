use thiserror::Error;

/// Boxed error returned by handlers and processors.
///
/// Any error type converts into it with `?`, so callbacks can propagate their own
/// errors without wrapping them first.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`publish`](crate::EventBus::publish) and
/// [`dispatch`](crate::EventBus::dispatch).
#[derive(Debug, Error)]
pub enum BusError {
    /// No registered processor accepts the requested (event type, result type) pair.
    #[error("no processor registered")]
    NotProcessor,

    /// A handler or processor returned an error. The error is carried untouched.
    #[error(transparent)]
    Handler(BoxError),
}

impl BusError {
    /// Returns `true` for the [`BusError::NotProcessor`] sentinel.
    pub fn is_not_processor(&self) -> bool {
        matches!(self, BusError::NotProcessor)
    }

    /// Borrows the callback error as a concrete type, if this is a
    /// [`BusError::Handler`] holding an `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            BusError::Handler(inner) => inner.downcast_ref::<E>(),
            BusError::NotProcessor => None,
        }
    }

    /// Consumes the error and returns the callback error, if any.
    pub fn into_inner(self) -> Option<BoxError> {
        match self {
            BusError::Handler(inner) => Some(inner),
            BusError::NotProcessor => None,
        }
    }
}
