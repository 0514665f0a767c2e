use tokio_util::sync::CancellationToken;

/// Call context passed to every handler and processor.
///
/// Cancellation is advisory: the bus never checks the token between entries.
/// Callbacks that run long enough to care may poll [`Context::is_cancelled`].
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    /// Creates a context with a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context around an existing token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Derives a context whose token is cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns `true` once this context or any parent was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}
