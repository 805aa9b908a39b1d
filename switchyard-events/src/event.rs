//! Event and handler definitions

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Boxed error carried by handler and callback failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Event trait
///
/// Everything dispatched through a [`Dispatcher`](crate::Dispatcher) exposes a
/// string type, which selects the handlers that run for it.
pub trait Event: Send + Sync + Debug + 'static {
    /// Get the event type (e.g. "customer.created")
    fn event_type(&self) -> &str;

    /// Get the event ID, if the source assigns one
    fn event_id(&self) -> Option<&str> {
        None
    }
}

/// Event handler trait
///
/// A handler reacts to one event and produces a result value of type `R`.
/// Handlers may run concurrently against the same event and must not rely
/// on the order in which their siblings execute.
#[async_trait]
pub trait EventHandler<E: Event, R>: Send + Sync {
    /// Handle the event
    async fn handle(&self, event: &E) -> Result<R, HandlerError>;
}

/// Shared, type-erased handler as stored in the registry
pub type SharedHandler<E, R> = Arc<dyn EventHandler<E, R>>;

/// Failure reported by a handler or a callback
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Handler failed with a message
    #[error("{0}")]
    Failed(String),

    /// Handler failed with an underlying error
    #[error("{0}")]
    Source(#[source] BoxError),

    /// Handler task panicked before reporting
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Create a failure from a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap an underlying error
    pub fn new<T>(err: T) -> Self
    where
        T: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(err))
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        Self::Source(err)
    }
}

/// Handler backed by a closure, see [`handler_fn`]
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<E, R, F> EventHandler<E, R> for FnHandler<F>
where
    E: Event,
    R: Send + 'static,
    F: Fn(&E) -> Result<R, HandlerError> + Send + Sync,
{
    async fn handle(&self, event: &E) -> Result<R, HandlerError> {
        (self.f)(event)
    }
}

/// Turn a closure into a shared handler
///
/// ```rust,ignore
/// registry.register("customer.created", [
///     handler_fn(|_: &MyEvent| Ok(Created::Board)),
///     handler_fn(|_: &MyEvent| Err(HandlerError::msg("boom"))),
/// ]);
/// ```
pub fn handler_fn<E, R, F>(f: F) -> SharedHandler<E, R>
where
    E: Event,
    R: Send + 'static,
    F: Fn(&E) -> Result<R, HandlerError> + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}

/// Share a handler so it can be registered
pub fn shared<E, R, H>(handler: H) -> SharedHandler<E, R>
where
    E: Event,
    H: EventHandler<E, R> + 'static,
{
    Arc::new(handler)
}
