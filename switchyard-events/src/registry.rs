//! Handler registry keyed by event type

use crate::error::{Result, UnsupportedEventError};
use crate::event::{Event, EventHandler, SharedHandler};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Callback invoked with the event and every handler result once all
/// handlers succeeded
pub type SuccessCallback<E, R> = Arc<dyn Fn(&E, &[R]) -> Result<()> + Send + Sync>;

/// Callback invoked with the event and the (possibly aggregated) failure
///
/// Returning `Ok(())` marks the failure as handled, returning an error
/// replaces it.
pub type FailureCallback<E> = Arc<dyn Fn(&E, crate::Error) -> Result<()> + Send + Sync>;

/// Registry of handlers and terminal callbacks per event type
///
/// Populated once during setup through `&mut self`, then moved into a
/// [`Dispatcher`](crate::Dispatcher) which only ever reads it.
pub struct HandlerRegistry<E: Event, R> {
    handlers: HashMap<String, Vec<SharedHandler<E, R>>>,
    on_success: HashMap<String, SuccessCallback<E, R>>,
    on_failure: HashMap<String, FailureCallback<E>>,
}

impl<E: Event, R> HandlerRegistry<E, R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            on_success: HashMap::new(),
            on_failure: HashMap::new(),
        }
    }

    /// Append handlers for an event type
    ///
    /// Registration is additive: handlers registered by earlier calls for
    /// the same type keep their position and run first.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let mut registry = HandlerRegistry::new();
    /// registry
    ///     .register("customer.created", [handler_fn(create_board)])
    ///     .register("customer.created", [handler_fn(send_invites)]);
    /// assert_eq!(registry.handler_count("customer.created"), 2);
    /// ```
    pub fn register<I>(&mut self, event_type: impl Into<String>, handlers: I) -> &mut Self
    where
        I: IntoIterator<Item = SharedHandler<E, R>>,
    {
        let event_type = event_type.into();
        let registered = self.handlers.entry(event_type.clone()).or_default();
        let before = registered.len();
        registered.extend(handlers);

        debug!(
            event_type = %event_type,
            added = registered.len() - before,
            total = registered.len(),
            "Registered handlers"
        );
        self
    }

    /// Append a single handler for an event type
    pub fn register_handler<H>(&mut self, event_type: impl Into<String>, handler: H) -> &mut Self
    where
        H: EventHandler<E, R> + 'static,
    {
        let handler: SharedHandler<E, R> = Arc::new(handler);
        self.register(event_type, [handler])
    }

    /// Set the success callback for an event type, replacing any previous one
    pub fn on_success<F>(&mut self, event_type: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&E, &[R]) -> Result<()> + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        debug!(event_type = %event_type, "Set success callback");
        self.on_success.insert(event_type, Arc::new(callback));
        self
    }

    /// Set the failure callback for an event type, replacing any previous one
    pub fn on_failure<F>(&mut self, event_type: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&E, crate::Error) -> Result<()> + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        debug!(event_type = %event_type, "Set failure callback");
        self.on_failure.insert(event_type, Arc::new(callback));
        self
    }

    /// Get the handlers for an event type in registration order
    pub fn lookup(
        &self,
        event_type: &str,
    ) -> std::result::Result<&[SharedHandler<E, R>], UnsupportedEventError> {
        match self.handlers.get(event_type) {
            Some(handlers) if !handlers.is_empty() => Ok(handlers),
            _ => Err(UnsupportedEventError::new(event_type)),
        }
    }

    /// Get the success callback for an event type
    pub fn success_callback(&self, event_type: &str) -> Option<&SuccessCallback<E, R>> {
        self.on_success.get(event_type)
    }

    /// Get the failure callback for an event type
    pub fn failure_callback(&self, event_type: &str) -> Option<&FailureCallback<E>> {
        self.on_failure.get(event_type)
    }

    /// Get handler count for an event type
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map(Vec::len).unwrap_or(0)
    }

    /// Event types with at least one handler
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.handlers
            .iter()
            .filter(|(_, handlers)| !handlers.is_empty())
            .map(|(event_type, _)| event_type.as_str())
    }

    /// Check whether a success callback is set for an event type
    pub fn has_success_callback(&self, event_type: &str) -> bool {
        self.on_success.contains_key(event_type)
    }

    /// Check whether a failure callback is set for an event type
    pub fn has_failure_callback(&self, event_type: &str) -> bool {
        self.on_failure.contains_key(event_type)
    }

    /// Check whether no handlers are registered at all
    pub fn is_empty(&self) -> bool {
        self.event_types().next().is_none()
    }
}

impl<E: Event, R> Default for HandlerRegistry<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event, R> fmt::Debug for HandlerRegistry<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(event_type, handlers)| (event_type.as_str(), handlers.len()))
            .collect();

        f.debug_struct("HandlerRegistry")
            .field("handlers", &handlers)
            .field("on_success", &self.on_success.keys().collect::<Vec<_>>())
            .field("on_failure", &self.on_failure.keys().collect::<Vec<_>>())
            .finish()
    }
}
