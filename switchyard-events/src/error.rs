//! Dispatch error types and failure aggregation

use crate::event::{Event, HandlerError};
use std::fmt;

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by dispatching an event
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No handlers are registered for the event type
    ///
    /// Never routed through callbacks.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedEventError),

    /// A single handler failed (sequential dispatch)
    #[error(transparent)]
    Handler(#[from] DispatchError),

    /// One or more handlers failed (concurrent dispatch)
    #[error(transparent)]
    Handlers(#[from] DispatchErrorList),

    /// Collected results do not line up with the handlers that ran
    #[error(
        "{operation} collected {collected} results from {expected} handlers for event `{event_type}`"
    )]
    ResultCountMismatch {
        operation: &'static str,
        event_type: String,
        expected: usize,
        collected: usize,
    },

    /// A success or failure callback failed
    #[error("callback failed: {0}")]
    Callback(#[source] HandlerError),
}

impl Error {
    /// Create a callback failure from a message
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(HandlerError::msg(message))
    }

    /// Check whether the event type had no handlers
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Individual handler failures carried by this error
    ///
    /// Empty for everything except [`Error::Handler`] and [`Error::Handlers`].
    pub fn handler_failures(&self) -> &[DispatchError] {
        match self {
            Self::Handler(failure) => std::slice::from_ref(failure),
            Self::Handlers(list) => list.as_slice(),
            _ => &[],
        }
    }
}

impl From<HandlerError> for Error {
    fn from(err: HandlerError) -> Self {
        Self::Callback(err)
    }
}

/// Raised when an event type has no registered handlers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported event `{event_type}`: no handlers registered")]
pub struct UnsupportedEventError {
    event_type: String,
}

impl UnsupportedEventError {
    pub(crate) fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
        }
    }

    /// The event type that had no handlers
    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

/// Failure of one handler, tagged with where and against what it ran
#[derive(Debug)]
pub struct DispatchError {
    operation: &'static str,
    index: usize,
    event_type: String,
    event_id: Option<String>,
    source: HandlerError,
}

impl DispatchError {
    pub(crate) fn new<E: Event>(
        operation: &'static str,
        index: usize,
        event: &E,
        source: HandlerError,
    ) -> Self {
        Self {
            operation,
            index,
            event_type: event.event_type().to_string(),
            event_id: event.event_id().map(str::to_string),
            source,
        }
    }

    /// Name of the dispatch operation that ran the handler
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Position of the failing handler in registration order
    pub fn index(&self) -> usize {
        self.index
    }

    /// Type of the event being dispatched
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// ID of the event being dispatched, if any
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// The handler's own failure
    pub fn cause(&self) -> &HandlerError {
        &self.source
    }

    /// Take the handler's own failure
    pub fn into_cause(self) -> HandlerError {
        self.source
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error calling {}.handlers[{}] with event `{}`",
            self.operation, self.index, self.event_type
        )?;
        if let Some(id) = &self.event_id {
            write!(f, " ({})", id)?;
        }
        write!(f, ": {}", self.source)
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Aggregate of one or more handler failures from the same dispatch
///
/// Constituents are kept in handler order and stay individually inspectable.
#[derive(Debug)]
pub struct DispatchErrorList {
    errors: Vec<DispatchError>,
}

impl DispatchErrorList {
    /// Separator used when rendering the aggregate
    pub const SEPARATOR: &'static str = " - ";

    /// Collapse failures into an aggregate, `None` if there were none
    pub(crate) fn aggregate(mut errors: Vec<DispatchError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        errors.sort_by_key(DispatchError::index);
        Some(Self { errors })
    }

    /// Number of failed handlers
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false, an aggregate holds at least one failure
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failures in handler order
    pub fn as_slice(&self) -> &[DispatchError] {
        &self.errors
    }

    /// Iterate over the failures
    pub fn iter(&self) -> std::slice::Iter<'_, DispatchError> {
        self.errors.iter()
    }

    /// Indices of the handlers that failed
    pub fn indices(&self) -> Vec<usize> {
        self.errors.iter().map(DispatchError::index).collect()
    }

    /// Take the individual failures
    pub fn into_inner(self) -> Vec<DispatchError> {
        self.errors
    }
}

impl fmt::Display for DispatchErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(Self::SEPARATOR)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchErrorList {}

impl<'a> IntoIterator for &'a DispatchErrorList {
    type Item = &'a DispatchError;
    type IntoIter = std::slice::Iter<'a, DispatchError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for DispatchErrorList {
    type Item = DispatchError;
    type IntoIter = std::vec::IntoIter<DispatchError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
