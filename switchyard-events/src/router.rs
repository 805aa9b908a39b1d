//! Routing of dispatch outcomes to the terminal callbacks

use crate::error::{Error, Result};
use crate::event::Event;
use crate::registry::HandlerRegistry;
use tracing::{debug, warn};

/// Successful result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R> {
    /// Every handler succeeded; results are in registration order
    Completed(Vec<R>),

    /// A handler failed and the failure callback handled it
    Recovered,
}

impl<R> Outcome<R> {
    /// Check whether every handler succeeded
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Check whether a failure callback suppressed a failure
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered)
    }

    /// Handler results, if every handler succeeded
    pub fn results(&self) -> Option<&[R]> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Recovered => None,
        }
    }

    /// Take the handler results, if every handler succeeded
    pub fn into_results(self) -> Option<Vec<R>> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Recovered => None,
        }
    }
}

/// Resolves handler results or failures against the registered callbacks
pub(crate) struct OutcomeRouter<'a, E: Event, R> {
    registry: &'a HandlerRegistry<E, R>,
    enable_logging: bool,
}

impl<'a, E: Event, R> OutcomeRouter<'a, E, R> {
    pub(crate) fn new(registry: &'a HandlerRegistry<E, R>, enable_logging: bool) -> Self {
        Self {
            registry,
            enable_logging,
        }
    }

    /// Success path: hand the results to the success callback, if any
    pub(crate) fn succeed(&self, event: &E, results: Vec<R>) -> Result<Outcome<R>> {
        let Some(callback) = self.registry.success_callback(event.event_type()) else {
            return Ok(Outcome::Completed(results));
        };

        if let Err(err) = callback(event, &results) {
            if self.enable_logging {
                warn!(event_type = event.event_type(), error = %err, "Success callback failed");
            }
            return Err(err);
        }

        Ok(Outcome::Completed(results))
    }

    /// Failure path: hand the failure to the failure callback, if any
    pub(crate) fn fail(&self, event: &E, error: Error) -> Result<Outcome<R>> {
        let Some(callback) = self.registry.failure_callback(event.event_type()) else {
            return Err(error);
        };

        match callback(event, error) {
            Ok(()) => {
                if self.enable_logging {
                    debug!(event_type = event.event_type(), "Failure handled by callback");
                }
                Ok(Outcome::Recovered)
            }
            Err(err) => Err(err),
        }
    }
}
