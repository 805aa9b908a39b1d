//! Event dispatch for Switchyard
//!
//! This crate routes events to the handlers registered for their type and
//! resolves the combined outcome through per-type success and failure
//! callbacks.
//!
//! ## Features
//!
//! - **Handler Registry** - Ordered handlers per event type, additive registration
//! - **Sequential Dispatch** - Registration order, stops at the first failure
//! - **Concurrent Dispatch** - One task per handler, every failure aggregated
//! - **Callbacks** - Observe results, suppress or replace failures
//! - **Typed Results** - Handlers return a caller-defined result type
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard_events::*;
//!
//! #[derive(Debug)]
//! struct StripeEvent {
//!     kind: String,
//! }
//!
//! impl Event for StripeEvent {
//!     fn event_type(&self) -> &str { &self.kind }
//! }
//!
//! #[derive(Debug)]
//! enum Created {
//!     Board(String),
//!     Invites(usize),
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut registry = HandlerRegistry::new();
//!     registry
//!         .register("customer.created", [
//!             handler_fn(|_: &StripeEvent| Ok(Created::Board("acme".into()))),
//!             handler_fn(|_: &StripeEvent| Ok(Created::Invites(2))),
//!         ])
//!         .on_success("customer.created", |_, results| {
//!             for result in results {
//!                 match result {
//!                     Created::Board(name) => println!("board {name}"),
//!                     Created::Invites(n) => println!("{n} invites"),
//!                 }
//!             }
//!             Ok(())
//!         });
//!
//!     let dispatcher = Dispatcher::new(registry);
//!     dispatcher
//!         .dispatch(StripeEvent { kind: "customer.created".into() })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! registry.on_failure("customer.deleted", |_, err| match err {
//!     Error::Handlers(list) if list.len() == 1 => Ok(()), // handled
//!     other => Err(other),
//! });
//!
//! match dispatcher.dispatch_concurrent(event).await {
//!     Ok(Outcome::Completed(results)) => println!("{} results", results.len()),
//!     Ok(Outcome::Recovered) => println!("failure handled by callback"),
//!     Err(e) if e.is_unsupported() => println!("nothing to do"),
//!     Err(e) => eprintln!("dispatch failed: {e}"),
//! }
//! ```

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod registry;
pub mod router;

pub use dispatcher::{DispatchMode, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::{DispatchError, DispatchErrorList, Error, Result, UnsupportedEventError};
pub use event::{
    BoxError, Event, EventHandler, FnHandler, HandlerError, SharedHandler, handler_fn, shared,
};
pub use registry::{FailureCallback, HandlerRegistry, SuccessCallback};
pub use router::Outcome;
