// Switchyard - webhook event dispatch for Rust
//
// Routes verified webhook events to the handlers registered for their type,
// runs them sequentially or concurrently, and resolves the outcome through
// per-type success and failure callbacks.

// Re-export core functionality
pub use switchyard_events::*;

// Re-export async-trait so handlers can be implemented without a direct dependency
pub use async_trait::async_trait;

// Re-export optional crates
#[cfg(feature = "webhooks")]
pub use switchyard_webhooks;

/// Prelude module for convenient imports
pub mod prelude {
    pub use switchyard_events::{
        DispatchMode, Dispatcher, DispatcherBuilder, Error, Event, EventHandler, HandlerError,
        HandlerRegistry, Outcome, handler_fn,
    };

    pub use async_trait::async_trait;

    #[cfg(feature = "webhooks")]
    pub use switchyard_webhooks::{
        WebhookClient, WebhookConfig, WebhookError, WebhookEvent, WebhookReceiver,
        WebhookSignature,
    };
}
