//! Webhook intake for Switchyard
//!
//! This crate verifies incoming webhooks and hands the resulting events to a
//! [`switchyard_events::Dispatcher`].
//!
//! # Features
//!
//! - **Signature Verification**: HMAC-SHA256 over `"<timestamp>.<payload>"`, Stripe header format
//! - **Replay Protection**: Configurable timestamp tolerance
//! - **Event Envelope**: Typed `WebhookEvent` with access to `data.object`
//! - **Dispatch**: Sequential or concurrent handler execution per event type
//! - **Configuration**: Builder or `SWITCHYARD_*` environment variables
//!
//! # Example: Receiving Webhooks
//!
//! ```rust,no_run
//! use switchyard_webhooks::{WebhookClient, WebhookConfig, WebhookEvent};
//! use switchyard_events::{DispatchMode, HandlerRegistry, handler_fn};
//!
//! # async fn example(body: &[u8], signature: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = HandlerRegistry::new();
//! registry.register("customer.created", [
//!     handler_fn(|event: &WebhookEvent| Ok(event.id.clone())),
//! ]);
//!
//! let config = WebhookConfig::builder()
//!     .webhook_secret("whsec_...")
//!     .build();
//! let client = WebhookClient::new(config, registry);
//!
//! client
//!     .receive_and_dispatch(body, signature, DispatchMode::Concurrent)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Verifying Only
//!
//! ```rust,no_run
//! use switchyard_webhooks::WebhookReceiver;
//!
//! let receiver = WebhookReceiver::new("your-secret-key");
//!
//! let payload_bytes = br#"{"id":"evt_1","type":"customer.created"}"#;
//! let signature_header = "t=1234567890,v1=abc123...";
//!
//! let event = receiver.receive(payload_bytes, signature_header);
//! ```

mod client;
mod config;
mod env;
mod error;
mod event;
mod receiver;
mod signature;

pub use client::WebhookClient;
pub use config::{ENV_PREFIX, WebhookConfig, WebhookConfigBuilder};
pub use env::EnvLoader;
pub use error::WebhookError;
pub use event::WebhookEvent;
pub use receiver::WebhookReceiver;
pub use signature::{WebhookSignature, headers};

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;
