//! Webhook client: verification plus dispatch

use crate::{Result, WebhookConfig, WebhookError, WebhookEvent, WebhookReceiver};
use std::collections::HashMap;
use switchyard_events::{
    DispatchMode, Dispatcher, DispatcherConfig, HandlerRegistry, Outcome,
};
use tracing::{debug, warn};

/// Receives webhooks and dispatches them to the registered handlers
///
/// The receiver is only present when a webhook secret is configured;
/// already-verified events can be dispatched either way.
pub struct WebhookClient<R> {
    receiver: Option<WebhookReceiver>,
    dispatcher: Dispatcher<WebhookEvent, R>,
}

impl<R: Send + 'static> WebhookClient<R> {
    /// Create a client from configuration and a populated registry
    pub fn new(config: WebhookConfig, registry: HandlerRegistry<WebhookEvent, R>) -> Self {
        Self::with_dispatcher(config, Dispatcher::new(registry))
    }

    /// Create a client with custom dispatcher configuration
    pub fn with_dispatcher_config(
        config: WebhookConfig,
        registry: HandlerRegistry<WebhookEvent, R>,
        dispatcher_config: DispatcherConfig,
    ) -> Self {
        Self::with_dispatcher(config, Dispatcher::with_config(registry, dispatcher_config))
    }

    fn with_dispatcher(config: WebhookConfig, dispatcher: Dispatcher<WebhookEvent, R>) -> Self {
        let receiver = WebhookReceiver::from_config(&config).ok();
        if receiver.is_none() {
            warn!("No webhook secret configured, incoming payloads cannot be verified");
        }

        Self {
            receiver,
            dispatcher,
        }
    }

    /// The dispatcher used for verified events
    pub fn dispatcher(&self) -> &Dispatcher<WebhookEvent, R> {
        &self.dispatcher
    }

    /// Verify and parse a raw webhook payload
    pub fn event(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent> {
        self.receiver()?.receive(payload, signature)
    }

    /// Verify and parse a raw webhook payload using request headers
    pub fn event_from_headers(
        &self,
        payload: &[u8],
        headers: &HashMap<String, String>,
    ) -> Result<WebhookEvent> {
        self.receiver()?.receive_from_headers(payload, headers)
    }

    /// Dispatch a verified event sequentially
    pub async fn handle(&self, event: WebhookEvent) -> Result<Outcome<R>> {
        Ok(self.dispatcher.dispatch(event).await?)
    }

    /// Dispatch a verified event concurrently
    pub async fn handle_concurrent(&self, event: WebhookEvent) -> Result<Outcome<R>> {
        Ok(self.dispatcher.dispatch_concurrent(event).await?)
    }

    /// Verify, parse and dispatch a raw webhook in one step
    pub async fn receive_and_dispatch(
        &self,
        payload: &[u8],
        signature: &str,
        mode: DispatchMode,
    ) -> Result<Outcome<R>> {
        let event = self.event(payload, signature)?;
        debug!(event_type = %event.event_type, event_id = %event.id, ?mode, "Webhook verified");

        Ok(self.dispatcher.dispatch_with(mode, event).await?)
    }

    fn receiver(&self) -> Result<&WebhookReceiver> {
        self.receiver.as_ref().ok_or_else(|| {
            WebhookError::ConfigError("Webhook secret is not configured".to_string())
        })
    }
}

impl<R> Clone for WebhookClient<R> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}
