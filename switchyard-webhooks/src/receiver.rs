//! Webhook receiver for verifying and parsing incoming webhooks

use crate::signature::headers;
use crate::{Result, WebhookConfig, WebhookError, WebhookEvent, WebhookSignature};
use std::collections::HashMap;

/// Receiver for incoming webhooks
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    signature: WebhookSignature,
    timestamp_tolerance: u64,
    max_payload_size: usize,
}

impl WebhookReceiver {
    /// Create a new receiver with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        let defaults = WebhookConfig::default();
        Self {
            signature: WebhookSignature::new(secret),
            timestamp_tolerance: defaults.timestamp_tolerance,
            max_payload_size: defaults.max_payload_size,
        }
    }

    /// Create a receiver from configuration
    ///
    /// Fails if no webhook secret is configured.
    pub fn from_config(config: &WebhookConfig) -> Result<Self> {
        let secret = config.webhook_secret.as_deref().ok_or_else(|| {
            WebhookError::ConfigError("Webhook secret is not configured".to_string())
        })?;

        Ok(Self::new(secret)
            .with_tolerance(config.timestamp_tolerance)
            .with_max_payload_size(config.max_payload_size))
    }

    /// Set the timestamp tolerance in seconds
    pub fn with_tolerance(mut self, seconds: u64) -> Self {
        self.timestamp_tolerance = seconds;
        self
    }

    /// Set the maximum accepted payload size
    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Verify an incoming webhook signature
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<()> {
        if payload.len() > self.max_payload_size {
            return Err(WebhookError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_size,
            });
        }

        self.signature
            .verify(payload, signature, self.timestamp_tolerance)
    }

    /// Verify and parse an incoming webhook
    pub fn receive(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent> {
        self.verify(payload, signature)?;
        WebhookEvent::from_slice(payload)
    }

    /// Verify and parse a webhook using the signature found in the headers
    ///
    /// Header names are matched case-insensitively, in this order:
    /// - Stripe-Signature
    /// - X-Webhook-Signature
    /// - X-Hub-Signature-256
    pub fn receive_from_headers(
        &self,
        payload: &[u8],
        headers: &HashMap<String, String>,
    ) -> Result<WebhookEvent> {
        let signature = find_signature(headers).ok_or(WebhookError::SignatureMissing)?;
        self.receive(payload, signature)
    }
}

fn find_signature(request_headers: &HashMap<String, String>) -> Option<&str> {
    headers::SIGNATURE_HEADERS.iter().find_map(|name| {
        request_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    })
}
