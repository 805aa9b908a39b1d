//! Webhook event envelope

use crate::{Result, WebhookError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use switchyard_events::Event;
use uuid::Uuid;

/// A verified webhook event
///
/// Mirrors the Stripe event envelope: the `type` field selects the handlers,
/// `data.object` carries the resource the event is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Unique identifier of the event
    pub id: String,

    /// Event type (e.g., "customer.created", "checkout.session.completed")
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred
    #[serde(default = "Utc::now", with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,

    /// Whether the event originates from live mode
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// The event data
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WebhookEvent {
    /// Create a new event with the given type
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: format!("evt_{}", Uuid::new_v4().simple()),
            event_type: event_type.into(),
            created: Utc::now(),
            livemode: false,
            api_version: None,
            data: serde_json::Value::Null,
        }
    }

    /// Set the event data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Wrap a resource as `data.object`
    pub fn with_object(self, object: serde_json::Value) -> Self {
        self.with_data(serde_json::json!({ "object": object }))
    }

    /// Set a custom ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set live mode
    pub fn with_livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    /// The resource the event is about, if present
    pub fn object(&self) -> Option<&serde_json::Value> {
        self.data.get("object")
    }

    /// Deserialize `data.object` into a concrete type
    pub fn object_as<T: DeserializeOwned>(&self) -> Result<T> {
        let object = self.object().ok_or_else(|| {
            WebhookError::PayloadError(format!("Event {} has no data.object", self.id))
        })?;
        Ok(T::deserialize(object)?)
    }

    /// Parse an event from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Convert to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Event for WebhookEvent {
    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn event_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}
