//! Configuration for webhook verification

use crate::{EnvLoader, Result};

/// Prefix for configuration environment variables
pub const ENV_PREFIX: &str = "SWITCHYARD";

/// Configuration for receiving webhooks
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret used to verify webhook signatures
    pub webhook_secret: Option<String>,

    /// Timestamp tolerance for signature verification (in seconds, 0 disables the check)
    pub timestamp_tolerance: u64,

    /// Maximum payload size in bytes
    pub max_payload_size: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            timestamp_tolerance: 300,      // 5 minutes
            max_payload_size: 1024 * 1024, // 1MB
        }
    }
}

impl WebhookConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> WebhookConfigBuilder {
        WebhookConfigBuilder::new()
    }

    /// Load configuration from `SWITCHYARD_*` environment variables
    ///
    /// - `SWITCHYARD_WEBHOOK_SECRET`
    /// - `SWITCHYARD_WEBHOOK_TOLERANCE`
    /// - `SWITCHYARD_WEBHOOK_MAX_PAYLOAD`
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_loader(&EnvLoader::new(Some(ENV_PREFIX.to_string())))
    }

    /// Load configuration through the given loader
    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secret) = loader.load_var("webhook_secret") {
            config.webhook_secret = Some(secret);
        }
        if let Some(tolerance) = loader.parse_var("webhook_tolerance")? {
            config.timestamp_tolerance = tolerance;
        }
        if let Some(size) = loader.parse_var("webhook_max_payload")? {
            config.max_payload_size = size;
        }

        Ok(config)
    }
}

/// Builder for WebhookConfig
#[derive(Debug, Clone, Default)]
pub struct WebhookConfigBuilder {
    config: WebhookConfig,
}

impl WebhookConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: WebhookConfig::default(),
        }
    }

    /// Set the webhook signing secret
    pub fn webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.webhook_secret = Some(secret.into());
        self
    }

    /// Set timestamp tolerance for signature verification
    pub fn timestamp_tolerance(mut self, seconds: u64) -> Self {
        self.config.timestamp_tolerance = seconds;
        self
    }

    /// Set maximum payload size
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Build the configuration
    pub fn build(self) -> WebhookConfig {
        self.config
    }
}
