//! Webhook signature generation and verification
//!
//! Signatures use the `t=<unix timestamp>,v1=<hex hmac>` header format, where
//! the HMAC-SHA256 is computed over `"<timestamp>.<payload>"`. Several `v1`
//! entries may be present while a secret is being rotated; any match is
//! accepted.

use crate::{Result, WebhookError};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Webhook signature utilities
#[derive(Debug, Clone)]
pub struct WebhookSignature {
    secret: String,
}

impl WebhookSignature {
    /// Create a new signature utility with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generate a signature header for the payload at the current time
    pub fn sign(&self, payload: &[u8]) -> Result<String> {
        self.sign_with_timestamp(payload, chrono::Utc::now().timestamp())
    }

    /// Generate a signature header with a specific timestamp
    pub fn sign_with_timestamp(&self, payload: &[u8], timestamp: i64) -> Result<String> {
        let mac = self.mac(timestamp, payload)?;
        Ok(format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    /// Verify a signature header against the payload
    ///
    /// A `tolerance_secs` of 0 skips the timestamp check.
    pub fn verify(&self, payload: &[u8], header: &str, tolerance_secs: u64) -> Result<()> {
        let parsed = SignatureHeader::parse(header)?;

        if tolerance_secs > 0 {
            let age = (chrono::Utc::now().timestamp() - parsed.timestamp).unsigned_abs();
            if age > tolerance_secs {
                return Err(WebhookError::TimestampInvalid(format!(
                    "Timestamp outside tolerance: {} seconds (tolerance: {} seconds)",
                    age, tolerance_secs
                )));
            }
        }

        let expected = self.mac(parsed.timestamp, payload)?;

        // verify_slice compares in constant time
        let matched = parsed
            .signatures
            .iter()
            .filter_map(|candidate| hex::decode(candidate).ok())
            .any(|candidate| expected.clone().verify_slice(&candidate).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::SignatureInvalid(
                "No signature matches the expected signature for the payload".to_string(),
            ))
        }
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| WebhookError::ConfigError(format!("Invalid webhook secret: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

/// Parsed signature header
#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", t)) => timestamp = Some(t),
                Some(("v1", v)) => signatures.push(v.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| WebhookError::SignatureInvalid("Missing timestamp".to_string()))?
            .parse()
            .map_err(|_| WebhookError::TimestampInvalid("Invalid timestamp format".to_string()))?;

        if signatures.is_empty() {
            return Err(WebhookError::SignatureInvalid(
                "Missing v1 signature".to_string(),
            ));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Header names that may carry the webhook signature
pub mod headers {
    /// Stripe signature header
    pub const STRIPE_SIGNATURE: &str = "Stripe-Signature";

    /// Generic signature header
    pub const SIGNATURE: &str = "X-Webhook-Signature";

    /// Alternative signature header (GitHub style)
    pub const SIGNATURE_ALT: &str = "X-Hub-Signature-256";

    /// Lookup order used by the receiver
    pub const SIGNATURE_HEADERS: [&str; 3] = [STRIPE_SIGNATURE, SIGNATURE, SIGNATURE_ALT];
}
