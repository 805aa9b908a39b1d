// Environment variable loading

use crate::{Result, WebhookError};
use std::collections::HashMap;
use std::env;

/// Environment variable loader
///
/// Reads `<PREFIX>_<KEY>` from the process environment, or from a fixed set
/// of variables when one is supplied.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
    vars: Option<HashMap<String, String>>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix, vars: None }
    }

    /// Read from the given variables instead of the process environment
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific variable, `None` if unset
    pub fn load_var(&self, key: &str) -> Option<String> {
        let full_key = self.full_key(key);
        match self.vars {
            Some(ref vars) => vars.get(&full_key).cloned(),
            None => env::var(&full_key).ok(),
        }
    }

    /// Load and parse a specific variable, `None` if unset
    pub fn parse_var<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.load_var(key)
            .map(|raw| {
                raw.trim().parse().map_err(|e| {
                    WebhookError::ConfigError(format!(
                        "Invalid value for {}: {}",
                        self.full_key(key),
                        e
                    ))
                })
            })
            .transpose()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
