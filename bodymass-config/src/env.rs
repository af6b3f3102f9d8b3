// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix shared by every bodymass environment variable.
pub const DEFAULT_PREFIX: &str = "BODYMASS";

/// Environment variable loader
///
/// With a prefix, only `PREFIX_*` variables are read and the prefix is
/// stripped, so `BODYMASS_LOG_LEVEL` becomes `log_level`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.map(|p| p.trim_end_matches('_').to_uppercase()),
        }
    }

    /// A loader for `BODYMASS_*` variables.
    pub fn bodymass() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Load all matching environment variables, keys lower-cased.
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(env::vars()
            .filter_map(|(key, value)| self.strip(&key).map(|key| (key, value)))
            .collect())
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Variable name for a config key, e.g. `log_level` → `BODYMASS_LOG_LEVEL`.
    pub fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    fn strip(&self, var: &str) -> Option<String> {
        let key = match &self.prefix {
            Some(prefix) => var.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
            None => var,
        };
        (!key.is_empty()).then(|| key.to_lowercase())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
