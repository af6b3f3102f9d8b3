// Configuration management for bodymass

pub mod config_service;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use config_service::{ConfigService, ConfigServiceBuilder};
pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{FormDefinition, Validate};

use bodymass_log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Main configuration manager
///
/// Values are stored by top-level key. Lookups also accept dotted paths
/// into nested sections, so `form.rules` reads the `rules` table of `form`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: None,
        }
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;
        debug!({ count = env_vars.len() }, "loaded environment variables");

        let mut config = self.write()?;
        for (key, value) in env_vars {
            config.insert(key, Value::String(value));
        }

        Ok(())
    }

    /// Load a .env file into the process environment, then the environment
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                // A missing .env is not an error
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::new(format).load_file(path)?;
        debug!({ path = path.display(), format = format!("{:?}", format) }, "loaded config file");

        let mut config = self.write()?;
        if let Value::Object(map) = data {
            for (key, value) in map {
                config.insert(key, value);
            }
        }

        Ok(())
    }

    /// Load a file, picking the format from its extension
    pub fn load_auto(&self, path: impl AsRef<Path>) -> Result<()> {
        let format = FileFormat::detect(path.as_ref())?;
        self.load_file(path, format)
    }

    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.write()?.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get a configuration value
    ///
    /// String values that hold JSON scalars also read as those scalars, so
    /// an environment value of `"42"` can be read as an integer.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .lookup(key)?
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) => Ok(typed),
            Err(e) => match &value {
                Value::String(raw) => serde_json::from_str(raw)
                    .map_err(|_| ConfigError::DeserializationError(e.to_string())),
                _ => Err(ConfigError::DeserializationError(e.to_string())),
            },
        }
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    /// Check if a key or dotted path exists
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).ok().flatten().is_some()
    }

    /// Top-level keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .read()
            .map(|config| config.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Copy every entry of `other` into this manager, replacing same keys
    pub fn merge(&self, other: &ConfigManager) -> Result<()> {
        if Arc::ptr_eq(&self.config, &other.config) {
            return Ok(());
        }

        let other_config = other.read()?;
        let mut config = self.write()?;
        for (key, value) in other_config.iter() {
            config.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    /// Deserialize the whole configuration and run its own checks
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let json_value = Value::Object(
            self.read()?
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        let validated: T = serde_json::from_value(json_value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }

    /// Value at a top-level key or dotted path.
    pub(crate) fn lookup(&self, key: &str) -> Result<Option<Value>> {
        let config = self.read()?;
        if let Some(value) = config.get(key) {
            return Ok(Some(value.clone()));
        }

        let mut parts = key.split('.');
        let Some(mut current) = parts.next().and_then(|first| config.get(first)) else {
            return Ok(None);
        };
        for part in parts {
            match current.get(part) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Value>>> {
        self.config.read().map_err(|_| ConfigError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Value>>> {
        self.config.write().map_err(|_| ConfigError::LockPoisoned)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
