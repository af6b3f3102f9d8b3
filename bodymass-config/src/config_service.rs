// ConfigService - High-level configuration service

use crate::{ConfigManager, FileFormat, FormDefinition, Result};
use bodymass_log::warn;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Section holding the form definition.
pub const FORM_SECTION: &str = "form";

/// High-level configuration service
#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    manager: ConfigManager,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manager(manager: ConfigManager) -> Self {
        Self { manager }
    }

    pub fn builder() -> ConfigServiceBuilder {
        ConfigServiceBuilder::new()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.manager.get(key)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.manager.get_or(key, default)
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.manager.get_string(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.manager.get_int(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.manager.get_bool(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.manager.has(key)
    }

    /// The `[form]` section, or an empty definition when there is none.
    pub fn form(&self) -> Result<FormDefinition> {
        if !self.manager.has(FORM_SECTION) {
            return Ok(FormDefinition::default());
        }
        FormDefinition::from_manager(&self.manager, FORM_SECTION)
    }

    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }
}

/// Builder for ConfigService
#[derive(Debug, Default)]
pub struct ConfigServiceBuilder {
    manager: ConfigManager,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    config_files: Vec<(PathBuf, Option<FileFormat>)>,
}

impl ConfigServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.manager = ConfigManager::with_prefix(prefix);
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Enable loading from .env file
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add configuration file to load
    pub fn add_file(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.config_files.push((path.into(), Some(format)));
        self
    }

    /// Add a file whose format is detected from its extension
    pub fn add_auto_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push((path.into(), None));
        self
    }

    /// Load every source in order: .env, environment, then files.
    ///
    /// Later sources override earlier ones.
    pub fn build(self) -> Result<ConfigService> {
        if self.load_dotenv
            && let Err(e) = self.manager.load_dotenv(self.dotenv_path.as_deref())
        {
            warn!({ error = e }, "skipping .env file");
        }

        if self.load_env {
            self.manager.load_env()?;
        }

        for (path, format) in self.config_files {
            match format {
                Some(format) => self.manager.load_file(&path, format)?,
                None => self.manager.load_auto(&path)?,
            }
        }

        Ok(ConfigService::from_manager(self.manager))
    }
}
