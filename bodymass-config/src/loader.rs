// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Format of `path`, judged by its extension or a `.env` file name.
    pub fn detect(path: &Path) -> Result<Self> {
        if path.file_name().and_then(|n| n.to_str()) == Some(".env") {
            return Ok(FileFormat::Env);
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("No file extension found: {}", path.display()))
            })?;

        FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))
    }
}

/// Reads JSON, TOML or dotenv content into a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        FileFormat::detect(path.as_ref()).map(Self::new)
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => parse_json(content),
            FileFormat::Toml => parse_toml(content),
            FileFormat::Env => Ok(parse_env(content)),
        }
    }
}

fn parse_json(content: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?;

    if !value.is_object() {
        return Err(ConfigError::ParseError(
            "JSON configuration must be an object".to_string(),
        ));
    }
    Ok(value)
}

fn parse_toml(content: &str) -> Result<Value> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    serde_json::to_value(table)
        .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
}

fn parse_env(content: &str) -> Value {
    let map = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim().trim_start_matches("export ").trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.to_string(), Value::String(value.to_string()))
        })
        .collect();

    Value::Object(map)
}
