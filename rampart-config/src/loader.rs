// Declaration file loaders

use crate::{ConfigDocument, ConfigError, Result, ValidationConfig};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported declaration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Reads validation configuration from JSON or TOML.
///
/// Attribute order in the file is kept, so rules run in the order they are
/// written.
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load validation configuration from a file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ValidationConfig> {
        self.load_document(path).map(ConfigDocument::into_config)
    }

    /// Load a file without resolving its settings against defaults
    pub fn load_document(&self, path: impl AsRef<Path>) -> Result<ConfigDocument> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("Failed to read file: {}", e)))?;

        let document = self.parse_document(&content)?;
        debug!(
            path = %path.display(),
            attributes = document.attributes.len(),
            "loaded validation config"
        );
        Ok(document)
    }

    /// Parse validation configuration from a string
    pub fn parse(&self, content: &str) -> Result<ValidationConfig> {
        self.parse_document(content).map(ConfigDocument::into_config)
    }

    /// Parse a string without resolving its settings against defaults
    pub fn parse_document(&self, content: &str) -> Result<ConfigDocument> {
        serde_json::from_value(self.parse_value(content)?)
            .map_err(|e| ConfigError::ParseError(format!("Invalid validation config: {}", e)))
    }

    /// Parse a document into a JSON value without interpreting it
    pub fn parse_value(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => self.parse_json(content),
            FileFormat::Toml => self.parse_toml(content),
        }
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        serde_json::to_value(toml_value)
            .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
    }
}
