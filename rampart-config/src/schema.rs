// Validation configuration and its builder

use crate::{ConfigLoader, EnvLoader, Result};
use rampart_validation::{Declarations, Model, RuleRegistry, Validator, ValidatorSettings};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Settings a single file declares. Absent keys leave earlier values alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub flag_attribute: Option<String>,
    pub strict_rules: Option<bool>,
    pub log_events: Option<bool>,
}

impl SettingsOverrides {
    /// Write the declared values over `settings`
    pub fn apply(&self, settings: &mut ValidatorSettings) {
        if let Some(flag) = &self.flag_attribute {
            settings.flag_attribute = flag.clone();
        }
        if let Some(strict) = self.strict_rules {
            settings.strict_rules = strict;
        }
        if let Some(log_events) = self.log_events {
            settings.log_events = log_events;
        }
    }
}

/// One parsed configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    pub settings: SettingsOverrides,
    pub attributes: Declarations,
}

impl ConfigDocument {
    /// Resolve against default settings
    pub fn into_config(self) -> ValidationConfig {
        let mut config = ValidationConfig::default();
        config.merge(self);
        config
    }
}

/// Validator settings plus attribute declarations
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    pub settings: ValidatorSettings,
    pub attributes: Declarations,
}

impl ValidationConfig {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Fold a parsed file into `self`.
    ///
    /// Only the settings the file declares are replaced. Attributes it
    /// declares replace ours in place; new ones are appended.
    pub fn merge(&mut self, document: ConfigDocument) {
        document.settings.apply(&mut self.settings);
        for (name, declaration) in document.attributes.iter() {
            self.attributes.insert(name, declaration.clone());
        }
    }

    /// Validator using these settings and the built-in rules
    pub fn validator(&self) -> Validator {
        self.validator_with(RuleRegistry::with_defaults())
    }

    /// Validator using these settings and `registry`
    pub fn validator_with(&self, registry: RuleRegistry) -> Validator {
        Validator::with_registry(registry).with_settings(self.settings.clone())
    }

    /// Empty model carrying these declarations
    pub fn model(&self) -> Model {
        Model::new(self.attributes.clone())
    }
}

/// Builder assembling a [`ValidationConfig`] from files and the environment.
///
/// Files merge in the order added; environment overrides apply last.
pub struct ConfigBuilder {
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            env_prefix: None,
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
        }
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Apply environment overrides to the settings
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Read a .env file before the environment. Implies [`Self::load_env`].
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.load_env = true;
        self.dotenv_path = path;
        self
    }

    /// Add a declaration file; the format follows its extension
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn build(self) -> Result<ValidationConfig> {
        let mut config = ValidationConfig::default();

        for path in &self.files {
            let loaded = ConfigLoader::auto(path)?.load_document(path)?;
            config.merge(loaded);
        }

        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path)
                        .map_err(|e| crate::ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
                }
            }
        }

        if self.load_env {
            let prefix = self
                .env_prefix
                .unwrap_or_else(|| crate::DEFAULT_ENV_PREFIX.to_string());
            config.settings = EnvLoader::new(Some(prefix)).apply_settings(config.settings)?;
        }

        debug!(
            files = self.files.len(),
            attributes = config.attributes.len(),
            "validation config built"
        );
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
