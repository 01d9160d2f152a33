// Environment variable loading

use crate::{ConfigError, Result};
use rampart_validation::ValidatorSettings;
use std::env;
use tracing::debug;

/// Prefix used by [`settings_from_env`]
pub const DEFAULT_ENV_PREFIX: &str = "RAMPART";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load a specific environment variable, `PREFIX_KEY` when prefixed
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Override `settings` with whatever the environment sets.
    ///
    /// Reads `FLAG_ATTRIBUTE`, `STRICT_RULES` and `LOG_EVENTS` under the
    /// prefix. Unset variables leave the corresponding setting alone.
    pub fn apply_settings(&self, mut settings: ValidatorSettings) -> Result<ValidatorSettings> {
        if let Some(flag) = self.optional_var("FLAG_ATTRIBUTE")? {
            if flag.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: self.full_key("FLAG_ATTRIBUTE"),
                    value: flag,
                });
            }
            settings.flag_attribute = flag.trim().to_string();
        }
        if let Some(strict) = self.optional_bool("STRICT_RULES")? {
            settings.strict_rules = strict;
        }
        if let Some(log_events) = self.optional_bool("LOG_EVENTS")? {
            settings.log_events = log_events;
        }

        debug!(?settings, "applied environment settings");
        Ok(settings)
    }

    fn full_key(&self, key: &str) -> String {
        if let Some(ref prefix) = self.prefix {
            format!("{}_{}", prefix, key.to_uppercase())
        } else {
            key.to_uppercase()
        }
    }

    fn optional_var(&self, key: &str) -> Result<Option<String>> {
        match self.load_var(key) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::EnvError(env::VarError::NotPresent)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.optional_var(key)? else {
            return Ok(None);
        };
        parse_bool(&value).map(Some).ok_or_else(|| ConfigError::InvalidValue {
            key: self.full_key(key),
            value,
        })
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_ENV_PREFIX.to_string()))
    }
}

/// Validator settings from a `.env` file (if any) and `RAMPART_*` variables
pub fn settings_from_env() -> Result<ValidatorSettings> {
    dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
    EnvLoader::default().apply_settings(ValidatorSettings::default())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
