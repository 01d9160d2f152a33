// Validator settings

use serde::{Deserialize, Serialize};

/// Attribute the aggregate validity flag is stored under by default
pub const DEFAULT_FLAG_ATTRIBUTE: &str = "isValid";

/// Validator behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Attribute receiving the aggregate validity flag. Updates naming it are
    /// always rejected.
    pub flag_attribute: String,

    /// Reject declarations naming unregistered rules or carrying bad
    /// parameters when binding
    pub strict_rules: bool,

    /// Emit per-attribute log events from bound hooks
    pub log_events: bool,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            flag_attribute: DEFAULT_FLAG_ATTRIBUTE.to_string(),
            strict_rules: true,
            log_events: true,
        }
    }
}

impl ValidatorSettings {
    /// Set the flag attribute
    pub fn with_flag_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.flag_attribute = attribute.into();
        self
    }

    /// Enable or disable strict rule checking
    pub fn strict_rules(mut self, enabled: bool) -> Self {
        self.strict_rules = enabled;
        self
    }

    /// Enable or disable per-attribute log events
    pub fn log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }
}
