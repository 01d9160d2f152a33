// Valid/invalid notification callbacks

use crate::Host;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Called when a changed attribute passes validation
pub type ValidFn = Arc<dyn Fn(&dyn Host, &str) + Send + Sync>;

/// Called with the concatenated error text when a changed attribute fails
pub type InvalidFn = Arc<dyn Fn(&dyn Host, &str, &str) + Send + Sync>;

/// The callback pair in effect for one binding
#[derive(Clone)]
pub struct Callbacks {
    pub valid: ValidFn,
    pub invalid: InvalidFn,
}

impl Callbacks {
    /// Callbacks that only emit log events
    pub fn logging() -> Self {
        Self {
            valid: Arc::new(|_host: &dyn Host, attribute: &str| {
                debug!(attribute, "attribute valid");
            }),
            invalid: Arc::new(|_host: &dyn Host, attribute: &str, error: &str| {
                debug!(attribute, error, "attribute invalid");
            }),
        }
    }

    /// Fill the entries `options` leaves unset from `self`
    pub fn merge(&self, options: BindOptions) -> Self {
        Self {
            valid: options.valid.unwrap_or_else(|| self.valid.clone()),
            invalid: options.invalid.unwrap_or_else(|| self.invalid.clone()),
        }
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::logging()
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

/// Per-binding callback overrides
#[derive(Clone, Default)]
pub struct BindOptions {
    pub valid: Option<ValidFn>,
    pub invalid: Option<InvalidFn>,
}

impl BindOptions {
    /// No overrides: the validator's default callbacks apply
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the `valid` callback
    pub fn valid<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Host, &str) + Send + Sync + 'static,
    {
        self.valid = Some(Arc::new(callback));
        self
    }

    /// Override the `invalid` callback
    pub fn invalid<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Host, &str, &str) + Send + Sync + 'static,
    {
        self.invalid = Some(Arc::new(callback));
        self
    }

    /// Route both callbacks to an [`ErrorDisplay`]
    pub fn display(mut self, display: &Arc<ErrorDisplay>) -> Self {
        let on_valid = Arc::clone(display);
        let on_invalid = Arc::clone(display);
        self.valid = Some(Arc::new(move |_host: &dyn Host, attribute: &str| {
            on_valid.clear(attribute);
        }));
        self.invalid = Some(Arc::new(
            move |_host: &dyn Host, attribute: &str, error: &str| {
                on_invalid.mark_invalid(attribute, error);
            },
        ));
        self
    }
}

/// Per-field error state of a presentation layer.
///
/// A field marked invalid carries its error text; clearing it removes both.
#[derive(Debug, Default)]
pub struct ErrorDisplay {
    fields: DashMap<String, String>,
}

impl ErrorDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a field invalid and attach its error text
    pub fn mark_invalid(&self, attribute: &str, error: &str) {
        self.fields.insert(attribute.to_string(), error.to_string());
    }

    /// Remove the invalid mark and error text of a field
    pub fn clear(&self, attribute: &str) {
        self.fields.remove(attribute);
    }

    pub fn is_invalid(&self, attribute: &str) -> bool {
        self.fields.contains_key(attribute)
    }

    /// Error text attached to a field
    pub fn error(&self, attribute: &str) -> Option<String> {
        self.fields.get(attribute).map(|e| e.value().clone())
    }

    /// Fields currently marked invalid, sorted
    pub fn invalid_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.fields.iter().map(|e| e.key().clone()).collect();
        fields.sort();
        fields
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        for name in self.invalid_fields() {
            if let Some(error) = self.error(&name) {
                fields.insert(name, serde_json::Value::String(error));
            }
        }
        serde_json::json!({ "invalid": fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Declarations, Model};

    #[test]
    fn test_display_marks_and_clears() {
        let display = ErrorDisplay::new();
        display.mark_invalid("name", "name is required");

        assert!(display.is_invalid("name"));
        assert_eq!(display.error("name").as_deref(), Some("name is required"));

        display.clear("name");
        assert!(!display.is_invalid("name"));
        assert_eq!(display.error("name"), None);
    }

    #[test]
    fn test_display_json() {
        let display = ErrorDisplay::new();
        display.mark_invalid("b", "bad b");
        display.mark_invalid("a", "bad a");

        assert_eq!(display.invalid_fields(), vec!["a", "b"]);
        let json = display.to_json();
        assert_eq!(json["invalid"]["a"], "bad a");
    }

    #[test]
    fn test_merge_prefers_options() {
        let display = Arc::new(ErrorDisplay::new());
        let callbacks = Callbacks::logging().merge(BindOptions::new().display(&display));
        let model = Model::new(Declarations::new());

        (callbacks.invalid)(&model, "age", "too young");
        assert!(display.is_invalid("age"));

        (callbacks.valid)(&model, "age");
        assert!(!display.is_invalid("age"));
    }

    #[test]
    fn test_merge_falls_back_per_entry() {
        let display = Arc::new(ErrorDisplay::new());
        let defaults = BindOptions::new().display(&display);
        let defaults = Callbacks::logging().merge(defaults);

        let merged = defaults.merge(BindOptions::new().valid(|_, _| {}));
        let model = Model::new(Declarations::new());

        (merged.invalid)(&model, "age", "too young");
        assert!(display.is_invalid("age"));

        // the overridden `valid` no longer clears the display
        (merged.valid)(&model, "age");
        assert!(display.is_invalid("age"));
    }
}
