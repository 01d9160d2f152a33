// Validation errors

use std::fmt;

/// A single rule violation on one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Attribute that failed validation
    pub field: String,

    /// Human-readable error text
    pub message: String,

    /// Name of the rule that failed
    pub constraint: String,

    /// Rendered candidate value (optional)
    pub value: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the rendered value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Ordered collection of rule violations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Concatenated error text, in rule order, with no separator.
    ///
    /// This is the string handed to `invalid` callbacks. An empty string
    /// means the attribute passed.
    pub fn message(&self) -> String {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "message": e.message,
                    "constraint": e.constraint,
                    "value": e.value,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Declaration defects detected when a validator is bound to a host
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("Unknown rule '{rule}' declared on attribute '{attribute}'")]
    UnknownRule { attribute: String, rule: String },

    #[error("Invalid parameter for rule '{rule}' on attribute '{attribute}': {reason}")]
    InvalidParameter {
        attribute: String,
        rule: String,
        reason: String,
    },

    #[error("Invalid pattern '{pattern}' declared on attribute '{attribute}': {reason}")]
    InvalidPattern {
        attribute: String,
        pattern: String,
        reason: String,
    },
}
