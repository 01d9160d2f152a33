// In-memory host

use crate::{Attributes, Declarations, Host, MutationHook};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Update refused by the installed mutation hook
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("update rejected by validation: {}", .attributes.join(", "))]
pub struct Rejected {
    /// Attributes carried by the refused update
    pub attributes: Vec<String>,
}

/// Attribute store that routes every `set` through its mutation hook.
///
/// Rejected updates are not applied.
pub struct Model {
    attributes: Attributes,
    declarations: Declarations,
    hook: Option<Arc<dyn MutationHook>>,
}

impl Model {
    /// Create an empty model with the given declarations
    pub fn new(declarations: Declarations) -> Self {
        Self {
            attributes: Attributes::new(),
            declarations,
            hook: None,
        }
    }

    /// Seed initial attribute values without validation
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Attempt an update.
    ///
    /// # Examples
    ///
    /// ```
    /// use rampart_validation::{BindOptions, Declarations, Model, RuleSet, Validator};
    /// use serde_json::json;
    ///
    /// let mut model = Model::new(
    ///     Declarations::new().attribute("name", RuleSet::new().rule("required", true)),
    /// );
    /// Validator::new().bind(&mut model, BindOptions::new()).unwrap();
    ///
    /// assert!(model.set_value("name", "").is_err());
    /// assert!(model.set_value("name", "Ada").is_ok());
    /// assert_eq!(model.get("isValid"), Some(&json!(true)));
    /// ```
    pub fn set(&mut self, attributes: Attributes) -> Result<(), Rejected> {
        if let Some(hook) = self.hook.clone() {
            if hook.validate(self, &attributes) {
                return Err(Rejected {
                    attributes: attributes.keys().cloned().collect(),
                });
            }
        }

        self.attributes.extend(attributes);
        Ok(())
    }

    /// Attempt an update of a single attribute
    pub fn set_value(
        &mut self,
        attribute: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), Rejected> {
        let mut attributes = Attributes::new();
        attributes.insert(attribute.into(), value.into());
        self.set(attributes)
    }

    /// Current value of an attribute
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// All stored attributes
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Validation declarations of this model
    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// Whether a mutation hook is installed
    pub fn is_bound(&self) -> bool {
        self.hook.is_some()
    }
}

impl Host for Model {
    fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    fn store(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }

    fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    fn hook(&self) -> Option<Arc<dyn MutationHook>> {
        self.hook.clone()
    }

    fn replace_hook(
        &mut self,
        hook: Option<Arc<dyn MutationHook>>,
    ) -> Option<Arc<dyn MutationHook>> {
        std::mem::replace(&mut self.hook, hook)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("attributes", &self.attributes)
            .field("declarations", &self.declarations)
            .field("bound", &self.hook.is_some())
            .finish()
    }
}
