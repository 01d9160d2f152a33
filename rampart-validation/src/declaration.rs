// Per-attribute validation declarations

use crate::ValidationError;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Reserved key holding the shared message of a rule set
pub const MESSAGE_KEY: &str = "msg";

/// Caller-supplied check standing in for a whole rule set
pub type CustomCheck = Arc<dyn Fn(&Value, &str) -> Result<(), ValidationError> + Send + Sync>;

/// Ordered rule-name to parameter pairs with an optional shared message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<(String, Value)>,
    message: Option<String>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a rule.
    ///
    /// Redeclaring a rule replaces its parameter and keeps its position.
    pub fn rule(mut self, name: impl Into<String>, parameter: impl Into<Value>) -> Self {
        self.push(name.into(), parameter.into());
        self
    }

    /// Set the message shared by every rule in the set
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn push(&mut self, name: String, parameter: Value) {
        match self.rules.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = parameter,
            None => self.rules.push((name, parameter)),
        }
    }

    /// Declared rules in declaration order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.rules.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Shared message, if declared
    pub fn shared_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rule names to parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RuleSet, A::Error> {
                let mut set = RuleSet::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == MESSAGE_KEY {
                        let message: String = map
                            .next_value()
                            .map_err(|_| de::Error::custom("`msg` must be a string"))?;
                        set.message = Some(message);
                    } else {
                        let parameter: Value = map.next_value()?;
                        set.push(key, parameter);
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

/// What one attribute is validated against
#[derive(Clone)]
pub enum AttributeDeclaration {
    /// A single caller-supplied check
    Custom(CustomCheck),

    /// Named rules looked up in a registry
    Rules(RuleSet),
}

impl AttributeDeclaration {
    /// Wrap a closure as a custom check
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(check))
    }
}

impl From<RuleSet> for AttributeDeclaration {
    fn from(rules: RuleSet) -> Self {
        Self::Rules(rules)
    }
}

impl fmt::Debug for AttributeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Rules(rules) => f.debug_tuple("Rules").field(rules).finish(),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeDeclaration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RuleSet::deserialize(deserializer).map(Self::Rules)
    }
}

/// Attribute name to declaration, in declaration order.
///
/// Declarations are fixed once a host is bound; nothing in this crate
/// mutates them.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    entries: Vec<(String, AttributeDeclaration)>,
}

impl Declarations {
    /// Create an empty declaration table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute
    ///
    /// # Examples
    ///
    /// ```
    /// use rampart_validation::{Declarations, RuleSet};
    ///
    /// let declarations = Declarations::new()
    ///     .attribute("name", RuleSet::new().rule("required", true))
    ///     .attribute("age", RuleSet::new().rule("min", 18).rule("max", 120));
    ///
    /// assert_eq!(declarations.len(), 2);
    /// ```
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        declaration: impl Into<AttributeDeclaration>,
    ) -> Self {
        self.insert(name, declaration);
        self
    }

    /// Declare an attribute validated by a single closure
    pub fn custom<F>(self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.attribute(name, AttributeDeclaration::custom(check))
    }

    /// Insert or replace a declaration in place
    pub fn insert(&mut self, name: impl Into<String>, declaration: impl Into<AttributeDeclaration>) {
        let name = name.into();
        let declaration = declaration.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = declaration,
            None => self.entries.push((name, declaration)),
        }
    }

    /// Look up the declaration of an attribute
    pub fn get(&self, attribute: &str) -> Option<&AttributeDeclaration> {
        self.entries
            .iter()
            .find(|(n, _)| n == attribute)
            .map(|(_, d)| d)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.get(attribute).is_some()
    }

    /// Declared attribute names in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeDeclaration)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for Declarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclarationsVisitor;

        impl<'de> Visitor<'de> for DeclarationsVisitor {
            type Value = Declarations;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to rule sets")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Declarations, A::Error> {
                let mut declarations = Declarations::new();
                while let Some((name, rules)) = map.next_entry::<String, RuleSet>()? {
                    declarations.insert(name, rules);
                }
                Ok(declarations)
            }
        }

        deserializer.deserialize_map(DeclarationsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_set_keeps_declaration_order() {
        let set = RuleSet::new()
            .rule("required", true)
            .rule("minLength", 3)
            .rule("maxLength", 8);

        let names: Vec<&str> = set.rules().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["required", "minLength", "maxLength"]);
    }

    #[test]
    fn test_redeclared_rule_keeps_position() {
        let set = RuleSet::new().rule("min", 1).rule("max", 9).rule("min", 5);

        let rules: Vec<(&str, &Value)> = set.rules().collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], ("min", &json!(5)));
    }

    #[test]
    fn test_deserialize_reserved_message_key() {
        let set: RuleSet =
            serde_json::from_value(json!({"max": 10, "msg": "Out of range", "min": 1})).unwrap();

        assert_eq!(set.shared_message(), Some("Out of range"));
        let names: Vec<&str> = set.rules().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["max", "min"]);
    }

    #[test]
    fn test_deserialize_rejects_non_string_message() {
        let result: Result<RuleSet, _> = serde_json::from_value(json!({"msg": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_declarations_in_document_order() {
        let declarations: Declarations = serde_json::from_str(
            r#"{"zip": {"pattern": "number"}, "age": {"min": 18}, "name": {"required": true}}"#,
        )
        .unwrap();

        let names: Vec<&str> = declarations.attributes().collect();
        assert_eq!(names, vec!["zip", "age", "name"]);
        assert!(matches!(
            declarations.get("age"),
            Some(AttributeDeclaration::Rules(_))
        ));
    }

    #[test]
    fn test_custom_declaration() {
        let declarations = Declarations::new().custom("code", |value, attribute| {
            if value.as_str() == Some("ok") {
                Ok(())
            } else {
                Err(ValidationError::new(attribute, "bad code"))
            }
        });

        match declarations.get("code") {
            Some(AttributeDeclaration::Custom(check)) => {
                assert!(check(&json!("ok"), "code").is_ok());
                assert!(check(&json!("no"), "code").is_err());
            }
            other => panic!("unexpected declaration: {:?}", other),
        }
    }

    #[test]
    fn test_insert_replaces() {
        let mut declarations = Declarations::new().attribute("a", RuleSet::new().rule("required", true));
        declarations.insert("a", RuleSet::new().rule("min", 1));

        assert_eq!(declarations.len(), 1);
        assert!(!declarations.contains("b"));
    }
}
