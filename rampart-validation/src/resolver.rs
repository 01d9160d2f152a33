// Declaration resolution and execution

use crate::{
    AttributeDeclaration, BindError, CustomCheck, Declarations, Rule, RuleInput, RuleRegistry,
    ValidationErrors,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// One executable rule of an attribute
#[derive(Clone)]
pub struct RuleEntry<'a> {
    /// Declared rule name
    pub name: &'a str,

    /// Registered implementation, `None` when the name is unknown
    pub check: Option<Arc<dyn Rule>>,

    /// Declared parameter
    pub parameter: &'a Value,

    /// Shared message of the attribute
    pub message: Option<&'a str>,
}

impl fmt::Debug for RuleEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("name", &self.name)
            .field("resolved", &self.check.is_some())
            .field("parameter", self.parameter)
            .field("message", &self.message)
            .finish()
    }
}

/// What running an attribute's declaration amounts to
#[derive(Clone)]
pub enum ExecutableCheck<'a> {
    /// The declared custom check, unchanged
    Custom(&'a CustomCheck),

    /// Rule entries in declaration order
    Entries(Vec<RuleEntry<'a>>),
}

impl ExecutableCheck<'_> {
    /// Run against a candidate value.
    ///
    /// Failures with empty text count as passes. Entries without a resolved
    /// check are skipped.
    pub fn run(&self, value: &Value, attribute: &str, registry: &RuleRegistry) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        match self {
            Self::Custom(check) => {
                if let Err(error) = check(value, attribute) {
                    if !error.message.is_empty() {
                        errors.add(error);
                    }
                }
            }
            Self::Entries(entries) => {
                for entry in entries {
                    let Some(rule) = &entry.check else {
                        warn!(attribute, rule = entry.name, "skipping unregistered rule");
                        continue;
                    };

                    let input = RuleInput {
                        value,
                        attribute,
                        message: entry.message,
                        parameter: entry.parameter,
                        registry,
                    };
                    if let Err(error) = rule.check(&input) {
                        if !error.message.is_empty() {
                            errors.add(error);
                        }
                    }
                }
            }
        }

        errors
    }
}

impl fmt::Debug for ExecutableCheck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Entries(entries) => f.debug_tuple("Entries").field(entries).finish(),
        }
    }
}

/// Resolve an attribute declaration against a registry.
///
/// A missing declaration resolves to an empty entry list, so undeclared
/// attributes always pass.
pub fn resolve<'a>(
    declaration: Option<&'a AttributeDeclaration>,
    registry: &RuleRegistry,
) -> ExecutableCheck<'a> {
    match declaration {
        Some(AttributeDeclaration::Custom(check)) => ExecutableCheck::Custom(check),
        Some(AttributeDeclaration::Rules(rules)) => ExecutableCheck::Entries(
            rules
                .rules()
                .map(|(name, parameter)| RuleEntry {
                    name,
                    check: registry.get(name),
                    parameter,
                    message: rules.shared_message(),
                })
                .collect(),
        ),
        None => ExecutableCheck::Entries(Vec::new()),
    }
}

/// Resolve and run the declaration of `attribute` against `value`
pub fn check_value(
    declarations: &Declarations,
    attribute: &str,
    value: &Value,
    registry: &RuleRegistry,
) -> ValidationErrors {
    resolve(declarations.get(attribute), registry).run(value, attribute, registry)
}

/// Reject declarations naming unregistered rules or carrying bad parameters
pub fn verify(declarations: &Declarations, registry: &RuleRegistry) -> Result<(), BindError> {
    for (attribute, declaration) in declarations.iter() {
        let AttributeDeclaration::Rules(rules) = declaration else {
            continue;
        };

        for (name, parameter) in rules.rules() {
            let rule = registry.get(name).ok_or_else(|| BindError::UnknownRule {
                attribute: attribute.to_string(),
                rule: name.to_string(),
            })?;
            rule.check_parameter(attribute, parameter, registry)?;
        }
    }

    Ok(())
}
