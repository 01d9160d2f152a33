// Named rule registry

use crate::{BindError, ValidationError};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Everything a rule sees when it checks one candidate value.
#[derive(Clone, Copy)]
pub struct RuleInput<'a> {
    /// Candidate value (`Null` when the attribute is unset)
    pub value: &'a Value,

    /// Attribute being validated
    pub attribute: &'a str,

    /// Shared message override declared for the attribute
    pub message: Option<&'a str>,

    /// Parameter declared for this rule
    pub parameter: &'a Value,

    /// Registry the rule was resolved from, for named pattern lookup
    pub registry: &'a RuleRegistry,
}

impl<'a> RuleInput<'a> {
    /// Build a failure for `constraint`, preferring the shared message over
    /// the rule's default text.
    pub fn fail(&self, constraint: &str, default_message: impl FnOnce() -> String) -> ValidationError {
        let message = match self.message {
            Some(msg) => msg.to_string(),
            None => default_message(),
        };

        ValidationError::new(self.attribute, message)
            .with_constraint(constraint)
            .with_value(self.value.to_string())
    }
}

/// A named, parameterized predicate over a candidate value
pub trait Rule: Send + Sync {
    /// Name the rule is registered under
    fn name(&self) -> &str;

    /// Check a candidate value
    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError>;

    /// Check a declared parameter before binding
    fn check_parameter(
        &self,
        _attribute: &str,
        _parameter: &Value,
        _registry: &RuleRegistry,
    ) -> Result<(), BindError> {
        Ok(())
    }
}

type CheckFn = Arc<dyn Fn(&RuleInput<'_>) -> Result<(), ValidationError> + Send + Sync>;

/// Closure-backed rule for caller-defined checks
#[derive(Clone)]
pub struct FnRule {
    name: String,
    check: CheckFn,
}

impl FnRule {
    /// Create a new rule from a closure
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RuleInput<'_>) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }
}

impl Rule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        (self.check)(input)
    }
}

/// Table of named rules and named regular expressions.
///
/// Registries are plain values: build one, share it behind an `Arc`, and
/// hand it to a [`Validator`](crate::Validator). Nothing here is global.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<dyn Rule>>,
    patterns: HashMap<String, Regex>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in rules and patterns
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::validators::install(&mut registry);
        registry
    }

    /// Add a rule, replacing any rule with the same name
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.register(Arc::new(rule));
        self
    }

    /// Register a rule in place
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.insert(rule.name().to_string(), rule);
    }

    /// Add a named pattern
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: Regex) -> Self {
        self.insert_pattern(name, pattern);
        self
    }

    /// Register a compiled pattern in place
    pub fn insert_pattern(&mut self, name: impl Into<String>, pattern: Regex) {
        self.patterns.insert(name.into(), pattern);
    }

    /// Compile and register a named pattern in place
    pub fn add_pattern(&mut self, name: impl Into<String>, pattern: &str) -> Result<(), regex::Error> {
        self.insert_pattern(name, Regex::new(pattern)?);
        Ok(())
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules.get(name).cloned()
    }

    /// Check whether a rule is registered
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Look up a named pattern
    pub fn pattern(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }

    /// Registered rule names, sorted
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut patterns: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        patterns.sort_unstable();

        f.debug_struct("RuleRegistry")
            .field("rules", &self.rule_names())
            .field("patterns", &patterns)
            .finish()
    }
}
