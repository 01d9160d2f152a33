// Built-in rules

use crate::{BindError, Rule, RuleInput, RuleRegistry, ValidationError};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

// Named patterns shipped with every default registry
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9_.\-])+@(([a-zA-Z0-9\-])+\.)+([a-zA-Z0-9]{2,4})+$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(https?|ftp)://[^\s/$.?#][^\s]*$").unwrap());

/// Register the built-in rules and named patterns
pub(crate) fn install(registry: &mut RuleRegistry) {
    registry.register(Arc::new(Required));
    registry.register(Arc::new(Min));
    registry.register(Arc::new(Max));
    registry.register(Arc::new(MinLength));
    registry.register(Arc::new(MaxLength));
    registry.register(Arc::new(Pattern::default()));

    registry.insert_pattern("number", NUMBER_REGEX.clone());
    registry.insert_pattern("email", EMAIL_REGEX.clone());
    registry.insert_pattern("url", URL_REGEX.clone());
}

/// Parse the leading base-10 integer of a value.
///
/// Strings are read the way a lenient integer parser reads them: leading
/// whitespace, an optional sign, then digits up to the first non-digit
/// (`"21abc"` is 21). Floats truncate toward zero. Anything else has no
/// integer reading.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (negative, digits) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            let n: i64 = digits[..end].parse().ok()?;
            Some(if negative { -n } else { n })
        }
        _ => None,
    }
}

/// Text form of a value as measured by the length rules
fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn numeric_parameter(attribute: &str, rule: &str, parameter: &Value) -> Result<(), BindError> {
    if parameter.is_number() {
        Ok(())
    } else {
        Err(BindError::InvalidParameter {
            attribute: attribute.to_string(),
            rule: rule.to_string(),
            reason: format!("expected a number, got {}", parameter),
        })
    }
}

fn length_parameter(attribute: &str, rule: &str, parameter: &Value) -> Result<(), BindError> {
    if parameter.is_u64() {
        Ok(())
    } else {
        Err(BindError::InvalidParameter {
            attribute: attribute.to_string(),
            rule: rule.to_string(),
            reason: format!("expected a non-negative integer, got {}", parameter),
        })
    }
}

/// Fails on null, unset, blank strings and `false`
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        let missing = match input.value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Bool(b) => !b,
            _ => false,
        };

        if missing {
            Err(input.fail("required", || format!("{} is required", input.attribute)))
        } else {
            Ok(())
        }
    }
}

/// Fails when the integer reading is below the parameter
pub struct Min;

impl Rule for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        let bound = input.parameter.as_f64().unwrap_or(f64::NAN);
        match parse_int(input.value) {
            Some(n) if (n as f64) >= bound => Ok(()),
            _ => Err(input.fail("min", || {
                format!(
                    "{} must be larger than or equal to {}",
                    input.attribute, input.parameter
                )
            })),
        }
    }

    fn check_parameter(
        &self,
        attribute: &str,
        parameter: &Value,
        _registry: &RuleRegistry,
    ) -> Result<(), BindError> {
        numeric_parameter(attribute, "min", parameter)
    }
}

/// Fails when the integer reading is above the parameter
pub struct Max;

impl Rule for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        let bound = input.parameter.as_f64().unwrap_or(f64::NAN);
        match parse_int(input.value) {
            Some(n) if (n as f64) <= bound => Ok(()),
            _ => Err(input.fail("max", || {
                format!(
                    "{} must be less than or equal to {}",
                    input.attribute, input.parameter
                )
            })),
        }
    }

    fn check_parameter(
        &self,
        attribute: &str,
        parameter: &Value,
        _registry: &RuleRegistry,
    ) -> Result<(), BindError> {
        numeric_parameter(attribute, "max", parameter)
    }
}

/// Fails when the trimmed text is shorter than the parameter
pub struct MinLength;

impl Rule for MinLength {
    fn name(&self) -> &str {
        "minLength"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        let min = input.parameter.as_u64().unwrap_or(0);
        if (text_of(input.value).chars().count() as u64) < min {
            Err(input.fail("minLength", || {
                format!(
                    "{} must be longer than or equal to {} characters",
                    input.attribute, min
                )
            }))
        } else {
            Ok(())
        }
    }

    fn check_parameter(
        &self,
        attribute: &str,
        parameter: &Value,
        _registry: &RuleRegistry,
    ) -> Result<(), BindError> {
        length_parameter(attribute, "minLength", parameter)
    }
}

/// Fails when the trimmed text is longer than the parameter
pub struct MaxLength;

impl Rule for MaxLength {
    fn name(&self) -> &str {
        "maxLength"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        let max = input.parameter.as_u64().unwrap_or(u64::MAX);
        if (text_of(input.value).chars().count() as u64) > max {
            Err(input.fail("maxLength", || {
                format!(
                    "{} must be shorter than or equal to {} characters",
                    input.attribute, max
                )
            }))
        } else {
            Ok(())
        }
    }

    fn check_parameter(
        &self,
        attribute: &str,
        parameter: &Value,
        _registry: &RuleRegistry,
    ) -> Result<(), BindError> {
        length_parameter(attribute, "maxLength", parameter)
    }
}

/// Matches string values against a named pattern or a literal regex.
///
/// The parameter is looked up among the registry's named patterns first and
/// compiled as a regular expression otherwise. Non-string values pass.
/// Literal regexes are compiled once and reused.
#[derive(Default)]
pub struct Pattern {
    compiled: DashMap<String, Regex>,
}

impl Pattern {
    /// Compiled form of a literal regex parameter
    fn literal(&self, source: &str) -> Result<Regex, regex::Error> {
        if let Some(regex) = self.compiled.get(source) {
            return Ok(regex.value().clone());
        }
        let regex = Regex::new(source)?;
        self.compiled.insert(source.to_string(), regex.clone());
        Ok(regex)
    }
}

impl Rule for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), ValidationError> {
        let Value::String(text) = input.value else {
            return Ok(());
        };
        let Some(name) = input.parameter.as_str() else {
            tracing::warn!(
                attribute = input.attribute,
                "pattern parameter is not a string, skipping"
            );
            return Ok(());
        };

        let matched = match input.registry.pattern(name) {
            Some(regex) => regex.is_match(text),
            None => match self.literal(name) {
                Ok(regex) => regex.is_match(text),
                Err(e) => {
                    tracing::warn!(
                        attribute = input.attribute,
                        pattern = name,
                        "pattern does not compile, skipping: {}",
                        e
                    );
                    return Ok(());
                }
            },
        };

        if matched {
            Ok(())
        } else {
            Err(input.fail("pattern", || {
                format!("{} is not a valid {}", input.attribute, name)
            }))
        }
    }

    fn check_parameter(
        &self,
        attribute: &str,
        parameter: &Value,
        registry: &RuleRegistry,
    ) -> Result<(), BindError> {
        let Some(name) = parameter.as_str() else {
            return Err(BindError::InvalidParameter {
                attribute: attribute.to_string(),
                rule: "pattern".to_string(),
                reason: format!("expected a pattern name or regex, got {}", parameter),
            });
        };

        if registry.pattern(name).is_some() {
            return Ok(());
        }

        self.literal(name)
            .map(|_| ())
            .map_err(|e| BindError::InvalidPattern {
                attribute: attribute.to_string(),
                pattern: name.to_string(),
                reason: e.to_string(),
            })
    }
}
