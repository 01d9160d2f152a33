//! Declarative attribute validation for Rampart
//!
//! Attributes declare rules by name. A [`Validator`] resolves those names
//! against a [`RuleRegistry`] and binds an intercepting hook to a [`Host`],
//! so every update is checked before it is applied and the host carries an
//! aggregate validity flag.
//!
//! # Examples
//!
//! ## Binding a Model
//!
//! ```
//! use rampart_validation::{BindOptions, Declarations, Model, RuleSet, Validator};
//!
//! let mut model = Model::new(
//!     Declarations::new()
//!         .attribute("name", RuleSet::new().rule("required", true))
//!         .attribute("age", RuleSet::new().rule("min", 18)),
//! );
//!
//! let validator = Validator::new();
//! validator.bind(&mut model, BindOptions::new()).unwrap();
//!
//! assert!(model.set_value("age", 12).is_err());
//! assert!(model.set_value("age", 30).is_ok());
//! assert_eq!(validator.is_valid(&model), Some(false));
//!
//! model.set_value("name", "Ada").unwrap();
//! assert_eq!(validator.is_valid(&model), Some(true));
//! ```
//!
//! ## Checking a Single Value
//!
//! ```
//! use rampart_validation::{Declarations, RuleSet, Validator};
//! use serde_json::json;
//!
//! let declarations = Declarations::new().attribute(
//!     "zip",
//!     RuleSet::new().rule("pattern", "number").message("Digits only"),
//! );
//!
//! let validator = Validator::new();
//! assert_eq!(validator.validate_attribute(&declarations, "zip", &json!("12a")), "Digits only");
//! assert_eq!(validator.validate_attribute(&declarations, "zip", &json!("1234")), "");
//! ```
//!
//! ## Custom Rules
//!
//! ```
//! use rampart_validation::{FnRule, RuleRegistry, ValidationError};
//! use serde_json::json;
//!
//! let registry = RuleRegistry::with_defaults().with_rule(FnRule::new("even", |input| {
//!     match input.value.as_i64() {
//!         Some(n) if n % 2 == 0 => Ok(()),
//!         _ => Err(input.fail("even", || format!("{} must be even", input.attribute))),
//!     }
//! }));
//!
//! assert!(registry.contains("even"));
//! ```

mod callbacks;
mod declaration;
mod errors;
mod model;
mod orchestrator;
mod resolver;
mod rules;
mod settings;
mod traits;
mod validators;

pub use callbacks::*;
pub use declaration::*;
pub use errors::*;
pub use model::*;
pub use orchestrator::*;
pub use resolver::*;
pub use rules::*;
pub use settings::*;
pub use traits::*;
pub use validators::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
