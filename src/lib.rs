// Rampart - declarative attribute validation for mutable models
//
// Attributes declare rules by name; a validator binds to a model, intercepts
// every update and keeps an aggregate validity flag on it.

// Re-export core functionality
pub use rampart_validation::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use rampart_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Attributes,
        BindError,
        BindOptions,
        Binding,
        Declarations,
        ErrorDisplay,
        FnRule,
        Host,
        Model,
        Rule,
        RuleRegistry,
        RuleSet,
        ValidationError,
        ValidationErrors,
        Validator,
        ValidatorSettings,
    };

    #[cfg(feature = "config")]
    pub use crate::rampart_config::{ConfigBuilder, ConfigLoader, ValidationConfig};
}
