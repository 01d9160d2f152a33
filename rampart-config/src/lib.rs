//! File and environment configuration for Rampart validators
//!
//! Declarations and validator settings can live in JSON or TOML files:
//!
//! ```toml
//! [settings]
//! flag_attribute = "isValid"
//! strict_rules = true
//!
//! [attributes.name]
//! required = true
//! msg = "Please enter a name"
//!
//! [attributes.age]
//! min = 18
//! ```
//!
//! Settings may be overridden from `RAMPART_FLAG_ATTRIBUTE`,
//! `RAMPART_STRICT_RULES` and `RAMPART_LOG_EVENTS`.
//!
//! # Examples
//!
//! ```
//! use rampart_config::{ConfigLoader, FileFormat};
//! use rampart_validation::BindOptions;
//!
//! let config = ConfigLoader::new(FileFormat::Toml)
//!     .parse("[attributes.age]\nmin = 18\n")
//!     .unwrap();
//!
//! let validator = config.validator();
//! let mut model = config.model();
//! validator.bind(&mut model, BindOptions::new()).unwrap();
//! assert!(model.set_value("age", 16).is_err());
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod schema;

pub use env::{DEFAULT_ENV_PREFIX, EnvLoader, settings_from_env};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use schema::{ConfigBuilder, ConfigDocument, SettingsOverrides, ValidationConfig};
