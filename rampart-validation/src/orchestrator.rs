// Binding validators to hosts

use crate::resolver::{check_value, verify};
use crate::{
    Attributes, BindError, BindOptions, Callbacks, Declarations, Host, MutationHook, RuleRegistry,
    ValidationErrors, ValidatorSettings,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

static NULL: Value = Value::Null;

/// Binds declarative validation to hosts.
///
/// A validator owns a rule registry, its settings, and the default callbacks
/// used for any entry a binding's options leave unset.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<RuleRegistry>,
    settings: ValidatorSettings,
    defaults: Callbacks,
}

impl Validator {
    /// Create a validator with the built-in rules and default settings
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::with_defaults())
    }

    /// Create a validator resolving rules from `registry`
    pub fn with_registry(registry: impl Into<Arc<RuleRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            settings: ValidatorSettings::default(),
            defaults: Callbacks::default(),
        }
    }

    /// Replace the settings
    pub fn with_settings(mut self, settings: ValidatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the callbacks used when bind options leave an entry unset
    pub fn with_default_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.defaults = callbacks;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Install an intercepting mutation hook on `host`.
    ///
    /// Any hook already installed is replaced and kept in the returned
    /// [`Binding`] so it can be restored. With strict rules, declarations
    /// naming unregistered rules are rejected before anything is installed.
    pub fn bind<H>(&self, host: &mut H, options: BindOptions) -> Result<Binding, BindError>
    where
        H: Host + ?Sized,
    {
        if self.settings.strict_rules {
            verify(host.declarations(), &self.registry)?;
        }

        let hook: Arc<dyn MutationHook> = Arc::new(BoundHook {
            registry: Arc::clone(&self.registry),
            callbacks: self.defaults.merge(options),
            flag_attribute: self.settings.flag_attribute.clone(),
            log_events: self.settings.log_events,
        });

        let previous = host.replace_hook(Some(Arc::clone(&hook)));
        debug!(
            attributes = host.declarations().len(),
            rebound = previous.is_some(),
            "validator bound"
        );

        Ok(Binding { hook, previous })
    }

    /// Remove whatever mutation hook `host` carries. No-op when unbound.
    pub fn unbind<H>(&self, host: &mut H)
    where
        H: Host + ?Sized,
    {
        if host.replace_hook(None).is_some() {
            debug!("validator unbound");
        }
    }

    /// Error text of `value` for `attribute`, empty when it passes
    pub fn validate_attribute(
        &self,
        declarations: &Declarations,
        attribute: &str,
        value: &Value,
    ) -> String {
        self.check_attribute(declarations, attribute, value).message()
    }

    /// Every rule violation of `value` for `attribute`, in rule order
    pub fn check_attribute(
        &self,
        declarations: &Declarations,
        attribute: &str,
        value: &Value,
    ) -> ValidationErrors {
        check_value(declarations, attribute, value, &self.registry)
    }

    /// Validity flag last stored on `host`, if any
    pub fn is_valid<H>(&self, host: &H) -> Option<bool>
    where
        H: Host + ?Sized,
    {
        host.get(&self.settings.flag_attribute)
            .and_then(Value::as_bool)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Handle to one installed hook
pub struct Binding {
    hook: Arc<dyn MutationHook>,
    previous: Option<Arc<dyn MutationHook>>,
}

impl Binding {
    /// Whether this binding's hook is the one installed on `host`
    pub fn is_active<H>(&self, host: &H) -> bool
    where
        H: Host + ?Sized,
    {
        host.hook()
            .is_some_and(|current| Arc::ptr_eq(&current, &self.hook))
    }

    /// Whether binding replaced an earlier hook
    pub fn replaced_hook(&self) -> bool {
        self.previous.is_some()
    }

    /// Uninstall this binding's hook and restore the one it replaced.
    ///
    /// Leaves `host` untouched when another hook has been installed since.
    pub fn release<H>(self, host: &mut H)
    where
        H: Host + ?Sized,
    {
        if self.is_active(&*host) {
            host.replace_hook(self.previous);
            debug!("binding released");
        } else {
            debug!("binding no longer active, nothing to release");
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("replaced_hook", &self.previous.is_some())
            .finish()
    }
}

/// The intercepting hook installed by [`Validator::bind`]
struct BoundHook {
    registry: Arc<RuleRegistry>,
    callbacks: Callbacks,
    flag_attribute: String,
    log_events: bool,
}

impl BoundHook {
    /// Whether every declared attribute outside `changed` currently passes.
    ///
    /// Stops at the first failure.
    fn untouched_valid(&self, host: &dyn Host, changed: &Attributes) -> bool {
        let declarations = host.declarations();
        declarations
            .attributes()
            .filter(|attribute| !changed.contains_key(*attribute))
            .all(|attribute| {
                let value = host.get(attribute).unwrap_or(&NULL);
                let passed = check_value(declarations, attribute, value, &self.registry).is_empty();
                if !passed && self.log_events {
                    trace!(attribute, "untouched attribute still invalid");
                }
                passed
            })
    }
}

impl MutationHook for BoundHook {
    fn validate(&self, host: &mut dyn Host, attributes: &Attributes) -> bool {
        if attributes.contains_key(&self.flag_attribute) {
            warn!(
                flag = %self.flag_attribute,
                "rejecting update of the validity flag"
            );
            return true;
        }

        let mut invalid = false;
        for (attribute, value) in attributes {
            let error = check_value(host.declarations(), attribute, value, &self.registry).message();

            if error.is_empty() {
                (self.callbacks.valid)(&*host, attribute.as_str());
            } else {
                invalid = true;
                if self.log_events {
                    debug!(attribute = %attribute, error = %error, "attribute invalid");
                }
                (self.callbacks.invalid)(&*host, attribute.as_str(), &error);
            }
        }

        let is_valid = !invalid && self.untouched_valid(&*host, attributes);
        if self.log_events {
            trace!(is_valid, rejected = invalid, "validity flag recomputed");
        }

        let mut flag = Attributes::new();
        flag.insert(self.flag_attribute.clone(), Value::Bool(is_valid));
        host.store(flag);

        invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorDisplay, FnRule, Model, RuleSet, ValidationError};
    use serde_json::json;
    use std::sync::Mutex;

    fn person() -> Model {
        Model::new(
            Declarations::new()
                .attribute("name", RuleSet::new().rule("required", true))
                .attribute("age", RuleSet::new().rule("min", 18)),
        )
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn options(self: &Arc<Self>) -> BindOptions {
            let valid = Arc::clone(self);
            let invalid = Arc::clone(self);
            BindOptions::new()
                .valid(move |_, attribute| {
                    valid.events.lock().unwrap().push(format!("valid:{}", attribute));
                })
                .invalid(move |_, attribute, error| {
                    invalid
                        .events
                        .lock()
                        .unwrap()
                        .push(format!("invalid:{}:{}", attribute, error));
                })
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    #[test]
    fn test_aggregate_flag_tracks_untouched_attributes() {
        let validator = Validator::new();
        let recorder = Arc::new(Recorder::default());
        let mut model = person();
        validator.bind(&mut model, recorder.options()).unwrap();

        assert!(model.set_value("name", "").is_err());
        assert_eq!(recorder.take(), vec!["invalid:name:name is required"]);
        assert_eq!(validator.is_valid(&model), Some(false));

        assert!(model.set_value("age", 21).is_ok());
        assert_eq!(recorder.take(), vec!["valid:age"]);
        assert_eq!(validator.is_valid(&model), Some(false));

        assert!(model.set_value("name", "Ada").is_ok());
        assert_eq!(recorder.take(), vec!["valid:name"]);
        assert_eq!(validator.is_valid(&model), Some(true));
    }

    #[test]
    fn test_callbacks_fire_in_presentation_order() {
        let validator = Validator::new();
        let recorder = Arc::new(Recorder::default());
        let mut model = person();
        validator.bind(&mut model, recorder.options()).unwrap();

        let attributes = json!({"age": 12, "name": "Ada", "note": "x"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(model.set(attributes).is_err());

        assert_eq!(
            recorder.take(),
            vec![
                "invalid:age:age must be larger than or equal to 18",
                "valid:name",
                "valid:note",
            ]
        );
        assert_eq!(validator.is_valid(&model), Some(false));
    }

    #[test]
    fn test_flag_update_always_rejected() {
        let validator = Validator::new();
        let recorder = Arc::new(Recorder::default());
        let mut model = person();
        validator.bind(&mut model, recorder.options()).unwrap();

        assert!(model.set_value("isValid", true).is_err());
        assert!(model.set_value("isValid", false).is_err());
        assert!(recorder.take().is_empty());
        assert_eq!(validator.is_valid(&model), None);
    }

    #[test]
    fn test_custom_flag_attribute() {
        let validator = Validator::new()
            .with_settings(ValidatorSettings::default().with_flag_attribute("ok"));
        let mut model = person();
        validator.bind(&mut model, BindOptions::new()).unwrap();

        assert!(model.set_value("ok", true).is_err());
        assert!(model.set_value("isValid", true).is_ok());
        assert_eq!(model.get("ok"), Some(&json!(false)));
    }

    #[test]
    fn test_unbind_restores_plain_updates() {
        let validator = Validator::new();
        let recorder = Arc::new(Recorder::default());
        let mut model = person();
        validator.bind(&mut model, recorder.options()).unwrap();
        validator.unbind(&mut model);

        assert!(model.set_value("name", "").is_ok());
        assert!(recorder.take().is_empty());
        assert_eq!(validator.is_valid(&model), None);

        // unbinding twice is harmless
        validator.unbind(&mut model);
    }

    #[test]
    fn test_rebind_replaces_callbacks() {
        let validator = Validator::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let mut model = person();

        validator.bind(&mut model, first.options()).unwrap();
        let binding = validator.bind(&mut model, second.options()).unwrap();
        assert!(binding.replaced_hook());

        model.set_value("name", "Ada").unwrap();
        assert!(first.take().is_empty());
        assert_eq!(second.take(), vec!["valid:name"]);

        // releasing the second binding restores the first
        binding.release(&mut model);
        model.set_value("name", "Bo").unwrap();
        assert_eq!(first.take(), vec!["valid:name"]);
        assert!(second.take().is_empty());
    }

    #[test]
    fn test_stale_binding_release_is_noop() {
        let validator = Validator::new();
        let mut model = person();

        let stale = validator.bind(&mut model, BindOptions::new()).unwrap();
        let current = validator.bind(&mut model, BindOptions::new()).unwrap();
        assert!(!stale.is_active(&model));
        assert!(current.is_active(&model));

        stale.release(&mut model);
        assert!(current.is_active(&model));
    }

    #[test]
    fn test_strict_bind_rejects_unknown_rule() {
        let validator = Validator::new();
        let mut model = Model::new(
            Declarations::new().attribute("age", RuleSet::new().rule("between", json!([1, 9]))),
        );

        let err = validator.bind(&mut model, BindOptions::new()).unwrap_err();
        assert!(matches!(err, BindError::UnknownRule { .. }));
        assert!(!model.is_bound());
    }

    #[test]
    fn test_permissive_bind_skips_unknown_rule() {
        let validator =
            Validator::new().with_settings(ValidatorSettings::default().strict_rules(false));
        let mut model = Model::new(
            Declarations::new().attribute(
                "age",
                RuleSet::new().rule("between", json!([1, 9])).rule("min", 1),
            ),
        );
        validator.bind(&mut model, BindOptions::new()).unwrap();

        assert!(model.set_value("age", 5).is_ok());
        assert!(model.set_value("age", 0).is_err());
    }

    #[test]
    fn test_custom_registry_rule() {
        let registry = RuleRegistry::with_defaults().with_rule(FnRule::new("even", |input| {
            match input.value.as_i64() {
                Some(n) if n % 2 == 0 => Ok(()),
                _ => Err(ValidationError::new(input.attribute, "must be even")),
            }
        }));
        let validator = Validator::with_registry(registry);
        let mut model = Model::new(
            Declarations::new().attribute("count", RuleSet::new().rule("even", true)),
        );
        validator.bind(&mut model, BindOptions::new()).unwrap();

        assert!(model.set_value("count", 3).is_err());
        assert!(model.set_value("count", 4).is_ok());
    }

    #[test]
    fn test_display_callbacks() {
        let validator = Validator::new();
        let display = Arc::new(ErrorDisplay::new());
        let mut model = person();
        validator
            .bind(&mut model, BindOptions::new().display(&display))
            .unwrap();

        let _ = model.set_value("name", "  ");
        assert_eq!(display.error("name").as_deref(), Some("name is required"));

        model.set_value("name", "Ada").unwrap();
        assert!(!display.is_invalid("name"));
    }

    #[test]
    fn test_validate_attribute() {
        let validator = Validator::new();
        let model = person();

        assert_eq!(
            validator.validate_attribute(model.declarations(), "age", &json!("17")),
            "age must be larger than or equal to 18"
        );
        assert_eq!(
            validator.validate_attribute(model.declarations(), "age", &json!("18")),
            ""
        );
    }
}
