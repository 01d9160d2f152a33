// Host object contract

use crate::Declarations;
use serde_json::Value;
use std::sync::Arc;

/// Attribute name to value mapping, in presentation order
pub type Attributes = serde_json::Map<String, Value>;

/// Hook consulted on every attempted attribute update of a host
pub trait MutationHook: Send + Sync {
    /// Inspect one update attempt.
    ///
    /// Returns `true` when the update should be rejected.
    fn validate(&self, host: &mut dyn Host, attributes: &Attributes) -> bool;
}

/// A stateful record that validation can be bound to
pub trait Host {
    /// Current value of an attribute, `None` when unset
    fn get(&self, attribute: &str) -> Option<&Value>;

    /// Write attributes without consulting the mutation hook
    fn store(&mut self, attributes: Attributes);

    /// Validation declarations of this host
    fn declarations(&self) -> &Declarations;

    /// Currently installed mutation hook
    fn hook(&self) -> Option<Arc<dyn MutationHook>>;

    /// Install or remove the mutation hook, returning the one it replaces
    fn replace_hook(
        &mut self,
        hook: Option<Arc<dyn MutationHook>>,
    ) -> Option<Arc<dyn MutationHook>>;
}
