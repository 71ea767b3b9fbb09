//! Controller action registry.
//!
//! Controller and resource routes need to know which actions a handler
//! exposes. Instead of introspecting handlers at request time, the
//! application declares them once at startup:
//!
//! ```
//! use switchyard::registry::ActionRegistry;
//!
//! let mut actions = ActionRegistry::new();
//! actions.register("UserController", ["index", "show", "getUsers"]);
//!
//! assert!(actions.has_action("UserController", "show"));
//! assert!(!actions.has_action("UserController", "destroy"));
//! ```
//!
//! A handler type can also describe itself through [`ActionProvider`] and be
//! registered with [`ActionRegistry::register_provider`].

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

/// Handler that can list its public actions
pub trait ActionProvider {
    /// Identifier routes refer to (e.g. `UserController`)
    fn handler_id(&self) -> &str;

    /// Names of the actions the handler exposes
    fn actions(&self) -> Vec<String>;
}

/// `(handler id, action)` lookup built at startup
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, BTreeSet<String>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare actions for `handler_id`; repeated calls extend the set
    pub fn register<I, S>(&mut self, handler_id: &str, actions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.handlers.entry(handler_id.to_string()).or_default();
        entry.extend(actions.into_iter().map(Into::into));
        debug!(handler_id, actions = entry.len(), "Registered controller actions");
        self
    }

    pub fn register_provider(&mut self, provider: &dyn ActionProvider) -> &mut Self {
        self.register(provider.handler_id(), provider.actions())
    }

    /// Exact-name lookup
    #[must_use]
    pub fn has_action(&self, handler_id: &str, action: &str) -> bool {
        self.handlers
            .get(handler_id)
            .is_some_and(|actions| actions.contains(action))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Photos;

    impl ActionProvider for Photos {
        fn handler_id(&self) -> &str {
            "Photos"
        }

        fn actions(&self) -> Vec<String> {
            vec!["index".into(), "show".into()]
        }
    }

    #[test]
    fn test_register_extends() {
        let mut registry = ActionRegistry::new();
        registry.register("Api", ["list"]).register("Api", ["show"]);
        assert!(registry.has_action("Api", "list"));
        assert!(registry.has_action("Api", "show"));
        assert!(!registry.has_action("Other", "list"));
    }

    #[test]
    fn test_provider_registration() {
        let mut registry = ActionRegistry::new();
        registry.register_provider(&Photos);
        assert!(registry.has_action("Photos", "index"));
        assert!(!registry.has_action("Photos", "destroy"));
        assert!(!registry.has_action("Photos::index", "index"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut registry = ActionRegistry::new();
        registry.register("Api", ["getUsers"]);
        assert!(!registry.has_action("Api", "getusers"));
    }
}
