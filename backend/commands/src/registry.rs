/// Command registry: command name to handler mapping.
///
/// Built once at startup through `RegistryBuilder`, then frozen into a
/// `Registry` that the dispatcher only reads from.
use std::collections::HashMap;
use std::sync::Arc;

use lambdabot_core::Handler;
use tracing::debug;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects handler registrations before the registry is frozen.
///
/// Registering a name that already exists replaces the earlier handler:
/// the last registration wins.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous handler for it.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            debug!(command = %name, "Replacing previously registered handler");
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            handlers: self.handlers,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable command name to handler mapping.
pub struct Registry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Find the handler for `name`. Matching is exact and case-sensitive.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// All registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
