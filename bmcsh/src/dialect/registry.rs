//! Global dialect registry for looking up command sets by name.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::command_set::CommandSet;
use super::vendors;
use crate::error::{DialectError, Result};

/// Global dialect registry.
static REGISTRY: Lazy<RwLock<DialectRegistry>> = Lazy::new(|| {
    let mut registry = DialectRegistry::new();
    registry.register_builtin_dialects();
    RwLock::new(registry)
});

/// Registry for vendor dialects.
#[derive(Debug, Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, CommandSet>,
}

impl DialectRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            dialects: HashMap::new(),
        }
    }

    /// Get the global registry.
    pub fn global() -> &'static RwLock<DialectRegistry> {
        &REGISTRY
    }

    /// Register built-in dialects.
    fn register_builtin_dialects(&mut self) {
        self.dialects
            .insert(vendors::idrac8::DIALECT_NAME.to_string(), vendors::idrac8::command_set());
        self.dialects
            .insert(vendors::ilo::DIALECT_NAME.to_string(), vendors::ilo::command_set());
    }

    /// Register a dialect.
    pub fn register(&mut self, dialect: CommandSet) -> Result<()> {
        if self.dialects.contains_key(&dialect.name) {
            return Err(DialectError::AlreadyRegistered {
                name: dialect.name.clone(),
            }
            .into());
        }
        self.dialects.insert(dialect.name.clone(), dialect);
        Ok(())
    }

    /// Get a dialect by name.
    pub fn get(&self, name: &str) -> Option<&CommandSet> {
        self.dialects.get(name)
    }

    /// Check if a dialect is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.dialects.contains_key(name)
    }

    /// List all registered dialect names.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.dialects.keys()
    }
}
