//! Per-class builder-method registry and default option groups.
//!
//! # Features
//! - Register and look up builder methods by name (case-sensitive).
//! - Re-registering a name replaces its definition silently; the name keeps
//!   the position of its first registration.
//! - [`Registry::clone_for_subclass`] produces an independent copy whose
//!   handlers are shared and whose option maps are copied.
//!
//! # Summary Table
//! | Method             | Overwrites | Error on Miss | Notes                        |
//! |--------------------|------------|---------------|------------------------------|
//! | register           | Yes        | N/A           | Returns the replaced entry   |
//! | lookup             | N/A        | Yes           | `NotFound`                   |
//! | get/contains       | N/A        | No            | Plain queries                |
//! | is_persistent      | N/A        | No            | `false` for unknown names    |
//!
//! # Example
//! ```rust
//! use mzl::dsl::Registry;
//! use mzl::runtime::{handler, CollectionKind};
//! use mzl::opts;
//!
//! let mut registry = Registry::new();
//! let total = handler(|inst, _args, _block| Ok(inst.get("total")));
//! registry.register("total", total, opts! { "persist" => true }, CollectionKind::None);
//! assert!(registry.is_persistent("total"));
//! assert!(registry.lookup("add").is_err());
//! assert_eq!(registry.names(), vec!["total".to_string()]);
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::runtime::{CollectionKind, Handler};
use crate::value::Options;
use crate::{err_ctx, MzlError};

/// One registered builder method.
#[derive(Clone)]
pub struct Definition {
    /// Shared, immutable handler body.
    pub handler: Handler,
    /// Registration options (`persist`, `opaque`, ...).
    pub options: Options,
    pub collection: CollectionKind,
}

impl Definition {
    pub fn is_persistent(&self) -> bool {
        self.options.flag("persist")
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("options", &self.options)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

/// Ordered table of builder methods for one class.
///
/// Not thread-safe; registries live in a thread-local table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    defs: IndexMap<String, Definition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, replacing any prior definition in place.
    ///
    /// # Returns
    /// The replaced definition, if `name` was already registered.
    pub fn register(
        &mut self,
        name: &str,
        handler: Handler,
        options: Options,
        collection: CollectionKind,
    ) -> Option<Definition> {
        self.defs.insert(
            name.to_string(),
            Definition {
                handler,
                options,
                collection,
            },
        )
    }

    /// Looks up a definition by name.
    ///
    /// # Errors
    /// `NotFound` when `name` was never registered.
    pub fn lookup(&self, name: &str) -> Result<&Definition, MzlError> {
        self.defs.get(name).ok_or_else(|| {
            err_ctx!(NotFound, name, "registry", "no builder method named '{}'", name)
        })
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.defs.keys().cloned().collect()
    }

    /// Whether `name` stays on instances after construction.
    pub fn is_persistent(&self, name: &str) -> bool {
        self.defs.get(name).is_some_and(Definition::is_persistent)
    }

    /// Handlers of every persistent definition, in registration order.
    pub fn persistent(&self) -> Vec<(String, Handler)> {
        self.defs
            .iter()
            .filter(|(_, def)| def.is_persistent())
            .map(|(name, def)| (name.clone(), def.handler.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Definition)> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Independent copy for a subclass. Handlers are shared, options copied.
    pub fn clone_for_subclass(&self) -> Registry {
        self.clone()
    }
}

// ============================================================================
// DEFAULTS
// ============================================================================

/// Default option groups, keyed by group name (`"def"`, `"attr"`, ...).
///
/// Groups are created empty on first mutable access. Cloning is a deep copy
/// as far as callers can observe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults(im::HashMap<String, Options>);

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to a group, creating it empty when missing.
    pub fn group(&mut self, key: &str) -> &mut Options {
        self.0.entry(key.to_string()).or_insert_with(Options::new)
    }

    /// Copy of a group; missing groups read as empty.
    pub fn get(&self, key: &str) -> Options {
        self.0.get(key).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, options: Options) {
        self.0.insert(key.to_string(), options);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
