//! Process-wide registry of strategy variants.
//!
//! Every concrete backend registers itself once at startup with an explicit call
//! (e.g. `register_subprocess_variant`). The registry only grows: entries are appended
//! in definition order and never removed.
use std::{fmt, sync::RwLock};

use tracing::debug;
use warm_model::TestFramework;

use crate::{
    backend::{BackendError, BackendRef},
    error::CoreError,
};

/// Constructor of a concrete backend for the given framework.
pub type VariantBuilder = fn(&TestFramework) -> Result<BackendRef, BackendError>;

/// Named constructor registered in a [`StrategyRegistry`].
#[derive(Clone, Copy)]
pub struct StrategyVariant {
    name: &'static str,
    build: VariantBuilder,
}

impl StrategyVariant {
    pub const fn new(name: &'static str, build: VariantBuilder) -> Self {
        Self { name, build }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Construct the backend for `framework`.
    pub fn build(&self, framework: &TestFramework) -> Result<BackendRef, BackendError> {
        (self.build)(framework)
    }
}

impl fmt::Debug for StrategyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyVariant")
            .field("name", &self.name)
            .finish()
    }
}

static GLOBAL: StrategyRegistry = StrategyRegistry::new();

/// Append-only, ordered list of strategy variants.
///
/// Variants are identified by name; registering a name twice is rejected.
pub struct StrategyRegistry {
    variants: RwLock<Vec<StrategyVariant>>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    ///
    /// Most callers want [`StrategyRegistry::global`]; separate instances are useful for embedding and tests.
    pub const fn new() -> Self {
        Self {
            variants: RwLock::new(Vec::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static StrategyRegistry {
        &GLOBAL
    }

    /// Append `variant`.
    pub fn register(&self, variant: StrategyVariant) -> Result<(), CoreError> {
        let mut variants = self
            .variants
            .write()
            .map_err(|_| CoreError::Internal("strategy registry lock poisoned".into()))?;

        if variants.iter().any(|v| v.name == variant.name) {
            return Err(CoreError::DuplicateVariant(variant.name.to_string()));
        }
        variants.push(variant);
        debug!(variant = variant.name, total = variants.len(), "strategy variant registered");
        Ok(())
    }

    /// Look a variant up by name.
    pub fn get(&self, name: &str) -> Option<StrategyVariant> {
        self.read().iter().find(|v| v.name == name).copied()
    }

    /// Names of all variants in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.read().iter().map(|v| v.name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<StrategyVariant>> {
        match self.variants.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
