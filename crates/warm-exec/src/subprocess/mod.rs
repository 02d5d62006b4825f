//! Subprocess backend.
//!
//! Every run spawns `command base_args… run_args…` as a child in its own process group;
//! warm-up runs the framework's `preload` argv to completion.
mod backend;
mod config;

pub use backend::SubprocessBackend;
pub use config::SubprocessConfig;

use std::sync::Arc;

use warm_core::{
    backend::{BackendError, BackendRef},
    error::CoreError,
    registry::{StrategyRegistry, StrategyVariant},
};
use warm_model::{DEFAULT_VARIANT, TestFramework};

/// Name the subprocess backend is registered under.
pub const SUBPROCESS_VARIANT: &str = DEFAULT_VARIANT;

/// Register the built-in subprocess variant in `registry`.
///
/// After this call, `StrategySelection::Fixed` and `StrategySelection::registry("subprocess")`
/// both resolve to [`SubprocessBackend`].
pub fn register_subprocess_variant(registry: &StrategyRegistry) -> Result<(), CoreError> {
    registry.register(StrategyVariant::new(SUBPROCESS_VARIANT, build))
}

fn build(framework: &TestFramework) -> Result<BackendRef, BackendError> {
    framework
        .validate()
        .map_err(|e| BackendError::InvalidConfig(e.to_string()))?;
    Ok(Arc::new(SubprocessBackend::new(
        SUBPROCESS_VARIANT,
        framework.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warm_core::backend::Backend;

    #[test]
    fn registers_under_the_default_variant_once() {
        let registry = StrategyRegistry::new();
        register_subprocess_variant(&registry).unwrap();

        assert_eq!(registry.names(), vec!["subprocess"]);
        assert!(matches!(
            register_subprocess_variant(&registry),
            Err(CoreError::DuplicateVariant(_))
        ));
    }

    #[test]
    fn built_backend_is_named_subprocess() {
        let registry = StrategyRegistry::new();
        register_subprocess_variant(&registry).unwrap();

        let backend = registry
            .get(SUBPROCESS_VARIANT)
            .unwrap()
            .build(&TestFramework::default())
            .unwrap();
        assert_eq!(backend.name(), "subprocess");
    }

    #[test]
    fn build_rejects_invalid_framework() {
        let err = match build(&TestFramework::new("", "cargo")) {
            Err(e) => e,
            Ok(_) => panic!("blank framework name must be rejected"),
        };
        assert_eq!(err.as_label(), "invalid_config");
    }
}
