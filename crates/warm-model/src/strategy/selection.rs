use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_VARIANT,
    error::{ModelError, ModelResult},
};

/// How the factory picks the strategy variant to construct.
///
/// - `Fixed` always builds the built-in [`DEFAULT_VARIANT`], ignoring what else is registered.
/// - `Registry` looks the named variant up among the registered ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum StrategySelection {
    Fixed,
    Registry { variant: String },
}

impl StrategySelection {
    /// Select a registered variant by name.
    pub fn registry(variant: impl Into<String>) -> Self {
        StrategySelection::Registry {
            variant: variant.into(),
        }
    }

    /// Name of the variant this selection resolves to.
    pub fn variant(&self) -> &str {
        match self {
            StrategySelection::Fixed => DEFAULT_VARIANT,
            StrategySelection::Registry { variant } => variant,
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.variant().trim().is_empty() {
            return Err(ModelError::InvalidSelection("variant name is empty".into()));
        }
        Ok(())
    }
}

impl Default for StrategySelection {
    fn default() -> Self {
        StrategySelection::Fixed
    }
}
