mod selection;
pub use selection::StrategySelection;
