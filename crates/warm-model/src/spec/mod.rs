mod framework;
pub use framework::TestFramework;
