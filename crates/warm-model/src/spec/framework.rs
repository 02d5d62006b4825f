use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Declarative description of the test framework a coordinator wraps.
///
/// Backends translate it into whatever they need to warm up and execute runs:
/// - `command` + `args` form the base invocation of every run; run arguments are appended;
/// - `preload` is an optional argv executed once during warm-up;
/// - `env` and `cwd` apply to both.
///
/// In a document, `name` and `command` are required; every other field defaults to empty.
/// [`TestFramework::default`] is the cargo preset and only applies when the whole
/// description is absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFramework {
    /// Short framework name used in run ids and logs.
    pub name: String,
    /// Program executed for each run.
    pub command: String,
    /// Base arguments placed before the per-run arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Argv executed once during warm-up. Empty means nothing to preload.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preload: Vec<String>,
    /// Extra environment variables; override inherited ones.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Working directory. If `None`, inherits from the server process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl TestFramework {
    /// Create a framework description with a name and a run command.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            preload: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Builder-style helper for the base run arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper for the warm-up argv.
    pub fn with_preload<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preload = argv.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if warm-up has a command to execute.
    pub fn has_preload(&self) -> bool {
        !self.preload.is_empty()
    }

    /// Validate the description.
    ///
    /// Rules:
    /// - `name` and `command` are not empty or whitespace-only;
    /// - `preload`, when present, starts with a non-empty program.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidFramework("name is empty".into()));
        }
        if self.command.trim().is_empty() {
            return Err(ModelError::InvalidFramework("command is empty".into()));
        }
        if let Some(program) = self.preload.first() {
            if program.trim().is_empty() {
                return Err(ModelError::InvalidFramework(
                    "preload program is empty".into(),
                ));
            }
        }
        Ok(())
    }
}

impl TestFramework {
    /// `cargo test`, warmed up by building the test binaries without running them.
    pub fn cargo() -> Self {
        TestFramework::new("cargo-test", "cargo")
            .with_args(["test", "--quiet"])
            .with_preload(["cargo", "test", "--no-run", "--quiet"])
    }
}

impl Default for TestFramework {
    fn default() -> Self {
        Self::cargo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_preloads() {
        let fw = TestFramework::default();
        assert!(fw.validate().is_ok());
        assert!(fw.has_preload());
        assert_eq!(fw.command, "cargo");
    }

    #[test]
    fn validate_rejects_blank_command() {
        let fw = TestFramework::new("rspec", "  ");
        let err = fw.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidFramework(msg) if msg.contains("command")));
    }

    #[test]
    fn validate_rejects_blank_preload_program() {
        let fw = TestFramework::new("rspec", "rspec").with_preload([""]);
        assert!(fw.validate().is_err());
    }

    #[test]
    fn deserialize_leaves_missing_fields_empty() {
        let json = r#"{"name": "rspec", "command": "bundle", "args": ["exec", "rspec"]}"#;
        let fw: TestFramework = serde_json::from_str(json).unwrap();

        assert_eq!(fw.name, "rspec");
        assert_eq!(fw.args, vec!["exec".to_string(), "rspec".to_string()]);
        assert!(fw.preload.is_empty());
        assert!(!fw.has_preload());
        assert!(fw.env.is_empty());
        assert!(fw.cwd.is_none());
    }

    #[test]
    fn deserialize_requires_a_command() {
        assert!(serde_json::from_str::<TestFramework>(r#"{"name": "rspec"}"#).is_err());
    }

    #[test]
    fn serialize_skips_empty_collections() {
        let fw = TestFramework::new("plain", "true");
        let json = serde_json::to_string(&fw).unwrap();
        assert!(!json.contains("preload"));
        assert!(!json.contains("env"));
        assert!(!json.contains("cwd"));
    }
}
