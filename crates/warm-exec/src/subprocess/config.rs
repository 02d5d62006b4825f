use std::{collections::BTreeMap, fmt, path::PathBuf, process::Stdio};

use tokio::process::Command;
use tracing::trace;
use warm_model::TestFramework;

use crate::ExecError;

/// Resolved invocation of one child process.
#[derive(Debug, Clone)]
pub struct SubprocessConfig {
    /// Program to execute (e.g. `"cargo"`, `"bundle"`).
    pub(crate) command: String,
    /// Full argument list passed to the program.
    pub(crate) args: Vec<String>,
    /// Variables added on top of the inherited environment.
    pub(crate) env: BTreeMap<String, String>,
    /// Working directory. If `None`, the child inherits the server's one.
    pub(crate) cwd: Option<PathBuf>,
}

impl SubprocessConfig {
    /// Invocation of a single run: `command base_args… run_args…`.
    pub fn for_run(framework: &TestFramework, run_args: &[String]) -> Self {
        let mut args = framework.args.clone();
        args.extend_from_slice(run_args);
        Self {
            command: framework.command.clone(),
            args,
            env: framework.env.clone(),
            cwd: framework.cwd.clone(),
        }
    }

    /// Invocation of the warm-up argv, if the framework has one.
    pub fn for_preload(framework: &TestFramework) -> Option<Self> {
        let (program, rest) = framework.preload.split_first()?;
        Some(Self {
            command: program.clone(),
            args: rest.to_vec(),
            env: framework.env.clone(),
            cwd: framework.cwd.clone(),
        })
    }

    /// Rules:
    /// - `command` is not empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.command.trim().is_empty() {
            return Err(ExecError::InvalidCommand("subprocess command is empty".into()));
        }
        Ok(())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build the `tokio` command.
    ///
    /// On Unix the child leads its own process group, so a terminal SIGINT reaches only
    /// the server and cancellation can signal the whole group.
    pub(crate) fn to_command(&self, stdout: Stdio, stderr: Stdio) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    /// Emit a trace-level log with the essential configuration fields.
    pub fn trace_state(&self, run_id: &str) {
        trace!(
            run = run_id,
            command = %self.command,
            args = ?self.args,
            cwd = ?self.cwd,
            env_len = self.env.len(),
            "subprocess config resolved"
        );
    }
}

impl fmt::Display for SubprocessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
