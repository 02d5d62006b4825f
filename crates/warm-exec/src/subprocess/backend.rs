use std::{
    process::Stdio,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, trace, warn};

use warm_core::{
    backend::{Backend, BackendError, RunOutcome, WarmUpOutcome, make_run_id},
    stream::OutputStream,
};
use warm_model::TestFramework;

use crate::{ExecError, subprocess::config::SubprocessConfig};

/// Run holding the live slot.
///
/// `pgid` is `None` between reservation and a successful spawn.
#[derive(Debug, Clone)]
struct LiveRun {
    run_id: String,
    pgid: Option<i32>,
}

/// Backend that executes every run as a fresh child process.
///
/// At most one run is live at a time; a second `execute_run` while one is live is rejected.
pub struct SubprocessBackend {
    /// Registered variant name, used in run ids.
    variant: &'static str,
    framework: TestFramework,
    live: Mutex<Option<LiveRun>>,
    canceled: AtomicBool,
}

impl SubprocessBackend {
    pub fn new(variant: &'static str, framework: TestFramework) -> Self {
        Self {
            variant,
            framework,
            live: Mutex::new(None),
            canceled: AtomicBool::new(false),
        }
    }

    pub fn framework(&self) -> &TestFramework {
        &self.framework
    }

    fn live(&self) -> MutexGuard<'_, Option<LiveRun>> {
        match self.live.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Claim the live slot for `run_id` before anything is spawned.
    ///
    /// The slot is released when the returned guard drops.
    fn reserve(&self, run_id: &str) -> Result<Reservation<'_>, ExecError> {
        let mut live = self.live();
        if let Some(current) = live.as_ref() {
            return Err(ExecError::Busy {
                run_id: current.run_id.clone(),
            });
        }
        self.canceled.store(false, Ordering::SeqCst);
        *live = Some(LiveRun {
            run_id: run_id.to_string(),
            pgid: None,
        });
        Ok(Reservation { backend: self })
    }

    /// Record the spawned process group.
    ///
    /// Returns `true` if a cancel arrived while the child was being spawned.
    fn attach(&self, pgid: i32) -> bool {
        if let Some(run) = self.live().as_mut() {
            run.pgid = Some(pgid);
        }
        self.canceled.load(Ordering::SeqCst)
    }
}

struct Reservation<'a> {
    backend: &'a SubprocessBackend,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.backend.live().take();
    }
}

#[async_trait]
impl Backend for SubprocessBackend {
    fn name(&self) -> &'static str {
        "subprocess"
    }

    async fn warm_up(&self) -> Result<WarmUpOutcome, BackendError> {
        let started = Instant::now();
        let Some(cfg) = SubprocessConfig::for_preload(&self.framework) else {
            debug!(framework = %self.framework.name, "no preload command; warm-up is a no-op");
            return Ok(WarmUpOutcome::new(started.elapsed()));
        };
        cfg.validate()?;

        info!(framework = %self.framework.name, preload = %cfg, "running preload command");
        let status = cfg
            .to_command(Stdio::null(), Stdio::inherit())
            .status()
            .await
            .map_err(|source| ExecError::Spawn {
                command: cfg.command().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BackendError::WarmUp(format!("preload `{cfg}` exited with {status}")));
        }
        Ok(WarmUpOutcome::new(started.elapsed()).with_detail(cfg.to_string()))
    }

    async fn execute_run(
        &self,
        args: &[String],
        stderr: &OutputStream,
        stdout: &OutputStream,
    ) -> Result<RunOutcome, BackendError> {
        let run_id = make_run_id(self.variant, &self.framework.name);
        let cfg = SubprocessConfig::for_run(&self.framework, args);
        cfg.validate()?;
        cfg.trace_state(&run_id);

        let reservation = self.reserve(&run_id)?;
        let mut child = cfg
            .to_command(Stdio::piped(), Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: cfg.command().to_string(),
                source,
            })?;
        let pgid = child
            .id()
            .and_then(|pid| i32::try_from(pid).ok())
            .ok_or_else(|| ExecError::Internal("spawned child has no pid".into()))?;
        if self.attach(pgid) {
            debug!(run = %run_id, pgid, "cancel arrived during spawn");
            terminate_group(pgid)?;
        }
        debug!(run = %run_id, pgid, command = %cfg, "run started");

        let out_pipe = child.stdout.take();
        let err_pipe = child.stderr.take();
        let (out_res, err_res, status) = tokio::join!(
            pump_output(out_pipe, stdout),
            pump_output(err_pipe, stderr),
            child.wait(),
        );
        drop(reservation);

        let status = status?;
        if let Err(e) = out_res.and(err_res) {
            warn!(run = %run_id, error = %e, "failed to forward run output");
        }

        if self.canceled.swap(false, Ordering::SeqCst) {
            info!(run = %run_id, "run canceled");
            return Ok(RunOutcome::canceled(run_id));
        }
        trace!(run = %run_id, %status, "child exited");
        Ok(RunOutcome::exited(run_id, status.code()))
    }

    async fn cancel_run(&self) -> Result<(), BackendError> {
        let Some(run) = self.live().clone() else {
            trace!("cancel requested with no live run");
            return Ok(());
        };
        self.canceled.store(true, Ordering::SeqCst);
        match run.pgid {
            Some(pgid) => {
                terminate_group(pgid)?;
                debug!(run = %run.run_id, pgid, "SIGTERM sent to run process group");
            }
            None => debug!(run = %run.run_id, "cancel recorded before spawn completed"),
        }
        Ok(())
    }

    fn is_running(&self) -> Result<bool, BackendError> {
        Ok(self.live().is_some())
    }

    async fn cleanup(&self) -> Result<(), BackendError> {
        if self.is_running()? {
            self.cancel_run().await?;
        }
        Ok(())
    }
}

/// Copy `pipe` into `sink` line by line, as raw bytes, flushing after each line.
///
/// The pipe is drained to EOF even if the sink fails, so the child never sees SIGPIPE;
/// the first sink error is returned afterwards.
async fn pump_output<R>(pipe: Option<R>, sink: &OutputStream) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return Ok(());
    };
    let mut reader = BufReader::new(pipe);
    let mut line = Vec::new();
    let mut sink_err = None;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if sink_err.is_none() {
            if let Err(e) = sink.write_all(&line).and_then(|()| sink.flush()) {
                sink_err = Some(e);
            }
        }
    }
    sink_err.map_or(Ok(()), Err)
}

#[cfg(unix)]
fn terminate_group(pgid: i32) -> Result<(), ExecError> {
    // SAFETY: kill(2) with a negative pid only signals the given process group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGTERM) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        // Group already gone; the run is finishing on its own.
        return Ok(());
    }
    Err(ExecError::Signal { pgid, source: err })
}

#[cfg(not(unix))]
fn terminate_group(pgid: i32) -> Result<(), ExecError> {
    Err(ExecError::Signal {
        pgid,
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "process groups are only supported on unix",
        ),
    })
}
