//! The request loop: one run per input line until EOF or quit.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use warm_core::prelude::*;
use warm_model::{Channel, EVENT_RUN};

use crate::input::parse_run_line;

/// Trigger a `run` event for every request line read from `input`.
///
/// Returns on EOF or once `shutdown` is cancelled; a quit that arrives while a run
/// is still waiting on warm-up (or still executing) drops that run. Failed runs are
/// logged and the loop keeps reading.
pub async fn serve_requests<R>(
    input: R,
    bus: &EventBus,
    shutdown: &CancellationToken,
    stderr: &OutputStream,
    stdout: &OutputStream,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("quit requested");
                return Ok(());
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            info!("input closed");
            return Ok(());
        };
        let Some(args) = parse_run_line(&line) else {
            continue;
        };

        let payload = Payload::run(args, stderr.clone(), stdout.clone());
        tokio::select! {
            res = bus.trigger(Channel::Work, EVENT_RUN, payload) => {
                if let Err(e) = res {
                    error!(error = %e, label = e.as_label(), "run request failed");
                }
            }
            _ = shutdown.cancelled() => {
                info!("quit requested during run");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;

    fn streams() -> (OutputStream, OutputStream) {
        (OutputStream::capture("stderr").0, OutputStream::capture("stdout").0)
    }

    fn count_runs(bus: &EventBus, fail: bool) -> Arc<AtomicUsize> {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        bus.observe(
            Channel::Work,
            EVENT_RUN,
            ObserverFn::arc("test.count", move |_p: Payload| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if fail {
                        return Err(CoreError::Internal("run blew up".into()));
                    }
                    Ok(())
                }
            }),
        );
        seen
    }

    #[tokio::test]
    async fn every_non_blank_line_triggers_one_run() {
        let bus = EventBus::new();
        let seen = count_runs(&bus, false);
        let (err, out) = streams();

        serve_requests(&b"spec/a\n\n   \nspec/b -e x\n"[..], &bus, &CancellationToken::new(), &err, &out)
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_run_does_not_stop_the_loop() {
        let bus = EventBus::new();
        let seen = count_runs(&bus, true);
        let (err, out) = streams();

        serve_requests(&b"one\ntwo\n"[..], &bus, &CancellationToken::new(), &err, &out)
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn quit_ends_the_loop_while_a_run_is_pending() {
        let bus = EventBus::new();
        let shutdown = CancellationToken::new();
        let started = Arc::new(AtomicUsize::new(0));
        {
            let shutdown = shutdown.clone();
            let started = Arc::clone(&started);
            bus.observe(
                Channel::Work,
                EVENT_RUN,
                ObserverFn::arc("test.stuck", move |_p: Payload| {
                    let shutdown = shutdown.clone();
                    let started = Arc::clone(&started);
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        shutdown.cancel();
                        std::future::pending::<()>().await;
                        Ok::<(), CoreError>(())
                    }
                }),
            );
        }
        let (err, out) = streams();

        tokio::time::timeout(
            Duration::from_secs(5),
            serve_requests(&b"first\nsecond\n"[..], &bus, &shutdown, &err, &out),
        )
        .await
        .expect("loop kept waiting on the pending run")
        .unwrap();

        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_reading() {
        let bus = EventBus::new();
        let seen = count_runs(&bus, false);
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let (err, out) = streams();

        let (_keep_open, reader) = tokio::io::duplex(64);
        serve_requests(tokio::io::BufReader::new(reader), &bus, &shutdown, &err, &out)
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
