mod config;
mod input;
mod serve;

use std::path::PathBuf;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use config::ServerConfig;
use warm_core::prelude::*;
use warm_exec::subprocess::register_subprocess_variant;
use warm_model::{Channel, EVENT_QUIT};
use warm_observe::{LoggerTimeZone, init_local_offset, init_logger};

fn main() -> anyhow::Result<()> {
    // 1) config (argv[1] is an optional JSON file)
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = ServerConfig::load(path.as_deref())?;

    // 2) logger; local offset detection must happen before worker threads exist
    if cfg.logger.tz == LoggerTimeZone::Local {
        init_local_offset();
    }
    let mut logger = cfg.logger.clone();
    logger.apply_env()?;
    init_logger(&logger)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(cfg))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    // 3) variants + coordinator
    register_subprocess_variant(StrategyRegistry::global())?;
    let bus = EventBus::new();
    let strategy = RunStrategy::factory(cfg.framework, &cfg.strategy, bus.clone())?;
    info!(
        variant = strategy.variant(),
        framework = %strategy.framework().name,
        "strategy ready"
    );

    // 4) quit ends the request loop
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        bus.observe(
            Channel::Interrupt,
            EVENT_QUIT,
            ObserverFn::arc("server.quit", move |_p: Payload| {
                let shutdown = shutdown.clone();
                async move {
                    shutdown.cancel();
                    Ok::<(), CoreError>(())
                }
            }),
        );
    }

    // 5) observers, SIGINT forwarding, warm-up
    let forwarder = strategy.setup_observers()?;
    let _ = strategy.preload_in_background();

    // 6) one run per stdin line
    let stdout = OutputStream::stdout();
    let stderr = OutputStream::stderr();
    let served = serve::serve_requests(
        BufReader::new(tokio::io::stdin()),
        &bus,
        &shutdown,
        &stderr,
        &stdout,
    )
    .await;

    // 7) shutdown
    forwarder.abort();
    if let Err(e) = strategy.cleanup().await {
        warn!(error = %e, label = e.as_label(), "backend cleanup failed");
    }
    info!("server stopped");
    Ok(served?)
}
