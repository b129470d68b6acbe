//! Daemon bootstrap: log setup, single-shot mode, and the cycle loop.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::cycle::{Cycle, CYCLE_FAILURE};
use crate::error::{io_err, DaemonError};
use crate::log_rotation::LogFiles;
use crate::paths::DaemonSettings;

/// Totals reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: usize,
    pub failures: usize,
    pub last_status: Option<i32>,
}

/// Set up logging under `settings.log_dir`, then either run a single cycle
/// (`once`) or loop until Ctrl-C. Returns the cycle status in single-shot
/// mode and `0` after a clean loop shutdown.
pub fn start_blocking(settings: DaemonSettings, once: bool, json: bool) -> Result<i32, DaemonError> {
    let logs = init_tracing(&settings.log_dir, json)?;
    if once {
        return Ok(run_once(&settings));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings, logs))?;
    Ok(0)
}

/// One cycle against the local host.
pub fn run_once(settings: &DaemonSettings) -> i32 {
    let started = Instant::now();
    let status = Cycle::new(settings).run();
    tracing::info!(
        status,
        duration_ms = started.elapsed().as_millis() as u64,
        "cycle finished"
    );
    status
}

/// Loop cycles until Ctrl-C, rotating `logs` between cycles.
pub async fn run(settings: DaemonSettings, logs: LogFiles) -> Result<LoopSummary, DaemonError> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("received ctrl-c, stopping after the current cycle");
                let _ = shutdown_tx.send(());
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for ctrl-c");
                // Never finishing keeps `shutdown_tx` alive, so the loop runs on.
                std::future::pending::<()>().await
            }
        }
    });

    let summary = run_cycles(settings, logs, shutdown_rx, run_once).await?;
    tracing::info!(
        cycles = summary.cycles,
        failures = summary.failures,
        "daemon stopped"
    );
    Ok(summary)
}

/// Run `cycle` repeatedly on the blocking pool, pausing `settings.interval`
/// in between and rotating `logs` after each cycle. A shutdown signal that
/// arrives mid-cycle takes effect once that cycle has finished.
pub async fn run_cycles<F>(
    settings: DaemonSettings,
    logs: LogFiles,
    mut shutdown: broadcast::Receiver<()>,
    cycle: F,
) -> Result<LoopSummary, DaemonError>
where
    F: Fn(&DaemonSettings) -> i32 + Send + Sync + 'static,
{
    let settings = Arc::new(settings);
    let cycle = Arc::new(cycle);
    let mut summary = LoopSummary::default();

    loop {
        let task = {
            let settings = settings.clone();
            let cycle = cycle.clone();
            tokio::task::spawn_blocking(move || cycle(&settings))
        };
        let status = match task.await {
            Ok(status) => status,
            Err(err) if err.is_panic() => {
                tracing::error!(error = %err, "cycle panicked");
                CYCLE_FAILURE
            }
            Err(err) => return Err(DaemonError::Join(err.to_string())),
        };

        summary.cycles += 1;
        summary.last_status = Some(status);
        if status != 0 {
            summary.failures += 1;
            tracing::warn!(cycle = summary.cycles, status, "cycle did not succeed");
        }
        logs.rotate();

        if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = shutdown.recv() => break,
        }
    }

    Ok(summary)
}

/// Install the global subscriber: everything to stderr and `lcrpd.log`,
/// errors also to `lcrpd-err.log`. `RUST_LOG` overrides the `info` default.
/// The returned handle rotates the files the subscriber writes to.
pub fn init_tracing(log_dir: &Path, json: bool) -> Result<LogFiles, DaemonError> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    use tracing_subscriber::{fmt, EnvFilter};

    std::fs::create_dir_all(log_dir).map_err(|e| io_err(log_dir, e))?;
    let logs = LogFiles::new(log_dir);
    logs.rotate();

    let writer = io::stderr
        .and(logs.all().clone())
        .and(logs.errors().clone().with_max_level(tracing::Level::ERROR));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(logs)
}
