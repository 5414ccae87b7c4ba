//! Independent periodic loops with cooperative shutdown.
//!
//! Every loop owns its own ticker, bounds each iteration with a timeout and
//! survives errors and panics raised by the work it runs. Loops share nothing
//! but the shutdown signal, so a slow or failing loop never holds up another.

use crate::domain::errors::MonitoringResult;
use futures_util::FutureExt;
use futures_util::future::join_all;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// A set of spawned loops sharing one shutdown signal.
pub struct LoopSet {
    shutdown: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl LoopSet {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    /// Spawns `task` every `period`. Each run is cut off after `iteration_timeout`.
    pub fn spawn<F, Fut>(&mut self, name: impl Into<String>, period: Duration, iteration_timeout: Duration, task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = MonitoringResult<()>> + Send + 'static,
    {
        let name = name.into();
        let shutdown = self.shutdown.subscribe();
        let handle = tokio::spawn(run_periodic(name.clone(), period, iteration_timeout, shutdown, task));
        self.handles.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signals every loop to stop and waits up to `grace` for them to finish
    /// their current iteration. Loops still running afterwards are aborted.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.shutdown.send(true);

        let (names, handles): (Vec<String>, Vec<JoinHandle<()>>) = self.handles.into_iter().unzip();
        let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();

        match tokio::time::timeout(grace, join_all(handles)).await {
            Ok(results) => {
                for (name, result) in names.iter().zip(results) {
                    if let Err(e) = result {
                        warn!(task = %name, error = %e, "Periodic task ended abnormally");
                    }
                }
                info!(tasks = names.len(), "All periodic tasks stopped");
            }
            Err(_) => {
                warn!(
                    tasks = names.len(),
                    grace_ms = grace.as_millis() as u64,
                    "Periodic tasks did not stop within grace period, abandoning"
                );
                for abort in aborts {
                    abort.abort();
                }
            }
        }
    }
}

impl Default for LoopSet {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_periodic<F, Fut>(
    name: String,
    period: Duration,
    iteration_timeout: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut task: F,
) where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = MonitoringResult<()>> + Send + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(task = %name, interval_ms = period.as_millis() as u64, "Periodic task started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        let iteration = AssertUnwindSafe(task()).catch_unwind();
        match tokio::time::timeout(iteration_timeout, iteration).await {
            Ok(Ok(Ok(()))) => debug!(task = %name, "Periodic task iteration completed"),
            Ok(Ok(Err(e))) => warn!(task = %name, error = %e, "Periodic task iteration failed"),
            Ok(Err(_)) => error!(task = %name, "Periodic task iteration panicked"),
            Err(_) => warn!(
                task = %name,
                timeout_ms = iteration_timeout.as_millis() as u64,
                "Periodic task iteration timed out"
            ),
        }
    }

    info!(task = %name, "Periodic task stopped");
}
