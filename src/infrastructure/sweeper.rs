//! Periodic background sweeps
//!
//! Stores that hold time-bounded state implement [`Sweep`]; [`spawn_sweeper`]
//! runs the sweep on a fixed period until the returned [`SweeperHandle`] is
//! shut down or dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::select;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shortest period a sweeper will tick at
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A store whose dead entries can be reclaimed in one pass
pub trait Sweep: Send + Sync + 'static {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Physically remove dead entries, returning how many were removed
    fn sweep(&self) -> usize;
}

/// Owner of a running sweep task
///
/// Dropping the handle signals the task to stop; [`shutdown`](Self::shutdown)
/// also waits for it to finish.
#[derive(Debug)]
pub struct SweeperHandle {
    name: &'static str,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the sweep task and wait for it to exit
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(sweeper = self.name, "Sweep task ended abnormally: {}", e);
            }
        }

        info!(sweeper = self.name, "Sweeper stopped");
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        // The receiver may already be gone.
        let _ = self.shutdown_tx.send(true);
    }
}

/// Start sweeping `target` every `period`
///
/// The first sweep happens one full period after the call. Must be called
/// from within a tokio runtime.
pub fn spawn_sweeper<S>(target: Arc<S>, period: Duration) -> SweeperHandle
where
    S: Sweep + ?Sized,
{
    let name = target.name();
    let period = period.max(MIN_PERIOD);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(sweeper = name, period_ms = period.as_millis() as u64, "Starting sweeper");

    let task = tokio::spawn(run_sweeper(target, period, shutdown_rx));

    SweeperHandle {
        name,
        shutdown_tx,
        task: Some(task),
    }
}

async fn run_sweeper<S>(target: Arc<S>, period: Duration, mut shutdown_rx: watch::Receiver<bool>)
where
    S: Sweep + ?Sized,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            _ = ticker.tick() => {
                let removed = target.sweep();
                debug!(sweeper = target.name(), removed, "Sweep pass complete");
            }
            // Fires on an explicit signal and when the sender is dropped.
            _ = shutdown_rx.changed() => {
                return;
            }
        }
    }
}
