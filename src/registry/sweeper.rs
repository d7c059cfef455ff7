use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use super::Registry;

/// Shortest period the sweeper will run at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to the background expiry sweep.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Expiry sweeper terminated abnormally: {}", e);
        }
    }
}

/// Purge expired records from `registry` every `every`. The first sweep runs
/// one full interval after start. Periods below [`MIN_SWEEP_INTERVAL`],
/// including zero, are raised to it.
pub fn spawn_sweeper(registry: Arc<Registry>, every: Duration) -> SweeperHandle {
    let every = if every < MIN_SWEEP_INTERVAL {
        tracing::warn!(
            requested = ?every,
            using = ?MIN_SWEEP_INTERVAL,
            "Sweep interval too short, clamping"
        );
        MIN_SWEEP_INTERVAL
    } else {
        every
    };
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = time::interval(every);
        // The first tick fires immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let purged = registry.sweep_expired();
                    tracing::debug!(purged, remaining = registry.len(), "Expiry sweep finished");
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::info!("Shutdown signal received, stopping expiry sweeper");
                        break;
                    }
                }
            }
        }
    });

    SweeperHandle { shutdown_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ManualClock;
    use chrono::Utc;

    #[tokio::test]
    async fn test_zero_interval_still_sweeps() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let registry = Arc::new(Registry::new().with_clock(clock.clone()));
        registry
            .create("https://example.com", 1, Some("zero01"))
            .unwrap();
        clock.advance(chrono::Duration::minutes(2));

        let sweeper = spawn_sweeper(Arc::clone(&registry), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(registry.is_empty());
        assert!(!sweeper.task.is_finished());
        sweeper.shutdown().await;
    }
}
