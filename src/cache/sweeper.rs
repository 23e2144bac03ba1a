//! Background expiry sweep
//!
//! Runs once per TTL period, not on a wall-clock schedule, so an entry lives
//! between `ttl` and just under `2 * ttl` before the sweep removes it.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::store::Store;

/// Longest gap between two sweeps
///
/// Larger TTLs still expire entries correctly: a sweep only removes entries
/// whose age has reached the TTL, so sweeping earlier removes nothing extra.
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Keeps a sweep task alive; dropping it stops the task
pub(super) struct SweeperHandle {
    // The task exits when this sender is dropped.
    _shutdown_tx: oneshot::Sender<()>,
    #[cfg_attr(not(test), allow(dead_code))]
    task: JoinHandle<()>,
}

impl SweeperHandle {
    #[cfg(test)]
    pub(super) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Interval period for a TTL, capped so deadlines stay representable
fn sweep_period(ttl: Duration) -> Duration {
    ttl.min(MAX_SWEEP_PERIOD)
}

/// Spawns a sweep task that first fires one `period` from now
///
/// Returns `None` when called outside a tokio runtime. Reads still honor the
/// TTL in that case, but nothing removes expired entries in the background.
pub(super) fn spawn(store: Weak<Store>, period: Duration) -> Option<SweeperHandle> {
    let runtime = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            tracing::warn!(
                period = ?period,
                "No tokio runtime available, expiry sweep not scheduled"
            );
            return None;
        }
    };

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let period = sweep_period(period);

    let task = runtime.spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let Some(store) = store.upgrade() else {
                        break;
                    };
                    let removed = store.sweep(Instant::now());
                    tracing::debug!(removed, "Expiry sweep completed");
                }
                _ = &mut shutdown_rx => {
                    break;
                }
            }
        }
    });

    Some(SweeperHandle {
        _shutdown_tx: shutdown_tx,
        task,
    })
}
