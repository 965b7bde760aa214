//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired entries from the
//! in-memory backend.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::MemoryStore;

/// Shortest sweep period accepted.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a task that sweeps `store` every `interval`.
///
/// The task holds only a weak reference and exits on its own once the store
/// is dropped. The returned handle can be used to abort it earlier.
///
/// Must be called from within a tokio runtime.
pub fn spawn_expiry_sweeper(store: Weak<Mutex<MemoryStore>>, interval: Duration) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiry sweeper");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(store) = store.upgrade() else {
                debug!("Store dropped, stopping expiry sweeper");
                break;
            };

            let removed = store.lock().await.cleanup_expired(current_timestamp_ms());

            if removed > 0 {
                info!(removed, "Expiry sweep removed expired entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}
