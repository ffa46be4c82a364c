// ── Periodic status monitor ──
//
// Fixed-interval collection loop publishing full-replacement status
// snapshots through a watch channel. Independent of the apply cycle:
// it never blocks on it, and stopping is just cancelling the next
// tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::exchange::ControlInterface;
use crate::status::{StatusSnapshot, collect};

/// Spawn the status-refresh loop.
///
/// Returns the snapshot receiver plus the task handle. The first tick
/// fires immediately, so subscribers see real data after one
/// collection rather than one interval.
pub fn spawn_monitor(
    control: Arc<dyn ControlInterface>,
    interval: Duration,
    cancel: CancellationToken,
) -> (watch::Receiver<Arc<StatusSnapshot>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Arc::new(StatusSnapshot::empty()));

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let snapshot = collect(control.as_ref()).await;
                    tx.send_replace(Arc::new(snapshot));
                }
            }
        }
        debug!("status monitor stopped");
    });

    (rx, handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::ExchangeError;
    use crate::model::RegistrationState;
    use crate::status::SHOW_CONTACTS;

    struct CountingControl {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ControlInterface for CountingControl {
        async fn run(&self, command: &str) -> Result<String, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if command == SHOW_CONTACTS {
                Ok("1011/sip:1011@h  x  Avail  1.0".into())
            } else {
                Ok(String::new())
            }
        }
    }

    #[tokio::test]
    async fn monitor_publishes_snapshots_and_stops_on_cancel() {
        let control = Arc::new(CountingControl {
            calls: AtomicU32::new(0),
        });
        let cancel = CancellationToken::new();
        let (mut rx, handle) = spawn_monitor(
            Arc::clone(&control) as Arc<dyn ControlInterface>,
            Duration::from_millis(10),
            cancel.clone(),
        );

        // First collected snapshot replaces the empty seed.
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(
            snapshot.registrations.get("1011"),
            Some(&RegistrationState::Available)
        );
        assert!(snapshot.collected_at.is_some());

        cancel.cancel();
        handle.await.unwrap();
        let after_stop = control.calls.load(Ordering::SeqCst);

        // No further collection once cancelled.
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(control.calls.load(Ordering::SeqCst), after_stop);
    }
}
