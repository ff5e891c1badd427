//! Background behaviours - Polling tasks that run beside the Discord client.
//!
//! Each behaviour runs on its own tokio task, ticking with a fixed delay between ticks
//! until the shutdown signal fires. A failed tick is logged and the loop carries on;
//! inside a tick, behaviours log and skip individual items that fail.

mod events;
mod expiration;
mod roleplay_logging;
mod roleplay_timeout;

pub use events::{EventQueue, EventReceiver, GatewayEvent};
pub use expiration::{ExpirationBehaviour, ModerationGateway};
pub use roleplay_logging::RoleplayLoggingBehaviour;
pub use roleplay_timeout::RoleplayTimeoutBehaviour;

use crate::errors::Result;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info};

/// A unit of background work run repeatedly by [`spawn_behaviour`].
#[async_trait]
pub trait ContinuousBehaviour: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Performs one round of work.
    async fn tick(&self) -> Result<()>;
}

/// Runs a behaviour on a new task until `shutdown` becomes `true` or its sender drops.
pub fn spawn_behaviour<B>(
    behaviour: Arc<B>,
    delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    B: ContinuousBehaviour + ?Sized,
{
    tokio::spawn(async move {
        let name = behaviour.name();
        info!(behaviour = name, ?delay, "Behaviour started");

        while !*shutdown.borrow() {
            if let Err(e) = behaviour.tick().await {
                error!(behaviour = name, error = %e, "Behaviour tick failed");
            }

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(behaviour = name, "Behaviour stopped");
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        ticks: AtomicUsize,
    }

    #[async_trait]
    impl ContinuousBehaviour for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        async fn tick(&self) -> Result<()> {
            let previous = self.ticks.fetch_add(1, Ordering::SeqCst);
            // Every other tick fails; the loop must keep going regardless
            if previous % 2 == 0 {
                return Err(Error::validation("boom"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_behaviour_survives_failures_and_stops_on_signal() {
        let counter = Arc::new(Counter {
            ticks: AtomicUsize::new(0),
        });
        let (stop, shutdown) = watch::channel(false);
        let handle = spawn_behaviour(Arc::clone(&counter), Duration::from_millis(5), shutdown);

        tokio::time::sleep(Duration::from_millis(60)).await;
        stop.send(true).unwrap();
        handle.await.unwrap();

        let ticks = counter.ticks.load(Ordering::SeqCst);
        assert!(ticks >= 3, "expected several ticks, got {ticks}");

        // No more ticks after shutdown
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.ticks.load(Ordering::SeqCst), ticks);
    }

    #[tokio::test]
    async fn test_behaviour_stops_when_sender_is_dropped() {
        let counter = Arc::new(Counter {
            ticks: AtomicUsize::new(0),
        });
        let (stop, shutdown) = watch::channel(false);
        let handle = spawn_behaviour(counter, Duration::from_secs(3600), shutdown);

        drop(stop);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
