//! Consumer scheduler
//!
//! Drives the queue consumer as a single non-overlapping periodic task: one
//! polling cycle finishes before the next fires, so per-record processing
//! order matches read order. Shutdown is cooperative - a signalled loop
//! lets the in-flight cycle finish, then exits.

use crate::consumer::ModerationConsumer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the polling loop.
///
/// The loop initializes the consumer group once, then polls at
/// `poll_interval` until `true` arrives on the shutdown channel.
pub fn spawn_consumer_loop(
    consumer: Arc<ModerationConsumer>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        consumer.init().await;

        let mut ticker = tokio::time::interval(poll_interval);
        // A slow cycle delays the next tick instead of bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = poll_interval.as_secs(), "Moderation consumer started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    consumer.poll_once().await;
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Moderation consumer stopped");
    })
}
