//! Background polling of the run source with reconnect backoff.

use crate::config::ReconnectConfig;
use crate::events::TuiEvent;
use crate::source::{RunSource, SourceCache};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Poll `source` every `interval`, forwarding changed payloads as
/// [`TuiEvent::Sources`]. Failures back off per `reconnect` until the next
/// success. The task ends when the receiver is dropped.
pub fn spawn_poller(
    source: Arc<dyn RunSource>,
    interval: Duration,
    reconnect: ReconnectConfig,
    sender: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut cache = SourceCache::new();
        let mut backoff = reconnect.initial_ms;
        let origin = source.describe();

        loop {
            let event = match source.fetch().await {
                Ok(payload) => match cache.ingest(&payload) {
                    Ok(Some(sources)) => {
                        tracing::debug!(
                            source = %origin,
                            records = sources.len(),
                            bytes = payload.len(),
                            "Run data changed"
                        );
                        Ok(TuiEvent::Sources(sources))
                    }
                    Ok(None) => Ok(TuiEvent::SourceUnchanged),
                    Err(err) => Err(err),
                },
                Err(err) => Err(err),
            };

            let delay = match event {
                Ok(event) => {
                    backoff = reconnect.initial_ms;
                    if sender.send(event).await.is_err() {
                        break;
                    }
                    interval
                }
                Err(err) => {
                    tracing::warn!(source = %origin, error = %err, backoff_ms = backoff, "Run fetch failed");
                    if sender.send(TuiEvent::SourceError(err.to_string())).await.is_err() {
                        break;
                    }
                    let delay = jittered_backoff(backoff, reconnect.jitter_ms);
                    backoff = next_backoff(backoff, &reconnect);
                    Duration::from_millis(delay)
                }
            };

            tokio::time::sleep(delay).await;
        }
    })
}

pub fn next_backoff(current_ms: u64, reconnect: &ReconnectConfig) -> u64 {
    let next = (current_ms as f64 * reconnect.multiplier) as u64;
    next.min(reconnect.max_ms)
}

pub fn jittered_backoff(base_ms: u64, jitter_ms: u64) -> u64 {
    if jitter_ms == 0 {
        return base_ms;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_nanos(0))
        .subsec_nanos() as u64;
    let jitter = nanos % jitter_ms;
    base_ms.saturating_add(jitter)
}
