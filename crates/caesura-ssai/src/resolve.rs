//! Blocking stream-manifest resolution.
//!
//! Server-side sessions hand out their stream manifest URI through an
//! asynchronous SDK callback. Waiting for it is the one place genuine
//! blocking occurs, and it is isolated here: a dedicated task blocks on a
//! condition variable with a hard timeout, off the playback thread. A timed
//! out or cancelled request is abandoned — a late SDK callback for it is
//! discarded by generation check, never applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use caesura_events::{EventBus, SsaiEvent};

use crate::{SsaiError, SsaiResult};

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    uri: Option<Url>,
    failed: Option<String>,
}

pub struct StreamManifestResolver {
    timeout: Duration,
    events: EventBus,
    cancel: CancellationToken,
    slot: Arc<(Mutex<Slot>, Condvar)>,
    /// Generation of the active request; 0 when none is in flight.
    current: AtomicU64,
    next_generation: AtomicU64,
}

impl StreamManifestResolver {
    pub fn new(timeout: Duration, events: EventBus) -> Self {
        Self {
            timeout,
            events,
            cancel: CancellationToken::new(),
            slot: Arc::new((Mutex::new(Slot::default()), Condvar::new())),
            current: AtomicU64::new(0),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Block (off the playback thread) until the session reports the stream
    /// manifest URI, the hard timeout elapses, or the resolver is cancelled.
    pub async fn resolve(&self) -> SsaiResult<Url> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.store(generation, Ordering::SeqCst);
        {
            let (lock, _) = &*self.slot;
            let mut slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
            *slot = Slot {
                generation,
                uri: None,
                failed: None,
            };
        }

        let shared = Arc::clone(&self.slot);
        let cancel = self.cancel.clone();
        let timeout = self.timeout;
        let worker = tokio::task::spawn_blocking(move || {
            let (lock, cvar) = &*shared;
            let mut slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let deadline = Instant::now() + timeout;
            loop {
                if slot.generation == generation {
                    if let Some(uri) = slot.uri.clone() {
                        return Ok(uri);
                    }
                    if let Some(reason) = slot.failed.take() {
                        return Err(SsaiError::Session(reason));
                    }
                }
                if cancel.is_cancelled() {
                    return Err(SsaiError::Cancelled);
                }
                let now = Instant::now();
                if now >= deadline {
                    return Err(SsaiError::ResolveTimeout);
                }
                let (guard, _) = cvar
                    .wait_timeout(slot, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner);
                slot = guard;
            }
        });

        let result = match worker.await {
            Ok(result) => result,
            Err(e) => Err(SsaiError::Session(format!("resolve worker failed: {e}"))),
        };

        // The request is over either way; late callbacks must find nothing
        // to attach to.
        let _ = self.current.compare_exchange(
            generation,
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        match &result {
            Ok(uri) => {
                debug!(%uri, "stream manifest resolved");
                self.events
                    .publish(SsaiEvent::StreamManifestResolved { uri: uri.clone() });
            }
            Err(SsaiError::Cancelled) => {}
            Err(e) => {
                self.events.publish(SsaiEvent::StreamManifestFailed {
                    reason: e.to_string(),
                });
            }
        }
        result
    }

    /// SDK callback: the session produced the stream manifest URI.
    ///
    /// Discarded unless a request is still waiting for it.
    pub fn set_stream_uri(&self, uri: Url) {
        let current = self.current.load(Ordering::SeqCst);
        let (lock, cvar) = &*self.slot;
        let mut slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if current == 0 || slot.generation != current {
            warn!(%uri, "late stream manifest for abandoned request; discarding");
            return;
        }
        slot.uri = Some(uri);
        cvar.notify_all();
    }

    /// SDK callback: the session failed.
    pub fn fail_stream(&self, reason: &str) {
        let current = self.current.load(Ordering::SeqCst);
        let (lock, cvar) = &*self.slot;
        let mut slot = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if current == 0 || slot.generation != current {
            warn!(reason, "late stream failure for abandoned request; discarding");
            return;
        }
        slot.failed = Some(reason.to_string());
        cvar.notify_all();
    }

    /// Abandon any in-flight request and refuse future ones.
    pub fn cancel(&self) {
        self.cancel.cancel();
        let (_, cvar) = &*self.slot;
        cvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use caesura_events::Event;

    use super::*;

    fn manifest() -> Url {
        Url::parse("https://dai.example.com/stream/master.m3u8").unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolve_returns_uri_from_callback() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let resolver = Arc::new(StreamManifestResolver::new(
            Duration::from_secs(1),
            bus,
        ));

        let callback_side = Arc::clone(&resolver);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            callback_side.set_stream_uri(manifest());
        });

        let uri = resolver.resolve().await.unwrap();
        assert_eq!(uri, manifest());
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Ssai(SsaiEvent::StreamManifestResolved { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolve_times_out_and_late_callback_is_discarded() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let resolver = StreamManifestResolver::new(Duration::from_millis(20), bus);

        let result = resolver.resolve().await;
        assert!(matches!(result, Err(SsaiError::ResolveTimeout)));
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Ssai(SsaiEvent::StreamManifestFailed { .. })
        ));

        // The late callback finds no request to attach to.
        resolver.set_stream_uri(manifest());

        // And it must not leak into the next request either.
        let result = resolver.resolve().await;
        assert!(matches!(result, Err(SsaiError::ResolveTimeout)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn session_failure_is_reported() {
        let bus = EventBus::new(8);
        let resolver = Arc::new(StreamManifestResolver::new(
            Duration::from_secs(1),
            bus,
        ));

        let callback_side = Arc::clone(&resolver);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            callback_side.fail_stream("session rejected");
        });

        let result = resolver.resolve().await;
        assert!(matches!(result, Err(SsaiError::Session(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancel_abandons_inflight_request() {
        let bus = EventBus::new(8);
        let resolver = Arc::new(StreamManifestResolver::new(
            Duration::from_secs(5),
            bus,
        ));

        let cancel_side = Arc::clone(&resolver);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            cancel_side.cancel();
        });

        let result = resolver.resolve().await;
        assert!(matches!(result, Err(SsaiError::Cancelled)));
    }
}
