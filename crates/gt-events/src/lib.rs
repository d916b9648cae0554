//! Process-wide registry of connected push-channel clients.
//!
//! The browser opens one push connection per tab and identifies itself with
//! an opaque client id. Downloads running on behalf of that tab look the id
//! up here and push [`ProgressEvent`]s at it. Delivery is at-most-once and
//! best-effort: no queuing, no backpressure, no redelivery.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use gt_protocol::ProgressEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Events buffered per session before sends start dropping.
const CHANNEL_DEPTH: usize = 64;

struct Entry {
    serial: u64,
    tx: mpsc::Sender<ProgressEvent>,
}

#[derive(Default)]
struct Inner {
    sessions: Mutex<HashMap<String, Entry>>,
    next_serial: AtomicU64,
}

/// Shared map from client id to an open push channel.
///
/// All mutation happens through [`subscribe`](Registry::subscribe),
/// [`send`](Registry::send), and subscription drop; each takes the map lock
/// briefly and never across an await point.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`, replacing any earlier channel under the same id.
    ///
    /// The returned [`Subscription`] deregisters on drop, but only if its
    /// entry is still current: a subscription that was replaced by a later
    /// connect must not evict its replacement.
    pub fn subscribe(&self, id: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        let serial = self.inner.next_serial.fetch_add(1, Ordering::Relaxed);
        let mut sessions = self.inner.sessions.lock().expect("session map lock");
        if sessions
            .insert(id.to_string(), Entry { serial, tx })
            .is_some()
        {
            debug!(client = %id, "replaced existing push channel");
        }
        Subscription {
            id: id.to_string(),
            serial,
            rx,
            registry: self.clone(),
        }
    }

    /// Push `event` at `id`. Returns whether the event was handed to an open
    /// channel; a missing session, a closed channel, or a full buffer all
    /// drop the event.
    pub fn send(&self, id: &str, event: ProgressEvent) -> bool {
        let tx = {
            let sessions = self.inner.sessions.lock().expect("session map lock");
            match sessions.get(id) {
                Some(entry) => entry.tx.clone(),
                None => {
                    debug!(client = %id, "dropping event for unknown session");
                    return false;
                }
            }
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(err) => {
                debug!(client = %id, %err, "dropping event for unreachable session");
                false
            }
        }
    }

    /// Remove `id` unconditionally.
    pub fn remove(&self, id: &str) {
        let mut sessions = self.inner.sessions.lock().expect("session map lock");
        sessions.remove(id);
    }

    fn remove_if_serial(&self, id: &str, serial: u64) {
        let mut sessions = self.inner.sessions.lock().expect("session map lock");
        if sessions.get(id).map(|e| e.serial) == Some(serial) {
            sessions.remove(id);
            debug!(client = %id, "push channel deregistered");
        }
    }

    pub fn len(&self) -> usize {
        self.inner.sessions.lock().expect("session map lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receiving half of one registered push channel.
pub struct Subscription {
    id: String,
    serial: u64,
    rx: mpsc::Receiver<ProgressEvent>,
    registry: Registry,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}

impl futures_util::Stream for Subscription {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove_if_serial(&self.id, self.serial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_protocol::ProgressKind;

    fn event(progress: f64) -> ProgressEvent {
        ProgressEvent::progress(ProgressKind::Video, progress, "downloading")
    }

    #[tokio::test]
    async fn send_reaches_subscriber() {
        let registry = Registry::new();
        let mut sub = registry.subscribe("tab-1");
        assert!(registry.send("tab-1", event(10.0)));
        let got = sub.recv().await.expect("event delivered");
        assert_eq!(got.progress, Some(10.0));
    }

    #[tokio::test]
    async fn send_after_remove_is_a_noop() {
        let registry = Registry::new();
        let _sub = registry.subscribe("tab-1");
        registry.remove("tab-1");
        assert!(registry.is_empty());
        assert!(!registry.send("tab-1", event(10.0)));
    }

    #[tokio::test]
    async fn subscription_drop_deregisters() {
        let registry = Registry::new();
        let sub = registry.subscribe("tab-1");
        drop(sub);
        assert!(registry.is_empty());
        assert!(!registry.send("tab-1", event(10.0)));
    }

    #[tokio::test]
    async fn duplicate_subscribe_replaces_the_channel() {
        let registry = Registry::new();
        let mut first = registry.subscribe("tab-1");
        let mut second = registry.subscribe("tab-1");
        assert_eq!(registry.len(), 1);

        assert!(registry.send("tab-1", event(50.0)));
        let got = second.recv().await.expect("replacement receives");
        assert_eq!(got.progress, Some(50.0));

        // The replaced channel is disconnected from the map; nothing else
        // will ever be pushed at it.
        first.rx.close();
        assert!(first.recv().await.is_none());
    }

    #[tokio::test]
    async fn replaced_subscription_drop_keeps_replacement_registered() {
        let registry = Registry::new();
        let first = registry.subscribe("tab-1");
        let mut second = registry.subscribe("tab-1");
        drop(first);
        assert_eq!(registry.len(), 1);
        assert!(registry.send("tab-1", event(75.0)));
        assert_eq!(second.recv().await.unwrap().progress, Some(75.0));
    }

    #[tokio::test]
    async fn full_buffer_drops_instead_of_blocking() {
        let registry = Registry::new();
        let _sub = registry.subscribe("tab-1");
        for i in 0..CHANNEL_DEPTH {
            assert!(registry.send("tab-1", event(i as f64)));
        }
        assert!(!registry.send("tab-1", event(99.0)));
    }
}
