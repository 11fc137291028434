//! Listener registration and dispatch.
//!
//! The [`ListenerTable`] bridges the parser's synchronous dispatch path to
//! async callers. Decoded responses are fanned out as `Arc<XBeeResponse>` to
//! every registered listener whose filter accepts them, in registration
//! order. Collecting listeners buffer matches on an unbounded channel and
//! the owning [`PacketListener`] awaits them with a deadline; inline
//! handlers run on the dispatch path itself and must buffer-and-return
//! rather than block.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::filter::ResponseFilter;
use crate::response::XBeeResponse;

/// Inline dispatch-path callback.
pub type Handler = Arc<dyn Fn(&Arc<XBeeResponse>) + Send + Sync>;

/// Identifies a registration for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    filter: ResponseFilter,
    handler: Option<Handler>,
    buffer: Option<mpsc::UnboundedSender<Arc<XBeeResponse>>>,
    max_count: Option<usize>,
    delivered: usize,
}

/// Synchronized registration table shared between the parser and callers.
///
/// A listener stays registered until it is explicitly removed or its
/// max-count is exhausted; every inbound frame pays one predicate check per
/// live entry, so long-lived listeners should be few and their filters cheap.
#[derive(Default)]
pub struct ListenerTable {
    entries: Mutex<Vec<ListenerEntry>>,
    next_id: AtomicU64,
}

impl ListenerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, entry: ListenerEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a collecting listener.
    ///
    /// Matching responses are buffered until the returned handle consumes
    /// them. With a `max_count` the registration removes itself after that
    /// many matches.
    pub fn listen(
        self: &Arc<Self>,
        filter: ResponseFilter,
        max_count: Option<usize>,
    ) -> PacketListener {
        let id = self.allocate_id();
        let (tx, rx) = mpsc::unbounded_channel();
        self.insert(ListenerEntry {
            id,
            filter,
            handler: None,
            buffer: Some(tx),
            max_count,
            delivered: 0,
        });
        PacketListener {
            id,
            table: Arc::clone(self),
            rx,
            max_count,
        }
    }

    /// Registers a fire-and-forget inline handler.
    ///
    /// The handler runs on the parser's dispatch path for every match, so it
    /// must return quickly and never block on a send or receive. A panicking
    /// handler is isolated; it does not stop delivery to later listeners.
    pub fn subscribe(
        &self,
        filter: ResponseFilter,
        handler: impl Fn(&Arc<XBeeResponse>) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.allocate_id();
        self.insert(ListenerEntry {
            id,
            filter,
            handler: Some(Arc::new(handler)),
            buffer: None,
            max_count: None,
            delivered: 0,
        });
        id
    }

    /// Removes a registration. Removing an unknown id is a no-op.
    pub fn remove(&self, id: ListenerId) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|entry| entry.id != id);
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every registration. Used on teardown.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Delivers a response to every matching listener live right now.
    ///
    /// The matching set is snapshotted under the lock, then invoked outside
    /// it, so a handler may register or remove listeners without
    /// deadlocking. Exhausted max-count entries are dropped from the table
    /// as part of the same snapshot.
    pub fn dispatch(&self, response: &Arc<XBeeResponse>) {
        let targets: Vec<(Option<Handler>, Option<mpsc::UnboundedSender<Arc<XBeeResponse>>>)> = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let mut targets = Vec::new();
            for entry in entries.iter_mut() {
                if !entry.filter.matches(response) {
                    continue;
                }
                entry.delivered += 1;
                targets.push((entry.handler.clone(), entry.buffer.clone()));
            }
            entries.retain(|entry| match entry.max_count {
                Some(max) => entry.delivered < max,
                None => true,
            });
            targets
        };

        for (handler, buffer) in targets {
            if let Some(handler) = handler {
                if catch_unwind(AssertUnwindSafe(|| handler(response))).is_err() {
                    tracing::warn!("listener handler panicked, continuing dispatch");
                }
            }
            if let Some(buffer) = buffer {
                // A dropped handle just discards its deliveries; the entry
                // stays registered until explicitly removed.
                let _ = buffer.send(Arc::clone(response));
            }
        }
    }
}

/// Collecting listener handle.
///
/// Owns the buffer end of a registration; dropping the handle stops
/// consumption but does not deregister - call [`PacketListener::remove`]
/// (or let a max-count run out) to take the entry off the dispatch path.
pub struct PacketListener {
    id: ListenerId,
    table: Arc<ListenerTable>,
    rx: mpsc::UnboundedReceiver<Arc<XBeeResponse>>,
    max_count: Option<usize>,
}

impl PacketListener {
    /// The registration id backing this handle.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Waits for the next matching response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if nothing matched within the deadline.
    pub async fn next(&mut self, timeout: Duration) -> Result<Arc<XBeeResponse>> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(Error::ChannelClosed),
            Err(_) => Err(Error::timeout(timeout)),
        }
    }

    /// Collects matching responses until the max-count is reached or the
    /// timeout elapses, returning whatever accumulated.
    ///
    /// An empty result means nothing matched within the deadline; callers
    /// awaiting a specific response must treat that as a timeout, not as a
    /// silent success.
    pub async fn collect(&mut self, timeout: Duration) -> Vec<Arc<XBeeResponse>> {
        let deadline = Instant::now() + timeout;
        let mut collected = Vec::new();

        loop {
            if let Some(max) = self.max_count {
                if collected.len() >= max {
                    break;
                }
            }
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(response)) => collected.push(response),
                Ok(None) | Err(_) => break,
            }
        }

        collected
    }

    /// Deregisters this listener from the dispatch path.
    pub fn remove(self) {
        self.table.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::ModemStatus;
    use crate::response::ModemStatusResponse;

    use super::*;

    fn modem_status(status: ModemStatus) -> Arc<XBeeResponse> {
        Arc::new(XBeeResponse::ModemStatus(ModemStatusResponse { status }))
    }

    #[tokio::test]
    async fn test_collect_returns_buffered_matches() {
        let table = Arc::new(ListenerTable::new());
        let mut listener = table.listen(ResponseFilter::any(), Some(2));

        table.dispatch(&modem_status(ModemStatus::Joined));
        table.dispatch(&modem_status(ModemStatus::Disassociated));

        let collected = listener.collect(Duration::from_millis(100)).await;
        assert_eq!(collected.len(), 2);
        // Max-count exhausted: the entry removed itself.
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_never_matching_listener_times_out_empty() {
        let table = Arc::new(ListenerTable::new());
        let filter = ResponseFilter::frame_id(99);
        let mut listener = table.listen(filter, Some(1));

        table.dispatch(&modem_status(ModemStatus::Joined));

        let started = std::time::Instant::now();
        let collected = listener.collect(Duration::from_millis(50)).await;
        assert!(collected.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(50));

        assert!(matches!(
            listener.next(Duration::from_millis(20)).await,
            Err(Error::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatch_in_registration_order() {
        let table = Arc::new(ListenerTable::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..3u8 {
            let order = Arc::clone(&order);
            table.subscribe(ResponseFilter::any(), move |_| {
                order.lock().unwrap().push(tag);
            });
        }

        table.dispatch(&modem_status(ModemStatus::Joined));
        assert_eq!(&*order.lock().unwrap(), &[0, 1, 2]);
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_stop_delivery() {
        let table = Arc::new(ListenerTable::new());
        table.subscribe(ResponseFilter::any(), |_| panic!("boom"));
        let mut listener = table.listen(ResponseFilter::any(), Some(1));

        table.dispatch(&modem_status(ModemStatus::Joined));
        table.dispatch(&modem_status(ModemStatus::Joined));

        assert!(listener.next(Duration::from_millis(100)).await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_may_register_during_dispatch() {
        let table = Arc::new(ListenerTable::new());
        let inner = Arc::clone(&table);
        table.subscribe(ResponseFilter::any(), move |_| {
            inner.subscribe(ResponseFilter::any(), |_| {});
        });

        table.dispatch(&modem_status(ModemStatus::Joined));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_removal() {
        let table = Arc::new(ListenerTable::new());
        let id = table.subscribe(ResponseFilter::any(), |_| {});
        assert_eq!(table.len(), 1);
        table.remove(id);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_removed_listener_not_in_dispatch_set() {
        let table = Arc::new(ListenerTable::new());
        let listener = table.listen(ResponseFilter::any(), None);
        let mut survivor = table.listen(ResponseFilter::any(), Some(1));

        listener.remove();
        table.dispatch(&modem_status(ModemStatus::Joined));

        assert!(survivor.next(Duration::from_millis(100)).await.is_ok());
        assert!(table.is_empty());
    }
}
