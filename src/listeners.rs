// Observer registry: copy-on-write snapshot so dispatch never holds the lock

use crate::error::ExchangeError;
use crate::models::{NetworkInfo, RequestStats};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Callbacks for every observed request outcome.
pub trait OnResponseListener: Send + Sync {
    fn on_response_success(&self, network: Option<&NetworkInfo>, stats: &RequestStats);

    fn on_response_error(
        &self,
        network: Option<&NetworkInfo>,
        stats: &RequestStats,
        error: &ExchangeError,
    );
}

/// Handle returned by [`ListenerRegistry::add`], used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Entry = (ListenerId, Arc<dyn OnResponseListener>);

#[derive(Default)]
pub struct ListenerRegistry {
    entries: RwLock<Arc<Vec<Entry>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Adding the same `Arc` again returns its existing id.
    pub fn add(&self, listener: Arc<dyn OnResponseListener>) -> ListenerId {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some((id, _)) = entries.iter().find(|(_, l)| same_listener(l, &listener)) {
            return *id;
        }
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push((id, listener));
        *entries = Arc::new(next);
        id
    }

    /// Returns false when `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        let next: Vec<Entry> = entries
            .iter()
            .filter(|(existing, _)| *existing != id)
            .cloned()
            .collect();
        *entries = Arc::new(next);
        true
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn notify_success(&self, network: Option<&NetworkInfo>, stats: &RequestStats) {
        self.dispatch("on_response_success", |l| {
            l.on_response_success(network, stats)
        });
    }

    pub fn notify_error(
        &self,
        network: Option<&NetworkInfo>,
        stats: &RequestStats,
        error: &ExchangeError,
    ) {
        self.dispatch("on_response_error", |l| {
            l.on_response_error(network, stats, error)
        });
    }

    fn snapshot(&self) -> Arc<Vec<Entry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs `f` for every listener in the current snapshot. A panicking
    /// listener is logged and skipped.
    fn dispatch(&self, callback: &'static str, f: impl Fn(&dyn OnResponseListener)) {
        let snapshot = self.snapshot();
        for (id, listener) in snapshot.iter() {
            if catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))).is_err() {
                tracing::warn!(listener_id = id.0, callback, "listener panicked; skipped");
            }
        }
    }
}

fn same_listener(a: &Arc<dyn OnResponseListener>, b: &Arc<dyn OnResponseListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
