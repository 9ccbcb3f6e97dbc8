// Durable network-key -> average speed mapping

mod sqlite;

pub use sqlite::SqliteAverageStore;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Last-known average speed per network key.
///
/// `set` is fire-and-forget from the caller's point of view: it must not block
/// on durable I/O, and implementations log rather than drop failed writes.
pub trait AverageStore: Send + Sync {
    /// Persisted average for `key`, 0.0 when absent.
    fn get(&self, key: &str) -> f64;

    /// Records `value` under `key`. Last write wins.
    fn set(&self, key: &str, value: f64);
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryAverageStore {
    averages: RwLock<HashMap<String, f64>>,
}

impl MemoryAverageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, e.g. with values from a previous session.
    pub fn with_averages<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let averages = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            averages: RwLock::new(averages),
        }
    }

    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.averages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AverageStore for MemoryAverageStore {
    fn get(&self, key: &str) -> f64 {
        self.averages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0.0)
    }

    fn set(&self, key: &str, value: f64) {
        self.averages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}
