// Shared test helpers: recording fakes for the aggregator's collaborators
#![allow(dead_code)]

use netstats::average_store::AverageStore;
use netstats::error::{ExchangeError, ProviderError};
use netstats::listeners::OnResponseListener;
use netstats::models::{NetworkInfo, RequestStats};
use netstats::provider::NetworkInfoProvider;
use std::collections::HashMap;
use std::sync::Mutex;

/// A response whose `api_speed()` is exactly `speed` bytes/sec.
pub fn stats_with_speed(id: u64, speed: u64) -> RequestStats {
    RequestStats {
        id,
        url: format!("https://example.test/{id}"),
        method: "GET".into(),
        host_name: "example.test".into(),
        request_size: 128,
        response_size: speed,
        http_response_code: 200,
        start_time: 10_000,
        end_time: 11_000,
    }
}

/// Store that remembers every write in order.
#[derive(Default)]
pub struct RecordingStore {
    values: Mutex<HashMap<String, f64>>,
    writes: Mutex<Vec<(String, f64)>>,
}

impl RecordingStore {
    pub fn with_value(key: &str, value: f64) -> Self {
        let store = Self::default();
        store.values.lock().unwrap().insert(key.to_string(), value);
        store
    }

    pub fn writes(&self) -> Vec<(String, f64)> {
        self.writes.lock().unwrap().clone()
    }
}

impl AverageStore for RecordingStore {
    fn get(&self, key: &str) -> f64 {
        self.values.lock().unwrap().get(key).copied().unwrap_or(0.0)
    }

    fn set(&self, key: &str, value: f64) {
        self.values.lock().unwrap().insert(key.to_string(), value);
        self.writes.lock().unwrap().push((key.to_string(), value));
    }
}

/// Provider whose every query is refused.
pub struct DeniedProvider;

impl NetworkInfoProvider for DeniedProvider {
    fn active_network_info(&self) -> Result<Option<NetworkInfo>, ProviderError> {
        Err(ProviderError::PermissionDenied("active network"))
    }

    fn current_ssid(&self) -> Result<Option<String>, ProviderError> {
        Err(ProviderError::Unavailable("wifi"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Success {
        id: u64,
        network: Option<NetworkInfo>,
    },
    Error {
        id: u64,
        network: Option<NetworkInfo>,
        message: String,
    },
}

#[derive(Default)]
pub struct RecordingListener {
    seen: Mutex<Vec<Seen>>,
}

impl RecordingListener {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl OnResponseListener for RecordingListener {
    fn on_response_success(&self, network: Option<&NetworkInfo>, stats: &RequestStats) {
        self.seen.lock().unwrap().push(Seen::Success {
            id: stats.id,
            network: network.cloned(),
        });
    }

    fn on_response_error(
        &self,
        network: Option<&NetworkInfo>,
        stats: &RequestStats,
        error: &ExchangeError,
    ) {
        self.seen.lock().unwrap().push(Seen::Error {
            id: stats.id,
            network: network.cloned(),
            message: error.to_string(),
        });
    }
}

/// Listener that panics on every callback.
pub struct PanickingListener;

impl OnResponseListener for PanickingListener {
    fn on_response_success(&self, _network: Option<&NetworkInfo>, _stats: &RequestStats) {
        panic!("listener failure on success");
    }

    fn on_response_error(
        &self,
        _network: Option<&NetworkInfo>,
        _stats: &RequestStats,
        _error: &ExchangeError,
    ) {
        panic!("listener failure on error");
    }
}
