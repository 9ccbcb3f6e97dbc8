// Stats aggregator: listener fan-out plus the batch -> persisted average fold.
//
// Every `max_size` responses the batch average is blended into the running
// average as (old + batch) / 2 and written under the current network key.

use crate::average_store::AverageStore;
use crate::collector::SpeedSampleCollector;
use crate::error::{ExchangeError, StatsError};
use crate::handler::RequestStatsHandler;
use crate::listeners::{ListenerId, ListenerRegistry, OnResponseListener};
use crate::models::{NetworkInfo, RequestStats};
use crate::network_key;
use crate::provider::NetworkInfoProvider;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_SIZE: u32 = 10;

#[derive(Debug)]
struct FoldState {
    request_count: u32,
    current_average: f64,
}

pub struct StatsAggregator {
    store: Arc<dyn AverageStore>,
    provider: Arc<dyn NetworkInfoProvider>,
    listeners: ListenerRegistry,
    collector: SpeedSampleCollector,
    state: Mutex<FoldState>,
    max_size: AtomicU32,
    folds: AtomicU64,
}

impl StatsAggregator {
    /// Starts from the persisted average of the network active right now.
    pub fn new(store: Arc<dyn AverageStore>, provider: Arc<dyn NetworkInfoProvider>) -> Self {
        let key = network_key_for(provider.as_ref());
        let initial = store.get(&key);
        debug!(network_key = %key, average_speed = initial, "loaded persisted average");
        Self {
            store,
            provider,
            listeners: ListenerRegistry::new(),
            collector: SpeedSampleCollector::new(),
            state: Mutex::new(FoldState {
                request_count: 0,
                current_average: initial,
            }),
            max_size: AtomicU32::new(DEFAULT_MAX_SIZE),
            folds: AtomicU64::new(0),
        }
    }

    pub fn with_max_size(
        store: Arc<dyn AverageStore>,
        provider: Arc<dyn NetworkInfoProvider>,
        max_size: u32,
    ) -> Result<Self, StatsError> {
        let aggregator = Self::new(store, provider);
        aggregator.set_max_size_for_persistence(max_size)?;
        Ok(aggregator)
    }

    pub fn add_listener(&self, listener: Arc<dyn OnResponseListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of responses between folds. Zero is rejected and the previous
    /// value kept; the in-progress counter is not touched.
    pub fn set_max_size_for_persistence(&self, size: u32) -> Result<(), StatsError> {
        if size == 0 {
            warn!(size, "rejecting max size for persistence");
            return Err(StatsError::InvalidMaxSize(size));
        }
        self.max_size.store(size, Ordering::Relaxed);
        Ok(())
    }

    pub fn max_size_for_persistence(&self) -> u32 {
        self.max_size.load(Ordering::Relaxed)
    }

    /// Last folded average; unfolded samples are not reflected.
    pub fn average_network_speed(&self) -> f64 {
        self.lock_state().current_average
    }

    /// Responses counted since the last fold.
    pub fn pending_requests(&self) -> u32 {
        self.lock_state().request_count
    }

    pub fn fold_count(&self) -> u64 {
        self.folds.load(Ordering::Relaxed)
    }

    /// Active network, or `None` when disconnected or the query was refused.
    pub fn active_network_info(&self) -> Option<NetworkInfo> {
        active_network(self.provider.as_ref())
    }

    /// Key the next fold would be written under.
    pub fn current_network_key(&self) -> String {
        network_key_for(self.provider.as_ref())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FoldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts one response and folds when the threshold is reached.
    fn count_response(&self) {
        let mut state = self.lock_state();
        state.request_count += 1;
        if state.request_count < self.max_size_for_persistence() {
            return;
        }

        let batch_average = self.collector.take_average();
        let new_average = (state.current_average + batch_average) / 2.0;
        let key = self.current_network_key();
        self.store.set(&key, new_average);
        state.current_average = new_average;
        state.request_count = 0;
        self.folds.fetch_add(1, Ordering::Relaxed);
        info!(
            network_key = %key,
            batch_average,
            average_speed = new_average,
            "average network speed updated"
        );
    }

    fn notify_error(&self, stats: &RequestStats, error: ExchangeError) {
        let network = self.active_network_info();
        self.listeners.notify_error(network.as_ref(), stats, &error);
    }
}

fn active_network(provider: &dyn NetworkInfoProvider) -> Option<NetworkInfo> {
    match provider.active_network_info() {
        Ok(info) => info,
        Err(e) => {
            debug!(error = %e, operation = "active_network_info", "treating as no network");
            None
        }
    }
}

fn network_key_for(provider: &dyn NetworkInfoProvider) -> String {
    let info = active_network(provider);
    network_key::resolve(info.as_ref(), || match provider.current_ssid() {
        Ok(ssid) => ssid,
        Err(e) => {
            debug!(error = %e, operation = "current_ssid", "ssid unavailable");
            None
        }
    })
    .key()
}

impl RequestStatsHandler for StatsAggregator {
    fn on_response_received(&self, stats: &RequestStats) {
        debug!(request_id = stats.id, url = %stats.url, "response received");

        let network = self.active_network_info();
        self.listeners.notify_success(network.as_ref(), stats);

        self.count_response();

        // Recorded after the fold check: a fold-triggering response belongs
        // to the next batch.
        self.collector.add_sample(stats.api_speed());
    }

    fn on_http_exchange_error(&self, stats: &RequestStats, error: std::io::Error) {
        debug!(request_id = stats.id, error = %error, "http exchange error");
        self.notify_error(stats, ExchangeError::HttpExchange(error));
    }

    fn on_response_input_stream_error(&self, stats: &RequestStats, error: anyhow::Error) {
        debug!(request_id = stats.id, error = %error, "response input stream error");
        self.notify_error(stats, ExchangeError::ResponseStream(error));
    }
}
