// Concurrent completions: folds are neither lost nor duplicated

mod common;

use common::{RecordingListener, RecordingStore, stats_with_speed};
use netstats::aggregator::StatsAggregator;
use netstats::handler::RequestStatsHandler;
use netstats::models::NetworkInfo;
use netstats::provider::StaticNetworkProvider;
use std::sync::Arc;

const THREADS: u64 = 8;

fn aggregator(store: Arc<RecordingStore>, max_size: u32) -> StatsAggregator {
    let provider = Arc::new(StaticNetworkProvider::new(
        Some(NetworkInfo::mobile("LTE")),
        None,
    ));
    StatsAggregator::with_max_size(store, provider, max_size).unwrap()
}

#[test]
fn concurrent_responses_fold_exactly_k_times() {
    let max_size = 10u32;
    let k = 40u64;
    let total = k * max_size as u64;
    let store = Arc::new(RecordingStore::default());
    let agg = aggregator(store.clone(), max_size);

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let agg = &agg;
            s.spawn(move || {
                for i in 0..total / THREADS {
                    agg.on_response_received(&stats_with_speed(t * 1_000 + i, 100));
                }
            });
        }
    });

    assert_eq!(agg.fold_count(), k);
    assert_eq!(agg.pending_requests(), 0);
    assert_eq!(store.writes().len(), k as usize);
    assert!(store.writes().iter().all(|(key, _)| key == "mobile_LTE"));
}

#[test]
fn concurrent_errors_and_responses_only_count_responses() {
    let store = Arc::new(RecordingStore::default());
    let agg = aggregator(store.clone(), 5);
    let listener = Arc::new(RecordingListener::default());
    agg.add_listener(listener.clone());

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let agg = &agg;
            s.spawn(move || {
                for i in 0..25 {
                    let stats = stats_with_speed(t * 100 + i, 10);
                    agg.on_response_received(&stats);
                    agg.on_http_exchange_error(&stats, std::io::Error::other("reset"));
                }
            });
        }
    });

    // 200 responses / 5 per fold
    assert_eq!(agg.fold_count(), 40);
    assert_eq!(agg.pending_requests(), 0);
    assert_eq!(listener.count(), 400);
}

#[test]
fn uniform_speeds_converge_under_contention() {
    let store = Arc::new(RecordingStore::default());
    let agg = aggregator(store, 4);

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let agg = &agg;
            s.spawn(move || {
                for i in 0..50 {
                    agg.on_response_received(&stats_with_speed(t * 100 + i, 64));
                }
            });
        }
    });

    // Every batch average is 64 or 0 (empty), so the blend stays within range
    let avg = agg.average_network_speed();
    assert!((0.0..=64.0).contains(&avg), "average out of range: {avg}");
    assert_eq!(agg.fold_count(), 100);
}

#[test]
fn listener_churn_during_dispatch_is_safe() {
    let agg = aggregator(Arc::new(RecordingStore::default()), 3);
    let stable = Arc::new(RecordingListener::default());
    agg.add_listener(stable.clone());

    std::thread::scope(|s| {
        let agg = &agg;
        s.spawn(move || {
            for _ in 0..200 {
                let id = agg.add_listener(Arc::new(RecordingListener::default()));
                agg.remove_listener(id);
            }
        });
        for t in 0..4u64 {
            s.spawn(move || {
                for i in 0..50 {
                    agg.on_response_received(&stats_with_speed(t * 100 + i, 1));
                }
            });
        }
    });

    assert_eq!(stable.count(), 200);
    assert_eq!(agg.fold_count(), 66);
    assert_eq!(agg.pending_requests(), 2);
}
