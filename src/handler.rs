// Callbacks the network layer drives on each completed exchange

use crate::models::RequestStats;

pub trait RequestStatsHandler: Send + Sync {
    /// Response fully read.
    fn on_response_received(&self, stats: &RequestStats);

    /// Request could not be executed (connect, TLS, write, ...).
    fn on_http_exchange_error(&self, stats: &RequestStats, error: std::io::Error);

    /// Response started but reading its body failed.
    fn on_response_input_stream_error(&self, stats: &RequestStats, error: anyhow::Error);
}
