use anyhow::Result;
use netstats::aggregator::StatsAggregator;
use netstats::average_store::SqliteAverageStore;
use netstats::config::AppConfig;
use netstats::error::ExchangeError;
use netstats::events;
use netstats::listeners::OnResponseListener;
use netstats::models::{NetworkInfo, RequestStats};
use netstats::provider::StaticNetworkProvider;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

struct TracingListener;

impl OnResponseListener for TracingListener {
    fn on_response_success(&self, network: Option<&NetworkInfo>, stats: &RequestStats) {
        tracing::info!(
            request_id = stats.id,
            url = %stats.url,
            status = stats.http_response_code,
            speed = stats.api_speed(),
            network = ?network.and_then(|n| n.type_name.as_deref()),
            "response"
        );
    }

    fn on_response_error(
        &self,
        network: Option<&NetworkInfo>,
        stats: &RequestStats,
        error: &ExchangeError,
    ) {
        tracing::warn!(
            request_id = stats.id,
            url = %stats.url,
            error = %error,
            network = ?network.and_then(|n| n.type_name.as_deref()),
            "request failed"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&app_config.logging.filter));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = Arc::new(SqliteAverageStore::open(&app_config.database.path).await?);
    let provider = Arc::new(StaticNetworkProvider::new(
        app_config.network.network_info(),
        app_config.network.ssid.clone(),
    ));
    let aggregator = StatsAggregator::with_max_size(
        store.clone(),
        provider,
        app_config.stats.max_size_for_persistence,
    )?;
    aggregator.add_listener(Arc::new(TracingListener));
    tracing::info!(
        network_key = %aggregator.current_network_key(),
        average_speed = aggregator.average_network_speed(),
        "reading events from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        events::dispatch(&aggregator, &line);
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    println!(
        "{}\t{}",
        aggregator.current_network_key(),
        aggregator.average_network_speed()
    );
    store.shutdown().await;
    Ok(())
}
