// Library error types

use thiserror::Error;

/// Failure querying platform network state. Never escapes the aggregator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("permission denied querying {0}")]
    PermissionDenied(&'static str),
    #[error("{0} subsystem unavailable")]
    Unavailable(&'static str),
}

/// Transport-level failure forwarded to listeners as the error payload.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("http exchange failed: {0}")]
    HttpExchange(#[source] std::io::Error),
    #[error("response stream read failed: {0}")]
    ResponseStream(#[source] anyhow::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("max size for persistence must be > 0, got {0}")]
    InvalidMaxSize(u32),
}
