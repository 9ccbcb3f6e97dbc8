// Newline-delimited JSON request events, as fed to the binary on stdin

use crate::handler::RequestStatsHandler;
use crate::models::RequestStats;
use serde::Deserialize;

/// One input line, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Response {
        stats: RequestStats,
    },
    HttpError {
        stats: RequestStats,
        #[serde(default)]
        message: String,
    },
    StreamError {
        stats: RequestStats,
        #[serde(default)]
        message: String,
    },
}

impl Event {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Delivers the event to the matching handler callback.
    pub fn apply(self, handler: &dyn RequestStatsHandler) {
        match self {
            Event::Response { stats } => handler.on_response_received(&stats),
            Event::HttpError { stats, message } => {
                handler.on_http_exchange_error(&stats, std::io::Error::other(message))
            }
            Event::StreamError { stats, message } => {
                handler.on_response_input_stream_error(&stats, anyhow::anyhow!(message))
            }
        }
    }
}

/// Parses and applies one line. Blank lines are ignored; malformed lines are
/// logged and skipped. Returns whether an event was delivered.
pub fn dispatch(handler: &dyn RequestStatsHandler, line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    match Event::parse(line) {
        Ok(event) => {
            event.apply(handler);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed event line");
            false
        }
    }
}
