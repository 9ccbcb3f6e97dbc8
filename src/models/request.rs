// Completed HTTP exchange as reported by the network layer

use serde::{Deserialize, Serialize};

const MILLIS_PER_SEC: f64 = 1000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub request_size: u64,
    pub response_size: u64,
    #[serde(default)]
    pub http_response_code: u16,
    /// Epoch milliseconds when the request was sent.
    pub start_time: u64,
    /// Epoch milliseconds when the response body was fully read.
    pub end_time: u64,
}

impl RequestStats {
    /// Wall time of the exchange in milliseconds (0 when the clock went backwards).
    pub fn elapsed_ms(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Response throughput in bytes per second. 0.0 when no time elapsed.
    pub fn api_speed(&self) -> f64 {
        let elapsed = self.elapsed_ms();
        if elapsed == 0 {
            return 0.0;
        }
        self.response_size as f64 * MILLIS_PER_SEC / elapsed as f64
    }
}
