// Platform network state behind a capability trait

use crate::error::ProviderError;
use crate::models::NetworkInfo;
use std::sync::{PoisonError, RwLock};

/// Source of live connectivity metadata.
///
/// Platform implementations report permission problems or a missing
/// subsystem as [`ProviderError`]; callers treat both as "no active network".
pub trait NetworkInfoProvider: Send + Sync {
    /// The active network, or `None` when disconnected.
    fn active_network_info(&self) -> Result<Option<NetworkInfo>, ProviderError>;

    /// SSID of the connected Wi-Fi network, if any.
    fn current_ssid(&self) -> Result<Option<String>, ProviderError>;
}

#[derive(Debug, Clone, Default)]
struct StaticNetwork {
    info: Option<NetworkInfo>,
    ssid: Option<String>,
}

/// Provider returning whatever network it was last told about.
///
/// Used by the binary (network described in config) and by tests that switch
/// networks mid-run.
#[derive(Debug, Default)]
pub struct StaticNetworkProvider {
    current: RwLock<StaticNetwork>,
}

impl StaticNetworkProvider {
    pub fn new(info: Option<NetworkInfo>, ssid: Option<String>) -> Self {
        Self {
            current: RwLock::new(StaticNetwork { info, ssid }),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn set_network(&self, info: Option<NetworkInfo>, ssid: Option<String>) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = StaticNetwork { info, ssid };
    }
}

impl NetworkInfoProvider for StaticNetworkProvider {
    fn active_network_info(&self) -> Result<Option<NetworkInfo>, ProviderError> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Ok(current.info.clone())
    }

    fn current_ssid(&self) -> Result<Option<String>, ProviderError> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Ok(current.ssid.clone())
    }
}
