// Active network snapshot and the identity derived from it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connectivity snapshot as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// Transport type name, e.g. "WIFI" or "mobile".
    #[serde(default)]
    pub type_name: Option<String>,
    /// Radio subtype for mobile networks, e.g. "LTE".
    #[serde(default)]
    pub subtype_name: Option<String>,
}

impl NetworkInfo {
    pub fn wifi() -> Self {
        Self {
            type_name: Some("WIFI".into()),
            subtype_name: None,
        }
    }

    pub fn mobile(subtype: impl Into<String>) -> Self {
        Self {
            type_name: Some("mobile".into()),
            subtype_name: Some(subtype.into()),
        }
    }
}

/// Which persisted-average bucket applies to the current connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NetworkIdentity {
    /// Wi-Fi, keyed by the SSID hash (-1 when the SSID is unknown).
    Wifi(i32),
    /// Cellular, keyed by subtype name (`mobile_null` when the platform gave none).
    Mobile(Option<String>),
    Unknown,
}

impl NetworkIdentity {
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkIdentity::Wifi(hash) => write!(f, "WIFI_{hash}"),
            NetworkIdentity::Mobile(Some(subtype)) => write!(f, "mobile_{subtype}"),
            NetworkIdentity::Mobile(None) => f.write_str("mobile_null"),
            NetworkIdentity::Unknown => f.write_str("unknown"),
        }
    }
}
