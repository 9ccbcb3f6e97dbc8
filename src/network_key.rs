// Network key derivation: which persisted-average bucket a connection maps to

use crate::models::{NetworkIdentity, NetworkInfo};

const WIFI_TYPE: &str = "WIFI";
const MOBILE_TYPE: &str = "mobile";
/// Hash used when the SSID is missing or empty.
pub const UNKNOWN_SSID_HASH: i32 = -1;

/// Derives the identity for `info`. `ssid` is only consulted for Wi-Fi.
pub fn resolve(
    info: Option<&NetworkInfo>,
    ssid: impl FnOnce() -> Option<String>,
) -> NetworkIdentity {
    let Some(type_name) = info.and_then(|i| i.type_name.as_deref()) else {
        return NetworkIdentity::Unknown;
    };

    if type_name == WIFI_TYPE {
        let hash = ssid()
            .filter(|s| !s.is_empty())
            .map(|s| ssid_hash(&s))
            .unwrap_or(UNKNOWN_SSID_HASH);
        NetworkIdentity::Wifi(hash)
    } else if type_name == MOBILE_TYPE {
        NetworkIdentity::Mobile(info.and_then(|i| i.subtype_name.clone()))
    } else {
        NetworkIdentity::Unknown
    }
}

/// 31-multiplier string hash over UTF-16 code units with wrapping i32
/// arithmetic (Java `String.hashCode`), keeping keys stable across clients.
pub fn ssid_hash(ssid: &str) -> i32 {
    ssid.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}
