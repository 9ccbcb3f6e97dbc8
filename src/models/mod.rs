// Domain models

mod network;
mod request;

pub use network::{NetworkIdentity, NetworkInfo};
pub use request::RequestStats;
