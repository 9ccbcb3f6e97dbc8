// Library for tests to access modules

pub mod aggregator;
pub mod average_store;
pub mod collector;
pub mod config;
pub mod error;
pub mod events;
pub mod handler;
pub mod listeners;
pub mod models;
pub mod network_key;
pub mod provider;
