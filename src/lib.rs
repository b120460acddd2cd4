pub mod analytics;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod query;
pub mod server;
pub mod storage;
