// Library for tests to access modules

pub mod analytics;
pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod snapshot_store;
pub mod version;
