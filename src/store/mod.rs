//! Durable state: the user config record and the metadata cache, both JSON files
//! under the data directory.

pub mod cache;
pub mod config;
pub mod persist;
