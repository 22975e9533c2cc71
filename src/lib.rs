//! Audio library backend: index a music folder, cache track metadata, and serve
//! the files over a loopback HTTP server with byte-range support.

pub mod cli;
pub mod context;
pub mod http;
pub mod media;
pub mod rpc;
pub mod settings;
pub mod store;
