//! Sink Writer: cursor lookups and batch writes against InfluxDB v2.

pub mod client;
pub mod error;
pub mod flux;
pub mod line_protocol;
