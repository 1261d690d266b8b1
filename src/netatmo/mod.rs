//! Station Reader: authentication and queries against the Netatmo API.

pub mod auth;
pub mod client;
pub mod error;
pub mod raw;
