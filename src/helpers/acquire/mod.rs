//! Acquire helpers: fetch the upstream archive

pub mod http;
pub mod tls;

pub use http::{TransportOptions, download};
