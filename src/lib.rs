//! Core library for the `stresslab` CLI.
//!
//! `stresslab` fires fixed-size bursts of concurrent HTTP requests at a fixed
//! interval, records every outcome and summarises latency, throughput and
//! failures. The engine talks to the network only through
//! [`engine::RequestIssuer`], so it can be driven by [`http::HttpIssuer`] or
//! by any other implementation.
pub mod args;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod report;
pub mod shutdown;
pub mod stats;
