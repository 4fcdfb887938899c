//! reqwest-backed request issuer.
mod client;
mod execution;


pub use client::{ClientOptions, HttpIssuer};
