//! HTTP layer: `MarketDataHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::MarketDataHttp;
pub use retry::{RetryConfig, RetryPolicy};
