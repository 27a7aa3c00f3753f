//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: domain types
//! - `wire.rs`: raw serde structs matching provider responses
//! - `convert.rs`: wire-to-domain conversion and derived fields
//! - `client.rs`: sub-client with HTTP methods

pub mod instrument;
pub mod market_data;
