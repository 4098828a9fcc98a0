pub mod client;
pub mod json;
#[cfg(test)]
pub(crate) mod memory;
pub mod valkey;

pub use client::{CacheClient, CacheError, ttl_seconds};
pub use json::JsonCache;
pub use valkey::ValkeyClient;
