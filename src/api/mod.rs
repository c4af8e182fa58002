//! Release radar HTTP API: transport client, response types and the
//! cached client the views talk to.

pub mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod params;
pub mod requests;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

pub use cached_client::CachedClient;
pub use client::ApiClient;
pub use error::ApiError;
