//! Transient query cache with in-flight request deduplication.
//!
//! This module is API-agnostic:
//! - Results are stored per query key and result type, in memory only
//! - Each key declares its own staleness window
//! - Concurrent fetches for one key share a single request

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use traits::{CacheResult, QueryKey};
