//! Read-through page caching with idle expiry and LRU eviction.

pub mod record_cache;

pub use record_cache::{CacheStats, PageKey, RecordCache};
