//! Browser-facing front end for the time-record backend service.
//!
//! The interesting part is [`cache::RecordCache`]: a read-through page cache
//! between the HTTP surface and the record backend, with write-through
//! invalidation per owner, idle expiry, and LRU capacity eviction. The rest
//! is presentation glue around it.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod record;
pub mod timefmt;
