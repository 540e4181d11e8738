//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Eviction: runs the store's TTL+LRU sweep at configured intervals

mod eviction;

pub use eviction::EvictionTask;
