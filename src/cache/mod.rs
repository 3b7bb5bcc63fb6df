//! Cache module for the day's APOD snapshot
//!
//! This module provides the in-memory daily cache that keeps the most recent
//! snapshot until the day boundary. It supports graceful degradation by
//! returning the last good snapshot when a refresh fails, flagged as stale so
//! the UI can say so.

mod daily;
mod retry;

pub use daily::{CacheConfig, CacheEntry, CacheError, CacheState, Clock, DailyCache, Today, UtcClock};
pub use retry::{RetryPolicy, Retryable};
