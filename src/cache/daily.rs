//! In-memory cache holding the APOD snapshot until the day boundary
//!
//! `DailyCache::get_today` returns the cached snapshot while it was fetched
//! for the current day. Otherwise it fetches a new one, and if that fails it
//! falls back to the last good snapshot (whatever its day) so callers keep
//! showing something.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use super::retry::RetryPolicy;
use crate::data::{ApodSource, FetchError, ImageDownloader, Snapshot};

/// Errors returned by the daily cache
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// No fetch has ever succeeded, so there is nothing to fall back to
    #[error("no APOD data available: {0}")]
    NoDataAvailable(#[source] FetchError),
}

/// Source of the current day
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The current UTC date; UTC is the reference timezone for the day boundary
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Tuning for the daily cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Pause on a cache hit so a reload still looks like a reload
    pub hit_delay: Duration,
    /// Retry policy for metadata fetches and image downloads
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hit_delay: Duration::from_secs(2),
            retry: RetryPolicy::default(),
        }
    }
}

/// A snapshot and the day it was fetched for
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: Arc<Snapshot>,
    pub day: NaiveDate,
}

/// State of the cached value
#[derive(Debug, Clone, Default)]
pub enum CacheState {
    /// Nothing fetched yet
    #[default]
    Empty,
    /// A fetch is in flight; `previous` is what we had before it started
    Loading { previous: Option<CacheEntry> },
    /// The last fetch succeeded
    Ready(CacheEntry),
    /// The last fetch failed; `entry` is the last good value
    Stale { entry: CacheEntry, last_error: FetchError },
}

impl CacheState {
    /// The last good entry, if any
    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            CacheState::Empty => None,
            CacheState::Loading { previous } => previous.as_ref(),
            CacheState::Ready(entry) | CacheState::Stale { entry, .. } => Some(entry),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CacheState::Loading { .. })
    }

    fn valid_for(&self, day: NaiveDate) -> Option<&CacheEntry> {
        match self {
            CacheState::Ready(entry) | CacheState::Stale { entry, .. } if entry.day == day => Some(entry),
            _ => None,
        }
    }
}

/// What `get_today` hands back to the presentation layer
#[derive(Debug, Clone)]
pub struct Today {
    /// The snapshot to display
    pub snapshot: Arc<Snapshot>,
    /// Set when a refresh failed and `snapshot` is an older fallback
    pub refresh_error: Option<String>,
}

impl Today {
    pub fn is_stale(&self) -> bool {
        self.refresh_error.is_some()
    }
}

/// Caches today's APOD snapshot with single-flight refresh and stale fallback
pub struct DailyCache {
    source: Arc<dyn ApodSource>,
    downloader: Arc<dyn ImageDownloader>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    state: Mutex<CacheState>,
    /// Held across "check, else fetch" so only one fetch runs at a time
    fetch_lock: tokio::sync::Mutex<()>,
}

impl DailyCache {
    /// Creates a cache using the UTC clock
    pub fn new(
        source: Arc<dyn ApodSource>,
        downloader: Arc<dyn ImageDownloader>,
        config: CacheConfig,
    ) -> Self {
        Self::with_clock(source, downloader, Arc::new(UtcClock), config)
    }

    /// Creates a cache with a custom clock
    pub fn with_clock(
        source: Arc<dyn ApodSource>,
        downloader: Arc<dyn ImageDownloader>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            source,
            downloader,
            clock,
            config,
            state: Mutex::new(CacheState::Empty),
            fetch_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current state without waiting for an in-flight fetch
    pub fn peek(&self) -> CacheState {
        self.state().clone()
    }

    /// Returns today's snapshot, fetching it if the cached one is from another day
    ///
    /// Concurrent callers during a miss wait for the single in-flight fetch and
    /// then see its result.
    ///
    /// # Returns
    /// * `Ok(Today)` - A fresh snapshot, or the last good one with `refresh_error` set
    /// * `Err(CacheError::NoDataAvailable)` - The fetch failed and nothing was cached
    pub async fn get_today(&self) -> Result<Today, CacheError> {
        let guard = self.fetch_lock.lock().await;
        let day = self.clock.today();

        let hit = self.state().valid_for(day).map(|entry| Arc::clone(&entry.snapshot));
        if let Some(snapshot) = hit {
            drop(guard);
            if !self.config.hit_delay.is_zero() {
                tokio::time::sleep(self.config.hit_delay).await;
            }
            return Ok(Today {
                snapshot,
                refresh_error: None,
            });
        }

        let previous = self.begin_loading();
        info!(%day, "fetching APOD");

        let result = self
            .config
            .retry
            .run("apod metadata", || self.source.fetch_today())
            .await;

        match result {
            Ok(record) => {
                let snapshot = Arc::new(Snapshot::new(record, Arc::clone(&self.downloader), self.config.retry));
                info!(%day, date = %snapshot.date(), title = snapshot.title(), "fetched APOD");
                Ok(self.commit(CacheEntry { snapshot, day }))
            }
            Err(err) => self.fall_back(previous, err),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_loading(&self) -> Option<CacheEntry> {
        let mut state = self.state();
        let previous = state.entry().cloned();
        *state = CacheState::Loading {
            previous: previous.clone(),
        };
        previous
    }

    /// Stores a fresh entry unless a newer day is already cached
    fn commit(&self, entry: CacheEntry) -> Today {
        let mut state = self.state();
        if let Some(current) = state.entry() {
            if current.day > entry.day {
                warn!(current = %current.day, fetched = %entry.day, "discarding fetch for an older day");
                let snapshot = Arc::clone(&current.snapshot);
                *state = CacheState::Ready(current.clone());
                return Today {
                    snapshot,
                    refresh_error: None,
                };
            }
        }
        let snapshot = Arc::clone(&entry.snapshot);
        *state = CacheState::Ready(entry);
        Today {
            snapshot,
            refresh_error: None,
        }
    }

    fn fall_back(&self, previous: Option<CacheEntry>, err: FetchError) -> Result<Today, CacheError> {
        let mut state = self.state();
        match previous {
            Some(entry) => {
                warn!(fallback_date = %entry.snapshot.date(), error = %err, "failed to refresh APOD, falling back to cached");
                let snapshot = Arc::clone(&entry.snapshot);
                *state = CacheState::Stale {
                    entry,
                    last_error: err.clone(),
                };
                Ok(Today {
                    snapshot,
                    refresh_error: Some(err.to_string()),
                })
            }
            None => {
                error!(error = %err, "failed to fetch APOD, no cached APOD to fall back to");
                *state = CacheState::Empty;
                Err(CacheError::NoDataAvailable(err))
            }
        }
    }
}
