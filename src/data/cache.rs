//! Time-boxed cache for the loaded dataset.
//!
//! The cache is an explicit value owning `{data, fetched_at, ttl}` rather
//! than a decorator hidden in the loader, so refresh behavior is visible at
//! the call site and testable without a database.
//!
//! Expiry is purely elapsed-time based; `force_refresh` exists for the TUI's
//! manual reload key. There is no cross-process invalidation.

use std::time::{Duration, Instant};

use crate::data::{DataError, LoadOutcome};

#[derive(Debug)]
pub struct DatasetCache {
    ttl: Duration,
    slot: Option<Slot>,
}

#[derive(Debug)]
struct Slot {
    outcome: LoadOutcome,
    fetched_at: Instant,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// Age of the cached value, if any.
    pub fn age(&self) -> Option<Duration> {
        self.slot.as_ref().map(|s| s.fetched_at.elapsed())
    }

    pub fn is_stale(&self) -> bool {
        match &self.slot {
            None => true,
            Some(slot) => slot.fetched_at.elapsed() >= self.ttl,
        }
    }

    /// Drop the cached value so the next access reloads.
    pub fn force_refresh(&mut self) {
        self.slot = None;
    }

    /// Return the cached outcome, reloading through `fetch` when absent or
    /// expired.
    ///
    /// A failed reload leaves the cache empty rather than serving a stale
    /// value; the caller decides how to surface the error.
    pub fn get_or_refresh<F>(&mut self, fetch: F) -> Result<&LoadOutcome, DataError>
    where
        F: FnOnce() -> Result<LoadOutcome, DataError>,
    {
        if self.is_stale() {
            self.slot = None;
            let outcome = fetch()?;
            self.slot = Some(Slot {
                outcome,
                fetched_at: Instant::now(),
            });
        }

        // Invariant: the slot is always present here; a stale/missing slot was
        // just refilled or the error returned above.
        Ok(&self
            .slot
            .as_ref()
            .expect("cache slot present after refresh")
            .outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SalesDataset, SalesRecord};

    fn one_row_outcome() -> LoadOutcome {
        let dataset = SalesDataset::from_records(vec![SalesRecord {
            date: "2024-01-01".parse().unwrap(),
            region: "华东".to_string(),
            rep: "张三".to_string(),
            category: "软件".to_string(),
            product: "智能分析平台".to_string(),
            amount: 1.0,
        }])
        .unwrap();
        LoadOutcome::Loaded(dataset)
    }

    #[test]
    fn second_access_within_ttl_does_not_refetch() {
        let mut cache = DatasetCache::new(Duration::from_secs(600));
        let mut calls = 0;

        for _ in 0..3 {
            let outcome = cache
                .get_or_refresh(|| {
                    calls += 1;
                    Ok(one_row_outcome())
                })
                .unwrap();
            assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        }

        assert_eq!(calls, 1);
        assert!(!cache.is_stale());
    }

    #[test]
    fn zero_ttl_refetches_every_access() {
        let mut cache = DatasetCache::new(Duration::ZERO);
        let mut calls = 0;

        for _ in 0..3 {
            cache
                .get_or_refresh(|| {
                    calls += 1;
                    Ok(one_row_outcome())
                })
                .unwrap();
        }

        assert_eq!(calls, 3);
    }

    #[test]
    fn force_refresh_drops_cached_value() {
        let mut cache = DatasetCache::new(Duration::from_secs(600));
        let mut calls = 0;
        let mut fetch = || {
            calls += 1;
            Ok(one_row_outcome())
        };

        cache.get_or_refresh(&mut fetch).unwrap();
        cache.force_refresh();
        cache.get_or_refresh(&mut fetch).unwrap();

        assert_eq!(calls, 2);
    }

    #[test]
    fn failed_fetch_leaves_cache_empty() {
        let mut cache = DatasetCache::new(Duration::from_secs(600));

        let err = cache
            .get_or_refresh(|| Err(DataError::Unavailable("gone".to_string())))
            .unwrap_err();
        assert!(matches!(err, DataError::Unavailable(_)));
        assert!(cache.is_stale());
        assert!(cache.age().is_none());
    }
}
