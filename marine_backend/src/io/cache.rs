//! Snapshot cache in front of a point source.
//!
//! A snapshot younger than `stale_after` is served without touching the inner
//! source. Older snapshots are refetched; if the refetch fails the stale
//! snapshot is served and the failure is logged. At most one upstream attempt
//! per slice is made inside `dedupe_window`: reads in that window get the
//! current snapshot, or the last error when there is none. `revalidate`
//! forces a refetch under the same window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::domain::{Point, TimeSlice};
use crate::error::{MapError, MapResult};
use crate::io::checksum::points_checksum;
use crate::io::source::PointSource;

/// Time source for cache decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        let mut now = self.now.lock();
        *now += delta;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Freshness rules for cached slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPolicy {
    /// Age after which a snapshot is refetched on read.
    pub stale_after: Duration,
    /// Minimum spacing between two upstream attempts for one slice.
    pub dedupe_window: Duration,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(300),
            dedupe_window: Duration::from_secs(60),
        }
    }
}

/// A cached slice.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    pub slice: TimeSlice,
    pub points: Vec<Point>,
    pub fetched_at: DateTime<Utc>,
    pub checksum: String,
}

#[derive(Debug)]
struct CacheEntry {
    snapshot: Option<CachedSnapshot>,
    last_attempt: DateTime<Utc>,
    last_error: Option<MapError>,
}

fn elapsed(now: DateTime<Utc>, since: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or(Duration::ZERO)
}

/// Point source wrapper applying a [`FeedPolicy`].
pub struct CachedPointSource<S> {
    inner: S,
    policy: FeedPolicy,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<TimeSlice, CacheEntry>>,
}

impl<S: PointSource> CachedPointSource<S> {
    pub fn new(inner: S, policy: FeedPolicy) -> Self {
        Self::with_clock(inner, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(inner: S, policy: FeedPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            policy,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> FeedPolicy {
        self.policy
    }

    /// Current snapshot of a slice, fresh or not.
    pub fn snapshot(&self, slice: TimeSlice) -> Option<CachedSnapshot> {
        self.entries
            .read()
            .get(&slice)
            .and_then(|entry| entry.snapshot.clone())
    }

    /// Drop a slice so the next read goes to the inner source.
    pub fn invalidate(&self, slice: TimeSlice) {
        if self.entries.write().remove(&slice).is_some() {
            debug!("Invalidated cached {}", slice);
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    /// Refetch a slice regardless of its age.
    ///
    /// Returns `Ok(true)` when the stored points changed, `Ok(false)` when they
    /// did not or when the call fell inside the dedupe window.
    pub async fn revalidate(&self, slice: TimeSlice) -> MapResult<bool> {
        let now = self.clock.now();
        let recent = self
            .entries
            .read()
            .get(&slice)
            .map(|entry| elapsed(now, entry.last_attempt) < self.policy.dedupe_window)
            .unwrap_or(false);
        if recent {
            debug!("Revalidation of {} deduplicated", slice);
            return Ok(false);
        }

        let previous = self.snapshot(slice).map(|snapshot| snapshot.checksum);
        let snapshot = self.refresh(slice).await?;
        Ok(previous.as_deref() != Some(snapshot.checksum.as_str()))
    }

    async fn refresh(&self, slice: TimeSlice) -> MapResult<CachedSnapshot> {
        let started = self.clock.now();
        let result = self.inner.fetch(slice).await;

        let mut entries = self.entries.write();
        let entry = entries.entry(slice).or_insert(CacheEntry {
            snapshot: None,
            last_attempt: started,
            last_error: None,
        });
        entry.last_attempt = started;

        let points = match result {
            Ok(points) => points,
            Err(e) => {
                entry.last_error = Some(e.clone());
                return Err(e);
            }
        };
        entry.last_error = None;
        let checksum = points_checksum(&points)?;
        let unchanged = entry
            .snapshot
            .as_ref()
            .is_some_and(|old| old.checksum == checksum);
        if unchanged {
            debug!("{} unchanged since last fetch", slice);
        } else {
            info!("Cached {} points for {}", points.len(), slice);
        }

        let snapshot = CachedSnapshot {
            slice,
            points,
            fetched_at: self.clock.now(),
            checksum,
        };
        entry.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }
}

#[async_trait]
impl<S: PointSource> PointSource for CachedPointSource<S> {
    async fn fetch(&self, slice: TimeSlice) -> MapResult<Vec<Point>> {
        let now = self.clock.now();
        let (cached, deduped, last_error) = match self.entries.read().get(&slice) {
            Some(entry) => (
                entry.snapshot.clone(),
                elapsed(now, entry.last_attempt) < self.policy.dedupe_window,
                entry.last_error.clone(),
            ),
            None => (None, false, None),
        };

        if let Some(snapshot) = &cached {
            if deduped || elapsed(now, snapshot.fetched_at) < self.policy.stale_after {
                debug!("Serving cached {}", slice);
                return Ok(snapshot.points.clone());
            }
        }
        if let (true, Some(e)) = (deduped, last_error) {
            debug!("Repeating last error for {} inside dedupe window", slice);
            return Err(e);
        }

        match self.refresh(slice).await {
            Ok(snapshot) => Ok(snapshot.points),
            Err(e) => match cached {
                Some(stale) => {
                    warn!("Refetch of {} failed, serving stale snapshot: {}", slice, e);
                    Ok(stale.points)
                }
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::local::LocalPointSource;
    use chrono::TimeZone;

    fn point(id: &str) -> Point {
        Point::new(id, 9.9, 76.2, 29.0, 34.5, "Sardine")
    }

    fn setup() -> (LocalPointSource, Arc<ManualClock>, CachedPointSource<LocalPointSource>) {
        let local = LocalPointSource::new().with_slice(TimeSlice::T1, vec![point("a")]);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let cache = CachedPointSource::with_clock(local.clone(), FeedPolicy::default(), clock.clone());
        (local, clock, cache)
    }

    #[tokio::test]
    async fn test_fresh_snapshot_served_from_cache() {
        let (local, clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        clock.advance(Duration::from_secs(299));
        cache.fetch(TimeSlice::T1).await.unwrap();

        assert_eq!(local.fetch_count(TimeSlice::T1), 1);
        assert!(cache.snapshot(TimeSlice::T1).is_some());
    }

    #[tokio::test]
    async fn test_stale_snapshot_refetched() {
        let (local, clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        local.set_slice(TimeSlice::T1, vec![point("a"), point("b")]);
        clock.advance(Duration::from_secs(300));

        let points = cache.fetch(TimeSlice::T1).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(local.fetch_count(TimeSlice::T1), 2);
    }

    #[tokio::test]
    async fn test_stale_snapshot_served_when_refetch_fails() {
        let (local, clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        local.set_healthy(false);
        clock.advance(Duration::from_secs(600));

        let points = cache.fetch(TimeSlice::T1).await.unwrap();
        assert_eq!(points[0].id, "a");
    }

    #[tokio::test]
    async fn test_failing_upstream_attempted_once_per_window() {
        let (local, clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        local.set_healthy(false);
        clock.advance(Duration::from_secs(301));

        for _ in 0..5 {
            let points = cache.fetch(TimeSlice::T1).await.unwrap();
            assert_eq!(points[0].id, "a");
            clock.advance(Duration::from_secs(1));
        }
        assert_eq!(local.fetch_count(TimeSlice::T1), 2);

        clock.advance(Duration::from_secs(60));
        cache.fetch(TimeSlice::T1).await.unwrap();
        assert_eq!(local.fetch_count(TimeSlice::T1), 3);
    }

    #[tokio::test]
    async fn test_cold_failing_slice_repeats_last_error_within_window() {
        let (local, clock, cache) = setup();
        local.set_healthy(false);

        for _ in 0..4 {
            let err = cache.fetch(TimeSlice::T1).await.unwrap_err();
            assert!(matches!(err, MapError::FetchError(_)));
        }
        assert_eq!(local.fetch_count(TimeSlice::T1), 1);

        local.set_healthy(true);
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.fetch(TimeSlice::T1).await.unwrap().len(), 1);
        assert_eq!(local.fetch_count(TimeSlice::T1), 2);
    }

    #[tokio::test]
    async fn test_error_without_snapshot_propagates() {
        let (local, _clock, cache) = setup();
        local.set_healthy(false);

        let err = cache.fetch(TimeSlice::T1).await.unwrap_err();
        assert!(matches!(err, MapError::FetchError(_)));
        assert!(cache.snapshot(TimeSlice::T1).is_none());
    }

    #[tokio::test]
    async fn test_revalidate_dedupes_within_window() {
        let (local, clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        local.set_slice(TimeSlice::T1, vec![point("z")]);

        clock.advance(Duration::from_secs(30));
        assert!(!cache.revalidate(TimeSlice::T1).await.unwrap());
        assert_eq!(local.fetch_count(TimeSlice::T1), 1);

        clock.advance(Duration::from_secs(31));
        assert!(cache.revalidate(TimeSlice::T1).await.unwrap());
        assert_eq!(local.fetch_count(TimeSlice::T1), 2);
        assert_eq!(cache.snapshot(TimeSlice::T1).unwrap().points[0].id, "z");
    }

    #[tokio::test]
    async fn test_revalidate_reports_unchanged_content() {
        let (_local, clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        clock.advance(Duration::from_secs(120));
        assert!(!cache.revalidate(TimeSlice::T1).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch() {
        let (local, _clock, cache) = setup();

        cache.fetch(TimeSlice::T1).await.unwrap();
        cache.invalidate(TimeSlice::T1);
        cache.fetch(TimeSlice::T1).await.unwrap();

        assert_eq!(local.fetch_count(TimeSlice::T1), 2);
    }
}
