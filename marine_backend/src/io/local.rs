//! In-memory point source.
//!
//! Holds slices in a HashMap, which makes it suitable for unit tests and
//! demos that need fast, deterministic and isolated fetches. A health switch
//! simulates transport failures.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::domain::{Point, TimeSlice};
use crate::error::{MapError, MapResult};
use crate::io::source::PointSource;

/// In-memory point source.
///
/// Clones share the same storage.
///
/// # Example
/// ```
/// use marine_map::core::domain::{Point, TimeSlice};
/// use marine_map::io::local::LocalPointSource;
///
/// let source = LocalPointSource::new()
///     .with_slice(TimeSlice::T1, vec![Point::new("a", 10.0, 75.0, 28.0, 35.0, "Tuna")]);
/// assert_eq!(source.fetch_count(TimeSlice::T1), 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalPointSource {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    slices: HashMap<TimeSlice, Vec<Point>>,
    fetch_counts: HashMap<TimeSlice, usize>,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            slices: HashMap::new(),
            fetch_counts: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalPointSource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_slice`](Self::set_slice).
    pub fn with_slice(self, slice: TimeSlice, points: Vec<Point>) -> Self {
        self.set_slice(slice, points);
        self
    }

    /// Replace the points of a slice.
    pub fn set_slice(&self, slice: TimeSlice, points: Vec<Point>) {
        self.data.write().slices.insert(slice, points);
    }

    /// Set the health status for testing fetch failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of fetches served (or failed) for a slice.
    pub fn fetch_count(&self, slice: TimeSlice) -> usize {
        self.data
            .read()
            .fetch_counts
            .get(&slice)
            .copied()
            .unwrap_or(0)
    }

    /// Clear all slices and counters.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }
}

#[async_trait]
impl PointSource for LocalPointSource {
    async fn fetch(&self, slice: TimeSlice) -> MapResult<Vec<Point>> {
        let mut data = self.data.write();
        *data.fetch_counts.entry(slice).or_insert(0) += 1;

        if !data.is_healthy {
            return Err(MapError::FetchError(format!(
                "Local source is not healthy (slice {})",
                slice
            )));
        }

        let points = data
            .slices
            .get(&slice)
            .cloned()
            .ok_or_else(|| MapError::NotFound(format!("No data for slice {}", slice)))?;
        debug!("Local source served {} points for {}", points.len(), slice);
        Ok(points)
    }
}
