//! Point source trait.
//!
//! A source delivers the full point list of one time slice. The map core never
//! owns the fetch lifecycle: the page controller asks a source for a slice and
//! hands the result to the aggregator.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::domain::{Point, TimeSlice};
use crate::error::MapResult;

/// Something that can fetch the points of a time slice.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so fetches can run on spawned tasks.
#[async_trait]
pub trait PointSource: Send + Sync {
    /// Fetch every point of a slice.
    ///
    /// # Returns
    /// * `Ok(Vec<Point>)` - The slice's points, possibly empty
    /// * `Err(MapError::FetchError)` - Transport failure
    /// * `Err(MapError::ParseError)` - The payload is not a points feed
    /// * `Err(MapError::NotFound)` - The slice has no data
    async fn fetch(&self, slice: TimeSlice) -> MapResult<Vec<Point>>;
}

#[async_trait]
impl<T: PointSource + ?Sized> PointSource for Arc<T> {
    async fn fetch(&self, slice: TimeSlice) -> MapResult<Vec<Point>> {
        (**self).fetch(slice).await
    }
}
