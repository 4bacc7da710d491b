//! Point sources and the caching layer.
//!
//! # Example
//!
//! ```no_run
//! use marine_map::core::domain::TimeSlice;
//! use marine_map::io::{CachedPointSource, FeedPolicy, FilePointSource, PointSource};
//!
//! # async fn run() -> marine_map::MapResult<()> {
//! let source = CachedPointSource::new(FilePointSource::new("data"), FeedPolicy::default());
//! let points = source.fetch(TimeSlice::T1).await?;
//! println!("Loaded {} points", points.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod checksum;
pub mod factory;
pub mod file;
#[cfg(feature = "http-feed")]
pub mod http;
pub mod local;
pub mod source;

pub use cache::{CachedPointSource, CachedSnapshot, Clock, FeedPolicy, ManualClock, SystemClock};
pub use checksum::{calculate_checksum, points_checksum};
pub use factory::{SourceFactory, SourceKind};
pub use file::FilePointSource;
#[cfg(feature = "http-feed")]
pub use http::HttpPointSource;
pub use local::LocalPointSource;
pub use source::PointSource;
