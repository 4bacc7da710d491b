//! Point source selection from feed settings.

use log::info;
use std::sync::Arc;

use crate::config::FeedSettings;
use crate::error::MapResult;
use crate::io::file::FilePointSource;
use crate::io::source::PointSource;

/// Kind of upstream a feed configuration points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `feed.data_dir` on the local filesystem
    File,
    /// `feed.base_url` over HTTP (`http-feed` feature)
    Http,
}

impl SourceKind {
    /// A configured `base_url` selects HTTP, otherwise the data directory.
    pub fn for_settings(settings: &FeedSettings) -> Self {
        if settings.base_url.is_some() {
            Self::Http
        } else {
            Self::File
        }
    }
}

/// Builds the upstream point source for a feed configuration.
///
/// # Example
/// ```no_run
/// use marine_map::config::FeedSettings;
/// use marine_map::io::{CachedPointSource, SourceFactory};
///
/// let settings = FeedSettings::default();
/// let upstream = SourceFactory::create(&settings).expect("Failed to create source");
/// let source = CachedPointSource::new(upstream, settings.policy());
/// ```
pub struct SourceFactory;

impl SourceFactory {
    /// Create the source selected by [`SourceKind::for_settings`].
    ///
    /// # Errors
    /// `MapError::ConfigurationError` when `base_url` is set but the crate was
    /// built without the `http-feed` feature.
    pub fn create(settings: &FeedSettings) -> MapResult<Arc<dyn PointSource>> {
        match SourceKind::for_settings(settings) {
            SourceKind::File => {
                info!("Reading feed files from {}", settings.data_dir.display());
                Ok(Arc::new(FilePointSource::from_settings(settings)))
            }
            SourceKind::Http => Self::create_http(settings),
        }
    }

    #[cfg(feature = "http-feed")]
    fn create_http(settings: &FeedSettings) -> MapResult<Arc<dyn PointSource>> {
        let source = crate::io::http::HttpPointSource::from_settings(settings)?;
        info!("Fetching feed over HTTP from {}", source.base_url());
        Ok(Arc::new(source))
    }

    #[cfg(not(feature = "http-feed"))]
    fn create_http(_settings: &FeedSettings) -> MapResult<Arc<dyn PointSource>> {
        Err(crate::error::MapError::ConfigurationError(
            "feed.base_url is set but this build lacks the http-feed feature".to_string(),
        ))
    }
}
