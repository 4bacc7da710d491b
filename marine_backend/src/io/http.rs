//! Point source fetching feed files over HTTP.

use async_trait::async_trait;
use log::{info, warn};

use crate::config::FeedSettings;
use crate::core::domain::{Point, TimeSlice};
use crate::error::{MapError, MapResult};
use crate::io::source::PointSource;
use crate::parsing::point_parser::parse_points_str;

/// GETs `<base_url>/<slice file>`.
#[derive(Debug, Clone)]
pub struct HttpPointSource {
    client: reqwest::Client,
    base_url: String,
    slice_files: Vec<String>,
}

impl HttpPointSource {
    pub fn from_settings(settings: &FeedSettings) -> MapResult<Self> {
        let base_url = settings.base_url.clone().ok_or_else(|| {
            MapError::ConfigurationError("feed.base_url is required for HTTP feeds".to_string())
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            slice_files: settings.slice_files.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, slice: TimeSlice) -> MapResult<String> {
        self.slice_files
            .get(slice.index())
            .map(|file| format!("{}/{}", self.base_url, file))
            .ok_or_else(|| {
                MapError::ConfigurationError(format!("No feed file configured for slice {}", slice))
            })
    }
}

#[async_trait]
impl PointSource for HttpPointSource {
    async fn fetch(&self, slice: TimeSlice) -> MapResult<Vec<Point>> {
        let url = self.url_for(slice)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MapError::FetchError(format!("GET {} failed: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MapError::NotFound(format!("{} returned 404", url)));
        }
        let body = response
            .error_for_status()
            .map_err(|e| MapError::FetchError(format!("GET {} failed: {}", url, e)))?
            .text()
            .await
            .map_err(|e| MapError::FetchError(format!("Failed to read body of {}: {}", url, e)))?;

        let report = parse_points_str(&body)
            .map_err(|e| MapError::ParseError(format!("{}: {:#}", url, e)))?;
        if !report.skipped.is_empty() {
            warn!("Skipped {} entries from {}", report.skipped.len(), url);
        }
        info!("Fetched {} points for {} from {}", report.points.len(), slice, url);
        Ok(report.points)
    }
}
