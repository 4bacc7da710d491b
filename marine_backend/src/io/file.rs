//! Point source reading pre-generated feed files from a data directory.

use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::config::FeedSettings;
use crate::core::domain::{Point, TimeSlice};
use crate::error::{MapError, MapResult};
use crate::io::source::PointSource;
use crate::parsing::point_parser::{parse_points_str, PointParseReport};

/// Reads `<data_dir>/<slice file>` for each slice.
#[derive(Debug, Clone)]
pub struct FilePointSource {
    data_dir: PathBuf,
    slice_files: Vec<String>,
}

impl FilePointSource {
    /// Source over `data_dir` with the default `map_data_tN.json` names.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            slice_files: TimeSlice::all()
                .iter()
                .map(|slice| slice.default_file_name())
                .collect(),
        }
    }

    pub fn from_settings(settings: &FeedSettings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
            slice_files: settings.slice_files.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the feed file for a slice.
    pub fn path_for(&self, slice: TimeSlice) -> MapResult<PathBuf> {
        self.slice_files
            .get(slice.index())
            .map(|file| self.data_dir.join(file))
            .ok_or_else(|| {
                MapError::ConfigurationError(format!("No feed file configured for slice {}", slice))
            })
    }

    /// Read and parse a slice, keeping the list of skipped entries.
    pub async fn fetch_report(&self, slice: TimeSlice) -> MapResult<PointParseReport> {
        let path = self.path_for(slice)?;
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MapError::NotFound(format!("Feed file {} does not exist", path.display()))
            } else {
                MapError::FetchError(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;

        let report = parse_points_str(&content)
            .map_err(|e| MapError::ParseError(format!("{}: {:#}", path.display(), e)))?;

        if !report.skipped.is_empty() {
            warn!(
                "Skipped {} of {} entries in {}",
                report.skipped.len(),
                report.total_entries(),
                path.display()
            );
        }
        info!(
            "Loaded {} points for {} from {}",
            report.points.len(),
            slice,
            path.display()
        );
        Ok(report)
    }
}

#[async_trait]
impl PointSource for FilePointSource {
    async fn fetch(&self, slice: TimeSlice) -> MapResult<Vec<Point>> {
        Ok(self.fetch_report(slice).await?.points)
    }
}
