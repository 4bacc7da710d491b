//! Map configuration file support.
//!
//! This module reads grid, feed and initial layer settings from a TOML file.
//! Every section is optional; missing values fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::algorithms::grid::{DegreeGrid, MIN_CELL_SIZE_DEGREES};
use crate::core::domain::TimeSlice;
use crate::core::layers::LayerState;
use crate::error::{MapError, MapResult};
use crate::io::cache::FeedPolicy;
use crate::services::aggregator::{
    DEFAULT_CLUSTER_CELL_SIZE_DEGREES, DEFAULT_HEAT_CELL_SIZE_DEGREES,
};

/// Map configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub layers: LayerState,
}

/// Grid resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default = "default_cluster_cell_size")]
    pub cluster_cell_size_degrees: f64,
    #[serde(default = "default_heat_cell_size")]
    pub heat_cell_size_degrees: f64,
}

/// Feed location and caching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_slice_files")]
    pub slice_files: Vec<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_dedupe_window_secs")]
    pub dedupe_window_secs: u64,
}

fn default_cluster_cell_size() -> f64 {
    DEFAULT_CLUSTER_CELL_SIZE_DEGREES
}

fn default_heat_cell_size() -> f64 {
    DEFAULT_HEAT_CELL_SIZE_DEGREES
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_slice_files() -> Vec<String> {
    TimeSlice::all()
        .iter()
        .map(|slice| slice.default_file_name())
        .collect()
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_dedupe_window_secs() -> u64 {
    60
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cluster_cell_size_degrees: default_cluster_cell_size(),
            heat_cell_size_degrees: default_heat_cell_size(),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            slice_files: default_slice_files(),
            base_url: None,
            stale_after_secs: default_stale_after_secs(),
            dedupe_window_secs: default_dedupe_window_secs(),
        }
    }
}

impl FeedSettings {
    /// Feed file name for a slice.
    pub fn file_for(&self, slice: TimeSlice) -> MapResult<&str> {
        self.slice_files
            .get(slice.index())
            .map(String::as_str)
            .ok_or_else(|| {
                MapError::ConfigurationError(format!("No feed file configured for slice {}", slice))
            })
    }

    /// Caching policy for wrapped point sources.
    pub fn policy(&self) -> FeedPolicy {
        FeedPolicy {
            stale_after: Duration::from_secs(self.stale_after_secs),
            dedupe_window: Duration::from_secs(self.dedupe_window_secs),
        }
    }
}

impl MapConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(MapConfig)` if the file was read, parsed and validated
    /// * `Err(MapError::ConfigurationError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> MapResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            MapError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> MapResult<Self> {
        let config: MapConfig = toml::from_str(content).map_err(|e| {
            MapError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `map.toml` in:
    /// 1. Current directory
    /// 2. `marine_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> MapResult<Self> {
        let search_paths = vec![
            PathBuf::from("map.toml"),
            PathBuf::from("marine_backend/map.toml"),
            PathBuf::from("../map.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(MapError::ConfigurationError(
            "No map.toml found in standard locations".to_string(),
        ))
    }

    /// Check grid sizes and feed settings.
    pub fn validate(&self) -> MapResult<()> {
        for (name, size) in [
            ("cluster_cell_size_degrees", self.grid.cluster_cell_size_degrees),
            ("heat_cell_size_degrees", self.grid.heat_cell_size_degrees),
        ] {
            if DegreeGrid::new(size).is_err() {
                return Err(MapError::ConfigurationError(format!(
                    "grid.{} must be a finite number of degrees no smaller than {}, got {}",
                    name, MIN_CELL_SIZE_DEGREES, size
                )));
            }
        }

        if self.feed.slice_files.len() != TimeSlice::COUNT {
            return Err(MapError::ConfigurationError(format!(
                "feed.slice_files must list exactly {} files, got {}",
                TimeSlice::COUNT,
                self.feed.slice_files.len()
            )));
        }

        if self.feed.dedupe_window_secs > self.feed.stale_after_secs {
            return Err(MapError::ConfigurationError(format!(
                "feed.dedupe_window_secs ({}) must not exceed feed.stale_after_secs ({})",
                self.feed.dedupe_window_secs, self.feed.stale_after_secs
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MapConfig::from_toml_str("").unwrap();

        assert_eq!(config.grid.cluster_cell_size_degrees, 1.5);
        assert_eq!(config.grid.heat_cell_size_degrees, 1.0);
        assert_eq!(config.feed.slice_files[1], "map_data_t2.json");
        assert_eq!(config.feed.stale_after_secs, 300);
        assert_eq!(config.feed.dedupe_window_secs, 60);
        assert_eq!(config.layers, LayerState::default());
    }

    #[test]
    fn test_full_config() {
        let config = MapConfig::from_toml_str(
            r#"
            [grid]
            cluster_cell_size_degrees = 2.0
            heat_cell_size_degrees = 0.5

            [feed]
            data_dir = "/srv/fixtures"
            base_url = "http://localhost:3000/data"
            stale_after_secs = 120
            dedupe_window_secs = 30

            [layers]
            cluster = false
            heat = false
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.cluster_cell_size_degrees, 2.0);
        assert_eq!(config.feed.data_dir, PathBuf::from("/srv/fixtures"));
        assert_eq!(config.feed.base_url.as_deref(), Some("http://localhost:3000/data"));
        assert!(!config.layers.cluster);
        assert!(config.layers.ocean);

        let policy = config.feed.policy();
        assert_eq!(policy.stale_after, Duration::from_secs(120));
        assert_eq!(policy.dedupe_window, Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let err = MapConfig::from_toml_str("[grid]\nheat_cell_size_degrees = 0.0").unwrap_err();
        match err {
            MapError::ConfigurationError(msg) => assert!(msg.contains("heat_cell_size_degrees")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_vanishing_cell_size() {
        let err = MapConfig::from_toml_str("[grid]\ncluster_cell_size_degrees = 1e-300").unwrap_err();
        match err {
            MapError::ConfigurationError(msg) => assert!(msg.contains("cluster_cell_size_degrees")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_wrong_slice_count() {
        let result = MapConfig::from_toml_str("[feed]\nslice_files = [\"a.json\"]");
        assert!(matches!(result, Err(MapError::ConfigurationError(_))));
    }

    #[test]
    fn test_rejects_dedupe_longer_than_stale() {
        let result =
            MapConfig::from_toml_str("[feed]\nstale_after_secs = 10\ndedupe_window_secs = 20");
        assert!(matches!(result, Err(MapError::ConfigurationError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = MapConfig::from_toml_str("[grid\n");
        assert!(matches!(result, Err(MapError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\ncluster_cell_size_degrees = 3.0").unwrap();

        let config = MapConfig::from_file(file.path()).unwrap();
        assert_eq!(config.grid.cluster_cell_size_degrees, 3.0);
    }

    #[test]
    fn test_file_for_slice() {
        let config = MapConfig::default();
        assert_eq!(
            config.feed.file_for(TimeSlice::T3).unwrap(),
            "map_data_t3.json"
        );
    }
}
