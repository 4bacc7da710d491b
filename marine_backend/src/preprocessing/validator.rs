//! Point dataset validation with error and warning reporting.
//!
//! Checks a parsed time slice for duplicate identifiers and implausible
//! readings before it is handed to the map. Parsing already removed entries
//! without a usable position; this pass looks at the dataset as a whole.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::domain::Point;

/// Plausible sea surface temperature range in °C.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = -2.0..=40.0;

/// Plausible salinity range in PSU.
pub const SALINITY_RANGE: std::ops::RangeInclusive<f64> = 0.0..=45.0;

/// Validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false, while warnings are informational and do
/// not fail validation.
///
/// # Examples
///
/// ```
/// use marine_map::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("Duplicate point id 'a'".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
///
/// # Fields
///
/// * `total_points` - Number of points validated
/// * `points_with_alerts` - Points carrying an alert label
/// * `duplicate_ids` - Extra occurrences of an already seen id
/// * `implausible_readings` - Points with temperature or salinity outside the plausible range
/// * `species_count` - Number of distinct species labels
/// * `top_species` - Most frequent species label, if any
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_points: usize,
    pub points_with_alerts: usize,
    pub duplicate_ids: usize,
    pub implausible_readings: usize,
    pub species_count: usize,
    pub top_species: Option<String>,
}

impl ValidationResult {
    /// Creates a new validation result with valid status and empty error/warning lists.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Every issue with the log level it should be reported at: errors at
    /// `Error`, then warnings at `Warn`.
    pub fn issues(&self) -> impl Iterator<Item = (log::Level, &str)> {
        self.errors
            .iter()
            .map(|e| (log::Level::Error, e.as_str()))
            .chain(self.warnings.iter().map(|w| (log::Level::Warn, w.as_str())))
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for map point datasets.
pub struct PointValidator;

impl PointValidator {
    /// Validates one time slice worth of points.
    ///
    /// - Duplicate ids are errors (ids must be unique within a snapshot)
    /// - Temperature/salinity outside the plausible ranges are warnings
    /// - Alerts are surfaced as warnings so they show up in load logs
    ///
    /// # Examples
    ///
    /// ```
    /// use marine_map::core::domain::Point;
    /// use marine_map::preprocessing::validator::PointValidator;
    ///
    /// let points = vec![
    ///     Point::new("a", 10.0, 75.0, 28.0, 35.0, "Tuna"),
    ///     Point::new("a", 11.0, 75.0, 28.0, 35.0, "Tuna"),
    /// ];
    /// let result = PointValidator::validate_points(&points);
    /// assert!(!result.is_valid);
    /// assert_eq!(result.stats.duplicate_ids, 1);
    /// ```
    pub fn validate_points(points: &[Point]) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_points = points.len();

        result.stats.duplicate_ids = Self::check_duplicates(points, &mut result);

        let mut species: HashMap<&str, usize> = HashMap::new();
        for point in points {
            if let Some(name) = point.species.as_deref() {
                *species.entry(name).or_insert(0) += 1;
            }
            Self::validate_point(point, &mut result);
        }

        result.stats.species_count = species.len();
        result.stats.top_species = species
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.to_string());

        result
    }

    fn check_duplicates(points: &[Point], result: &mut ValidationResult) -> usize {
        let mut seen = HashSet::new();
        let mut duplicates = 0;
        for point in points {
            if !seen.insert(point.id.as_str()) {
                duplicates += 1;
                result.add_error(format!("Duplicate point id '{}'", point.id));
            }
        }
        duplicates
    }

    fn validate_point(point: &Point, result: &mut ValidationResult) {
        let temperature_ok = point
            .temperature
            .map_or(true, |t| TEMPERATURE_RANGE.contains(&t));
        let salinity_ok = point
            .salinity
            .map_or(true, |s| SALINITY_RANGE.contains(&s));

        if let Some(t) = point.temperature.filter(|_| !temperature_ok) {
            result.add_warning(format!(
                "Point '{}': temperature {} °C outside plausible range",
                point.id, t
            ));
        }
        if let Some(s) = point.salinity.filter(|_| !salinity_ok) {
            result.add_warning(format!(
                "Point '{}': salinity {} PSU outside plausible range",
                point.id, s
            ));
        }
        if !(temperature_ok && salinity_ok) {
            result.stats.implausible_readings += 1;
        }

        if let Some(alert) = point.alert.as_deref().filter(|a| !a.is_empty()) {
            result.stats.points_with_alerts += 1;
            result.add_warning(format!("Point '{}': alert '{}'", point.id, alert));
        }
    }
}
