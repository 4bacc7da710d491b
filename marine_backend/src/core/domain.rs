//! Domain models for geo-tagged marine observations and time slices.
//!
//! A [`Point`] is a single observation as delivered by the feed; a
//! [`TimeSlice`] names one of the three fixed observation periods the
//! dashboard can display.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MapError, MapResult};

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A single geo-tagged observation.
///
/// Points are immutable once fetched. When the active time slice changes the
/// whole list is replaced; there are no partial updates.
///
/// Field names follow the feed format (`temp`, `alerts`) on the wire. Only the
/// position is mandatory; a missing reading is `None` and the point is still
/// drawn.
///
/// # Examples
///
/// ```
/// use marine_map::core::domain::Point;
///
/// let point = Point::new("p1", 12.5, 74.2, 27.3, 35.1, "Sardinella longiceps");
/// assert!(point.has_valid_position());
/// assert!(point.alert.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "temp", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salinity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(rename = "alerts", default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

impl Point {
    /// Creates a point with every reading present and no alert.
    pub fn new(
        id: impl Into<String>,
        lat: f64,
        lon: f64,
        temperature: f64,
        salinity: f64,
        species: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            temperature: Some(temperature),
            salinity: Some(salinity),
            species: Some(species.into()),
            alert: None,
        }
    }

    /// Attaches an alert label.
    pub fn with_alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    /// Returns true when both coordinates are finite and inside their
    /// geographic ranges.
    ///
    /// Points failing this check are excluded from aggregation and rendering.
    pub fn has_valid_position(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && LATITUDE_RANGE.contains(&self.lat)
            && LONGITUDE_RANGE.contains(&self.lon)
    }
}

/// One of the three fixed observation periods.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TimeSlice {
    #[default]
    T1,
    T2,
    T3,
}

impl TimeSlice {
    /// Number of available slices.
    pub const COUNT: usize = 3;

    /// All slices in chronological order.
    pub fn all() -> [TimeSlice; Self::COUNT] {
        [TimeSlice::T1, TimeSlice::T2, TimeSlice::T3]
    }

    /// Maps the time slider index (0..=2) to a slice.
    pub fn from_index(index: usize) -> MapResult<Self> {
        Self::all().get(index).copied().ok_or_else(|| {
            MapError::NotFound(format!(
                "time slice index {} out of range (expected 0..={})",
                index,
                Self::COUNT - 1
            ))
        })
    }

    /// Position of the slice on the time slider.
    pub fn index(self) -> usize {
        match self {
            TimeSlice::T1 => 0,
            TimeSlice::T2 => 1,
            TimeSlice::T3 => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlice::T1 => "T1",
            TimeSlice::T2 => "T2",
            TimeSlice::T3 => "T3",
        }
    }

    /// Default feed file name for the slice.
    pub fn default_file_name(self) -> String {
        format!("map_data_{}.json", self.label().to_lowercase())
    }
}

impl fmt::Display for TimeSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serde_uses_feed_names() {
        let point = Point::new("a1", 10.0, 72.5, 28.0, 34.9, "Rastrelliger kanagurta")
            .with_alert("Low oxygen");
        let json = serde_json::to_value(&point).unwrap();

        assert_eq!(json["temp"], 28.0);
        assert_eq!(json["alerts"], "Low oxygen");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_point_without_alert_omits_field() {
        let point = Point::new("a1", 10.0, 72.5, 28.0, 34.9, "Tuna");
        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("alerts"));
    }

    #[test]
    fn test_missing_readings_deserialize_as_none() {
        let point: Point = serde_json::from_str(r#"{"id": "b", "lat": 8.1, "lon": 77.5}"#).unwrap();
        assert!(point.temperature.is_none());
        assert!(point.salinity.is_none());
        assert!(point.species.is_none());
        assert_eq!(serde_json::to_string(&point).unwrap(), r#"{"id":"b","lat":8.1,"lon":77.5}"#);
    }

    #[test]
    fn test_position_validation() {
        assert!(Point::new("ok", -90.0, 180.0, 0.0, 0.0, "x").has_valid_position());
        assert!(!Point::new("lat", 91.0, 0.0, 0.0, 0.0, "x").has_valid_position());
        assert!(!Point::new("lon", 0.0, -180.5, 0.0, 0.0, "x").has_valid_position());
        assert!(!Point::new("nan", f64::NAN, 0.0, 0.0, 0.0, "x").has_valid_position());
        assert!(!Point::new("inf", 0.0, f64::INFINITY, 0.0, 0.0, "x").has_valid_position());
    }

    #[test]
    fn test_time_slice_index_roundtrip() {
        for slice in TimeSlice::all() {
            assert_eq!(TimeSlice::from_index(slice.index()).unwrap(), slice);
        }
    }

    #[test]
    fn test_time_slice_out_of_range() {
        let err = TimeSlice::from_index(3).unwrap_err();
        assert!(matches!(err, MapError::NotFound(_)));
    }

    #[test]
    fn test_time_slice_file_names() {
        assert_eq!(TimeSlice::T1.default_file_name(), "map_data_t1.json");
        assert_eq!(TimeSlice::T3.default_file_name(), "map_data_t3.json");
        assert_eq!(TimeSlice::T2.to_string(), "T2");
    }
}
