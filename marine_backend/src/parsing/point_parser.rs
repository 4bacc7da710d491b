use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::core::domain::Point;

/// Custom deserializer that accepts either string or integer point IDs
fn deserialize_point_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => Ok(s),
        StringOrInt::Int(i) => Ok(i.to_string()),
    }
}

/// Raw JSON structure of one feed entry
#[derive(Debug, Deserialize)]
struct RawPoint {
    #[serde(deserialize_with = "deserialize_point_id")]
    id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    salinity: Option<f64>,
    #[serde(default)]
    species: Option<String>,
    #[serde(default)]
    alerts: Option<String>,
}

/// A feed entry that was left out of the parsed list.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPoint {
    /// Position of the entry in the feed array
    pub index: usize,
    /// Entry id, when one could be read
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of parsing a feed: the usable points plus everything skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointParseReport {
    pub points: Vec<Point>,
    pub skipped: Vec<SkippedPoint>,
}

impl PointParseReport {
    pub fn total_entries(&self) -> usize {
        self.points.len() + self.skipped.len()
    }
}

fn preview(json_str: &str) -> String {
    if json_str.chars().count() > 500 {
        format!("{}...", json_str.chars().take(500).collect::<String>())
    } else {
        json_str.to_string()
    }
}

fn entry_id(entry: &serde_json::Value) -> Option<String> {
    match entry.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert_raw_to_domain(raw: RawPoint) -> Point {
    Point {
        id: raw.id,
        lat: raw.lat,
        lon: raw.lon,
        temperature: raw.temp,
        salinity: raw.salinity,
        species: raw.species,
        alert: raw.alerts,
    }
}

/// Parse a points feed from a string.
///
/// The feed must be a JSON array. Each entry is parsed on its own: entries
/// without an id, with a missing or non-numeric position, with coordinates
/// outside the valid ranges, or with a reading of the wrong type are reported
/// in [`PointParseReport::skipped`] and the rest are kept. Missing readings
/// are allowed.
pub fn parse_points_str(json_str: &str) -> Result<PointParseReport> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .with_context(|| format!("Invalid JSON syntax. First 500 chars: {}", preview(json_str)))?;

    let entries = match json_value {
        serde_json::Value::Array(entries) => entries,
        other => anyhow::bail!(
            "Points feed must be a JSON array, found {}",
            match other {
                serde_json::Value::Object(_) => "an object",
                serde_json::Value::String(_) => "a string",
                serde_json::Value::Number(_) => "a number",
                serde_json::Value::Bool(_) => "a boolean",
                _ => "null",
            }
        ),
    };

    let mut report = PointParseReport::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let id = entry_id(&entry);
        match serde_path_to_error::deserialize::<_, RawPoint>(entry) {
            Ok(raw) => {
                let point = convert_raw_to_domain(raw);
                if point.has_valid_position() {
                    report.points.push(point);
                } else {
                    let reason = format!(
                        "position out of range (lat={}, lon={})",
                        point.lat, point.lon
                    );
                    warn!("Skipping point at index {}: {}", index, reason);
                    report.skipped.push(SkippedPoint { index, id, reason });
                }
            }
            Err(err) => {
                let reason = if err.path().to_string() == "." {
                    err.inner().to_string()
                } else {
                    format!("{}: {}", err.path(), err.inner())
                };
                warn!("Skipping point at index {}: {}", index, reason);
                report.skipped.push(SkippedPoint { index, id, reason });
            }
        }
    }

    Ok(report)
}

/// Parse a points feed file
pub fn parse_points_file(json_path: &Path) -> Result<PointParseReport> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))?;

    parse_points_str(&json_content)
        .with_context(|| format!("Failed to parse points feed: {}", json_path.display()))
}
