use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::grid::{DegreeGrid, GridCell};
use crate::core::domain::Point;
use crate::error::MapResult;

/// Default clustering cell size in degrees.
pub const DEFAULT_CLUSTER_CELL_SIZE_DEGREES: f64 = 1.5;

/// Default heat cell size in degrees.
pub const DEFAULT_HEAT_CELL_SIZE_DEGREES: f64 = 1.0;

/// A cluster bubble: the geometric center of a non-empty grid cell and the
/// number of points inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCell {
    pub lat: f64,
    pub lon: f64,
    pub count: usize,
}

/// A density rectangle with intensity normalized against the densest cell.
///
/// `bounds` is `[[south, west], [north, east]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub bounds: [[f64; 2]; 2],
    pub intensity: f64,
}

/// Counts valid points per grid cell. Points without a usable position are
/// skipped so one bad record never aborts the rest.
fn bucket_points(points: &[Point], grid: &DegreeGrid) -> BTreeMap<GridCell, usize> {
    let mut buckets = BTreeMap::new();
    for point in points.iter().filter(|p| p.has_valid_position()) {
        *buckets.entry(grid.cell_of(point.lat, point.lon)).or_insert(0) += 1;
    }
    buckets
}

/// Compute cluster bubbles for the given points.
///
/// Returns an empty list when clustering is disabled or there are no points,
/// without bucketing anything. The centroid is the cell's geometric center,
/// not the mean of the member positions. Cells are returned in grid order.
///
/// # Errors
///
/// `MapError::ConfigurationError` when `cell_size_degrees` is not a positive
/// finite number.
///
/// # Examples
///
/// ```
/// use marine_map::core::domain::Point;
/// use marine_map::services::aggregator::compute_clusters;
///
/// let points = vec![
///     Point::new("a", 0.3, 0.2, 20.0, 35.0, "x"),
///     Point::new("b", 0.6, 0.4, 20.0, 35.0, "x"),
/// ];
/// let clusters = compute_clusters(&points, 1.5, true).unwrap();
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].count, 2);
/// assert_eq!((clusters[0].lat, clusters[0].lon), (0.75, 0.75));
/// ```
pub fn compute_clusters(
    points: &[Point],
    cell_size_degrees: f64,
    enabled: bool,
) -> MapResult<Vec<ClusterCell>> {
    let grid = DegreeGrid::new(cell_size_degrees)?;
    if !enabled || points.is_empty() {
        return Ok(vec![]);
    }

    let clusters: Vec<ClusterCell> = bucket_points(points, &grid)
        .into_iter()
        .map(|(cell, count)| {
            let (lat, lon) = grid.center(cell);
            ClusterCell { lat, lon, count }
        })
        .collect();

    debug!(
        "Clustered {} points into {} cells of {}°",
        points.len(),
        clusters.len(),
        cell_size_degrees
    );
    Ok(clusters)
}

/// Compute heatmap rectangles for the given points.
///
/// Same short-circuit as [`compute_clusters`]. Each non-empty cell's count is
/// divided by the largest count (at least 1), so the densest cell has
/// intensity 1.0 and empty cells are simply absent.
pub fn compute_heat_cells(
    points: &[Point],
    cell_size_degrees: f64,
    enabled: bool,
) -> MapResult<Vec<HeatCell>> {
    let grid = DegreeGrid::new(cell_size_degrees)?;
    if !enabled || points.is_empty() {
        return Ok(vec![]);
    }

    let buckets = bucket_points(points, &grid);
    let max = buckets.values().copied().max().unwrap_or(0).max(1) as f64;
    let size = grid.cell_size();

    let cells: Vec<HeatCell> = buckets
        .into_iter()
        .map(|(cell, count)| {
            let (south, west) = grid.origin(cell);
            HeatCell {
                bounds: [[south, west], [south + size, west + size]],
                intensity: count as f64 / max,
            }
        })
        .collect();

    debug!(
        "Built {} heat cells of {}° from {} points",
        cells.len(),
        cell_size_degrees,
        points.len()
    );
    Ok(cells)
}
