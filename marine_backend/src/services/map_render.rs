//! Map render adapter.
//!
//! Converts aggregated cells, raw points and a [`RenderPlan`] into the three
//! primitive kinds the map widget understands: circle markers, filled
//! rectangles and labeled icon markers. Every call builds a fresh list; inputs
//! are only borrowed.

use serde::{Deserialize, Serialize};

use crate::core::domain::{Point, TimeSlice};
use crate::core::layers::{LayerName, LayerState};
use crate::services::aggregator::{ClusterCell, HeatCell};
use crate::services::render_plan::{resolve_render_plan, MarkerGroup, RenderPlan};

/// Fill opacity of individual markers.
pub const MARKER_FILL_OPACITY: f64 = 0.8;

/// Fill opacity of heat rectangles.
pub const HEAT_FILL_OPACITY: f64 = 0.35;

/// Hue of the heat ramp (oklch degrees, cyan).
pub const HEAT_HUE: f64 = 200.0;

/// Cluster bubble edge length in pixels.
pub const CLUSTER_ICON_SIZE: u32 = 28;

/// Stroke/fill options for a vector shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: f64,
}

/// Detail shown when a marker is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDetail {
    pub id: String,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

fn reading<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => v.to_string(),
        Some(v) => format!("{} {}", v, unit),
        None => "n/a".to_string(),
    }
}

impl PointDetail {
    pub fn from_point(point: &Point) -> Self {
        Self {
            id: point.id.clone(),
            temperature: point.temperature,
            salinity: point.salinity,
            species: point.species.clone(),
            alert: point.alert.clone(),
        }
    }

    /// Popup text, one entry per line. Missing readings show as `n/a`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Point {}", self.id),
            format!("Temperature: {}", reading(self.temperature, "°C")),
            format!("Salinity: {}", reading(self.salinity, "PSU")),
            format!("Species: {}", reading(self.species.as_deref(), "")),
        ];
        if let Some(alert) = self.alert.as_deref().filter(|a| !a.is_empty()) {
            lines.push(format!("Alert: {}", alert));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleMarker {
    /// Stable widget key, unique per point and group.
    pub key: String,
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub radius: f64,
    pub group: MarkerGroup,
    pub style: PathStyle,
    pub popup: PointDetail,
}

/// oklch color of a heat rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatFill {
    /// Percent, 45..=85.
    pub lightness: f64,
    /// 0.02..=0.14.
    pub chroma: f64,
    pub hue: f64,
}

impl HeatFill {
    /// Color for an intensity in `[0, 1]`. Out of range values are clamped.
    ///
    /// Lightness falls and chroma rises with intensity, so a denser cell is
    /// never drawn lighter than a sparser one.
    pub fn for_intensity(intensity: f64) -> Self {
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        Self {
            lightness: 85.0 - intensity * 40.0,
            chroma: 0.02 + intensity * 0.12,
            hue: HEAT_HUE,
        }
    }

    /// CSS color string.
    pub fn css(&self) -> String {
        format!(
            "oklch({:.1}% {:.3} {})",
            self.lightness, self.chroma, self.hue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatRectangle {
    /// `[[south, west], [north, east]]`
    pub bounds: [[f64; 2]; 2],
    pub intensity: f64,
    pub fill: HeatFill,
    pub style: PathStyle,
}

/// Cluster bubble rendered as a div icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterIcon {
    /// `[lat, lon]`
    pub position: [f64; 2],
    pub count: usize,
    pub label: String,
    pub class_name: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
    /// Always false: bubbles are not selectable and carry no popup.
    pub interactive: bool,
}

/// A single drawable handed to the map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapPrimitive {
    CircleMarker(CircleMarker),
    Rectangle(HeatRectangle),
    IconMarker(ClusterIcon),
}

/// Tile source drawn under the data layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

/// Initial camera and zoom limits of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: [f64; 2],
    pub bounds: [[f64; 2]; 2],
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tiles: TileLayer,
}

impl Default for MapViewport {
    fn default() -> Self {
        // Indian subcontinent and surrounding seas
        Self {
            center: [20.5937, 78.9629],
            bounds: [[6.4, 68.7], [35.5, 97.25]],
            zoom: 4,
            min_zoom: 3,
            max_zoom: 9,
            tiles: TileLayer {
                url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OSM</a>"
                    .to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub layer: LayerName,
    pub label: String,
    pub enabled: bool,
}

/// Full render output for one time slice and toggle combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapScene {
    pub slice: TimeSlice,
    pub viewport: MapViewport,
    pub legend: Vec<LegendEntry>,
    pub plan: RenderPlan,
    pub primitives: Vec<MapPrimitive>,
}

impl MapScene {
    pub fn circle_markers(&self) -> impl Iterator<Item = &CircleMarker> {
        self.primitives.iter().filter_map(|p| match p {
            MapPrimitive::CircleMarker(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn rectangles(&self) -> impl Iterator<Item = &HeatRectangle> {
        self.primitives.iter().filter_map(|p| match p {
            MapPrimitive::Rectangle(rect) => Some(rect),
            _ => None,
        })
    }

    pub fn cluster_icons(&self) -> impl Iterator<Item = &ClusterIcon> {
        self.primitives.iter().filter_map(|p| match p {
            MapPrimitive::IconMarker(icon) => Some(icon),
            _ => None,
        })
    }
}

pub fn render_heat_cells(cells: &[HeatCell]) -> Vec<MapPrimitive> {
    cells
        .iter()
        .map(|cell| {
            let fill = HeatFill::for_intensity(cell.intensity);
            MapPrimitive::Rectangle(HeatRectangle {
                bounds: cell.bounds,
                intensity: cell.intensity,
                fill,
                style: PathStyle {
                    color: "transparent".to_string(),
                    fill_color: fill.css(),
                    fill_opacity: HEAT_FILL_OPACITY,
                    weight: 0.0,
                },
            })
        })
        .collect()
}

pub fn render_clusters(clusters: &[ClusterCell]) -> Vec<MapPrimitive> {
    let half = CLUSTER_ICON_SIZE / 2;
    clusters
        .iter()
        .map(|cluster| {
            MapPrimitive::IconMarker(ClusterIcon {
                position: [cluster.lat, cluster.lon],
                count: cluster.count,
                label: cluster.count.to_string(),
                class_name: "cluster-bubble".to_string(),
                icon_size: [CLUSTER_ICON_SIZE, CLUSTER_ICON_SIZE],
                icon_anchor: [half, half],
                interactive: false,
            })
        })
        .collect()
}

/// Circle markers for one group. Points without a usable position are left
/// out.
pub fn render_markers(points: &[Point], group: MarkerGroup) -> Vec<MapPrimitive> {
    let color = group.color();
    points
        .iter()
        .filter(|p| p.has_valid_position())
        .map(|point| {
            MapPrimitive::CircleMarker(CircleMarker {
                key: format!("m-{}-{}", point.id, color),
                center: [point.lat, point.lon],
                radius: group.radius_for(point),
                group,
                style: PathStyle {
                    color: color.to_string(),
                    fill_color: color.to_string(),
                    fill_opacity: MARKER_FILL_OPACITY,
                    weight: 1.0,
                },
                popup: PointDetail::from_point(point),
            })
        })
        .collect()
}

/// Emit primitives for a plan. Heat rectangles come first so they sit under
/// the markers.
pub fn render_primitives(
    plan: &RenderPlan,
    points: &[Point],
    clusters: &[ClusterCell],
    heat_cells: &[HeatCell],
) -> Vec<MapPrimitive> {
    let mut primitives = Vec::new();
    if plan.heat {
        primitives.extend(render_heat_cells(heat_cells));
    }
    if plan.shows_clusters() {
        primitives.extend(render_clusters(clusters));
    } else {
        for group in plan.individual_groups() {
            primitives.extend(render_markers(points, *group));
        }
    }
    primitives
}

/// Build the scene for one slice: resolves the plan from `layers` and renders
/// the given points and derived cells.
pub fn build_scene(
    slice: TimeSlice,
    layers: &LayerState,
    points: &[Point],
    clusters: &[ClusterCell],
    heat_cells: &[HeatCell],
) -> MapScene {
    let plan = resolve_render_plan(layers);
    let primitives = render_primitives(&plan, points, clusters, heat_cells);
    let legend = LayerName::all()
        .into_iter()
        .map(|layer| LegendEntry {
            layer,
            label: layer.label().to_string(),
            enabled: layers.is_enabled(layer),
        })
        .collect();

    MapScene {
        slice,
        viewport: MapViewport::default(),
        legend,
        plan,
        primitives,
    }
}
