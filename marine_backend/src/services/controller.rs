//! Map page controller.
//!
//! Owns the point list of the active slice, the layer toggles and the derived
//! clusters and heat cells. Slice requests are numbered; a fetch result is
//! applied only if it answers the latest request.

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::config::{GridSettings, MapConfig};
use crate::core::domain::{Point, TimeSlice};
use crate::core::layers::{LayerName, LayerState};
use crate::error::MapResult;
use crate::io::source::PointSource;
use crate::services::aggregator::{compute_clusters, compute_heat_cells, ClusterCell, HeatCell};
use crate::services::map_render::{build_scene, MapScene};

/// Placeholder text shown while a slice is loading.
pub const LOADING_MESSAGE: &str = "Loading WebGIS Map...";

/// Ticket returned by [`MapPageController::request_slice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRequest {
    pub generation: u64,
    pub slice: TimeSlice,
}

/// State of the active slice's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "lowercase")]
pub enum FeedStatus {
    /// No slice requested yet.
    Idle,
    Loading,
    Ready,
    /// The last fetch failed; the page renders with no points.
    Failed(String),
}

/// What the page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum MapView {
    Loading { message: String },
    Ready(MapScene),
}

impl MapView {
    pub fn is_loading(&self) -> bool {
        matches!(self, MapView::Loading { .. })
    }

    pub fn scene(&self) -> Option<&MapScene> {
        match self {
            MapView::Ready(scene) => Some(scene),
            MapView::Loading { .. } => None,
        }
    }
}

pub struct MapPageController {
    grid: GridSettings,
    layers: LayerState,
    time_slice: TimeSlice,
    generation: u64,
    status: FeedStatus,
    points: Vec<Point>,
    clusters: Vec<ClusterCell>,
    heat_cells: Vec<HeatCell>,
}

impl MapPageController {
    /// Create a controller from a validated configuration.
    pub fn new(config: &MapConfig) -> MapResult<Self> {
        config.validate()?;
        Ok(Self {
            grid: config.grid.clone(),
            layers: config.layers,
            time_slice: TimeSlice::default(),
            generation: 0,
            status: FeedStatus::Idle,
            points: Vec::new(),
            clusters: Vec::new(),
            heat_cells: Vec::new(),
        })
    }

    /// Switch to a slice and start a new generation.
    ///
    /// Data from the previous slice is dropped immediately, so the page shows
    /// the loading placeholder until [`apply_fetch`](Self::apply_fetch) is
    /// called with the returned ticket.
    ///
    /// # Errors
    /// `MapError::NotFound` if `index` is not a known slice; the controller is
    /// left untouched in that case.
    pub fn request_slice(&mut self, index: usize) -> MapResult<SliceRequest> {
        let slice = TimeSlice::from_index(index)?;
        self.generation += 1;
        self.time_slice = slice;
        self.status = FeedStatus::Loading;
        self.points.clear();
        self.clusters.clear();
        self.heat_cells.clear();

        debug!("Requested {} (generation {})", slice, self.generation);
        Ok(SliceRequest {
            generation: self.generation,
            slice,
        })
    }

    /// Apply the outcome of a fetch.
    ///
    /// Returns `false` and changes nothing when `request` has been superseded.
    pub fn apply_fetch(&mut self, request: SliceRequest, result: MapResult<Vec<Point>>) -> bool {
        if request.generation != self.generation {
            debug!(
                "Discarding {} result from generation {} (current {})",
                request.slice, request.generation, self.generation
            );
            return false;
        }

        match result {
            Ok(points) => {
                info!("Showing {} points for {}", points.len(), request.slice);
                self.points = points;
                self.status = FeedStatus::Ready;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", request.slice, e);
                self.points.clear();
                self.status = FeedStatus::Failed(e.to_string());
            }
        }
        self.recompute_clusters();
        self.recompute_heat_cells();
        true
    }

    /// Request a slice, fetch it from `source` and apply the result.
    pub async fn load_slice<S: PointSource + ?Sized>(
        &mut self,
        source: &S,
        index: usize,
    ) -> MapResult<bool> {
        let request = self.request_slice(index)?;
        let result = source.fetch(request.slice).await;
        Ok(self.apply_fetch(request, result))
    }

    /// Flip a layer and return its new visibility.
    pub fn toggle_layer(&mut self, layer: LayerName) -> bool {
        let visible = self.layers.toggle(layer);
        self.layer_changed(layer);
        visible
    }

    pub fn set_layer(&mut self, layer: LayerName, visible: bool) {
        if self.layers.is_enabled(layer) != visible {
            self.layers.set(layer, visible);
            self.layer_changed(layer);
        }
    }

    fn layer_changed(&mut self, layer: LayerName) {
        match layer {
            LayerName::Cluster => self.recompute_clusters(),
            LayerName::Heat => self.recompute_heat_cells(),
            _ => {}
        }
    }

    fn recompute_clusters(&mut self) {
        self.clusters = compute_clusters(
            &self.points,
            self.grid.cluster_cell_size_degrees,
            self.layers.cluster,
        )
        .unwrap_or_else(|e| {
            error!("Cluster aggregation failed: {}", e);
            Vec::new()
        });
    }

    fn recompute_heat_cells(&mut self) {
        self.heat_cells = compute_heat_cells(
            &self.points,
            self.grid.heat_cell_size_degrees,
            self.layers.heat,
        )
        .unwrap_or_else(|e| {
            error!("Heat aggregation failed: {}", e);
            Vec::new()
        });
    }

    pub fn layers(&self) -> &LayerState {
        &self.layers
    }

    pub fn time_slice(&self) -> TimeSlice {
        self.time_slice
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn clusters(&self) -> &[ClusterCell] {
        &self.clusters
    }

    pub fn heat_cells(&self) -> &[HeatCell] {
        &self.heat_cells
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Current page content.
    pub fn view(&self) -> MapView {
        match self.status {
            FeedStatus::Idle | FeedStatus::Loading => MapView::Loading {
                message: LOADING_MESSAGE.to_string(),
            },
            FeedStatus::Ready | FeedStatus::Failed(_) => MapView::Ready(build_scene(
                self.time_slice,
                &self.layers,
                &self.points,
                &self.clusters,
                &self.heat_cells,
            )),
        }
    }
}
