//! Aggregation, render planning, primitive generation and the page controller.
//!
//! Everything here is synchronous except [`controller::MapPageController::load_slice`],
//! which awaits a single point source fetch.

pub mod aggregator;
pub mod controller;
pub mod map_render;
pub mod render_plan;

pub use aggregator::{compute_clusters, compute_heat_cells, ClusterCell, HeatCell};
pub use controller::{FeedStatus, MapPageController, MapView, SliceRequest};
pub use map_render::{build_scene, MapPrimitive, MapScene};
pub use render_plan::{resolve_render_plan, MarkerGroup, MarkerPlan, RenderPlan};
