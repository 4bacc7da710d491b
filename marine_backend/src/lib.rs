//! Marine map backend - spatial aggregation and layered map rendering for the
//! marine monitoring dashboard.
//!
//! The crate turns a time slice of geo-tagged sample points into map widget
//! primitives: clustered bubbles, per-layer circle markers and density
//! rectangles.
//!
//! # Module Organization
//!
//! - [`core`]: Points, time slices and layer toggles
//! - [`algorithms`]: Degree grid bucketing
//! - [`services`]: Aggregation, render planning, primitive generation and the page controller
//! - [`parsing`]: Lenient JSON feed parsing
//! - [`preprocessing`]: Dataset quality checks
//! - [`io`]: Point sources and the caching layer
//! - [`config`]: TOML configuration

pub mod algorithms;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod services;

pub use config::MapConfig;
pub use core::domain::{Point, TimeSlice};
pub use core::layers::{LayerName, LayerState};
pub use error::{MapError, MapResult};
pub use services::aggregator::{compute_clusters, compute_heat_cells, ClusterCell, HeatCell};
pub use services::controller::{MapPageController, MapView, SliceRequest};
pub use services::map_render::{build_scene, MapPrimitive, MapScene};
pub use services::render_plan::{resolve_render_plan, MarkerGroup, MarkerPlan, RenderPlan};
