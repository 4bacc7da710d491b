//! Core domain models for the marine map.
//!
//! This module defines the observation points, the fixed time slices and the
//! layer toggles that every other part of the crate consumes.

pub mod domain;
pub mod layers;

pub use domain::{Point, TimeSlice};
pub use layers::{LayerName, LayerState};
