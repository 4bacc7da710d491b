//! Layer composition: turns the five layer toggles into a render plan.
//!
//! Cluster bubbles replace individual markers rather than overlaying them, so
//! when the cluster layer is on the ocean/bio/fish toggles are ignored. The
//! heat layer is independent of the marker mode.

use serde::{Deserialize, Serialize};

use crate::core::domain::Point;
use crate::core::layers::{LayerName, LayerState};

/// Radius of markers that are not sized by an attribute.
pub const DEFAULT_MARKER_RADIUS: f64 = 4.0;

/// Smallest radius of a temperature-sized marker.
pub const MIN_TEMPERATURE_RADIUS: f64 = 3.0;

/// Largest radius of a temperature-sized marker.
pub const MAX_TEMPERATURE_RADIUS: f64 = 9.0;

/// Marker radius for a temperature reading in °C.
///
/// `(temp - 10) * 0.6`, clamped to `[3, 9]`. A NaN reading gets the minimum.
pub fn temperature_radius(temperature: f64) -> f64 {
    ((temperature - 10.0) * 0.6)
        .max(MIN_TEMPERATURE_RADIUS)
        .min(MAX_TEMPERATURE_RADIUS)
}

/// A group of individual circle markers with its own style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerGroup {
    Ocean,
    Bio,
    Fish,
}

impl MarkerGroup {
    /// Marker groups in draw order.
    pub fn all() -> [MarkerGroup; 3] {
        [MarkerGroup::Ocean, MarkerGroup::Bio, MarkerGroup::Fish]
    }

    /// Layer toggle controlling this group.
    pub fn layer(self) -> LayerName {
        match self {
            MarkerGroup::Ocean => LayerName::Ocean,
            MarkerGroup::Bio => LayerName::Bio,
            MarkerGroup::Fish => LayerName::Fish,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            MarkerGroup::Ocean => "#0ea5e9", // sky blue
            MarkerGroup::Bio => "#10b981",   // teal green
            MarkerGroup::Fish => "#3b82f6",  // deep blue
        }
    }

    /// Marker radius for a point in this group. Only oceanography markers
    /// are sized by temperature; without a reading they use the default.
    pub fn radius_for(self, point: &Point) -> f64 {
        match self {
            MarkerGroup::Ocean => point
                .temperature
                .map_or(DEFAULT_MARKER_RADIUS, temperature_radius),
            MarkerGroup::Bio | MarkerGroup::Fish => DEFAULT_MARKER_RADIUS,
        }
    }
}

/// How the marker layers are drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum MarkerPlan {
    /// Only cluster bubbles.
    Clustered,
    /// Each listed group as its own marker layer.
    Individual { groups: Vec<MarkerGroup> },
}

/// Everything the render adapter needs to know about layer visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub markers: MarkerPlan,
    pub heat: bool,
}

impl RenderPlan {
    pub fn shows_clusters(&self) -> bool {
        matches!(self.markers, MarkerPlan::Clustered)
    }

    /// Individual marker groups to draw; empty in clustered mode.
    pub fn individual_groups(&self) -> &[MarkerGroup] {
        match &self.markers {
            MarkerPlan::Clustered => &[],
            MarkerPlan::Individual { groups } => groups,
        }
    }
}

/// Resolve layer toggles into a render plan.
///
/// Pure function of the five booleans.
///
/// # Examples
///
/// ```
/// use marine_map::core::layers::LayerState;
/// use marine_map::services::render_plan::{resolve_render_plan, MarkerPlan};
///
/// let plan = resolve_render_plan(&LayerState::default());
/// assert_eq!(plan.markers, MarkerPlan::Clustered);
/// assert!(plan.heat);
/// ```
pub fn resolve_render_plan(layers: &LayerState) -> RenderPlan {
    let markers = if layers.cluster {
        MarkerPlan::Clustered
    } else {
        MarkerPlan::Individual {
            groups: MarkerGroup::all()
                .into_iter()
                .filter(|group| layers.is_enabled(group.layer()))
                .collect(),
        }
    };

    RenderPlan {
        markers,
        heat: layers.heat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_suppresses_individual_groups() {
        let plan = resolve_render_plan(&LayerState::default());

        assert!(plan.shows_clusters());
        assert!(plan.individual_groups().is_empty());
        assert!(plan.heat);
    }

    #[test]
    fn test_individual_groups_follow_toggles() {
        let layers = LayerState {
            ocean: true,
            bio: false,
            fish: true,
            heat: false,
            cluster: false,
        };
        let plan = resolve_render_plan(&layers);

        assert!(!plan.shows_clusters());
        assert_eq!(
            plan.individual_groups(),
            &[MarkerGroup::Ocean, MarkerGroup::Fish]
        );
        assert!(!plan.heat);
    }

    #[test]
    fn test_heat_independent_of_marker_mode() {
        let clustered = resolve_render_plan(&LayerState::only(&[LayerName::Cluster, LayerName::Heat]));
        let individual = resolve_render_plan(&LayerState::only(&[LayerName::Heat]));

        assert!(clustered.heat && individual.heat);
        assert!(clustered.shows_clusters());
        assert_eq!(individual.markers, MarkerPlan::Individual { groups: vec![] });
    }

    #[test]
    fn test_plan_is_pure() {
        let layers = LayerState::only(&[LayerName::Bio]);
        assert_eq!(resolve_render_plan(&layers), resolve_render_plan(&layers));
    }

    #[test]
    fn test_temperature_radius_clamped() {
        assert_eq!(temperature_radius(-5.0), MIN_TEMPERATURE_RADIUS);
        assert_eq!(temperature_radius(40.0), MAX_TEMPERATURE_RADIUS);
        assert!((temperature_radius(20.0) - 6.0).abs() < 1e-12);
        assert_eq!(temperature_radius(f64::NAN), MIN_TEMPERATURE_RADIUS);
    }

    #[test]
    fn test_group_radius_and_color() {
        let warm = Point::new("w", 10.0, 75.0, 24.0, 35.0, "x");
        assert!((MarkerGroup::Ocean.radius_for(&warm) - 8.4).abs() < 1e-12);
        assert_eq!(MarkerGroup::Bio.radius_for(&warm), DEFAULT_MARKER_RADIUS);
        assert_eq!(MarkerGroup::Fish.color(), "#3b82f6");

        let mut unknown = warm.clone();
        unknown.temperature = None;
        assert_eq!(MarkerGroup::Ocean.radius_for(&unknown), DEFAULT_MARKER_RADIUS);
    }

    #[test]
    fn test_plan_serializes_tagged_mode() {
        let plan = resolve_render_plan(&LayerState::only(&[LayerName::Fish]));
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["markers"]["mode"], "individual");
        assert_eq!(json["markers"]["groups"][0], "fish");
    }
}
