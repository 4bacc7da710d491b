//! Map layer names and the toggle record driving layer visibility.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MapError;

/// One of the five fixed map overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerName {
    Ocean,
    Bio,
    Fish,
    Heat,
    Cluster,
}

impl LayerName {
    /// All layers in legend order.
    pub fn all() -> [LayerName; 5] {
        [
            LayerName::Ocean,
            LayerName::Bio,
            LayerName::Fish,
            LayerName::Heat,
            LayerName::Cluster,
        ]
    }

    /// Short key used in configuration files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            LayerName::Ocean => "ocean",
            LayerName::Bio => "bio",
            LayerName::Fish => "fish",
            LayerName::Heat => "heat",
            LayerName::Cluster => "cluster",
        }
    }

    /// Human readable legend label.
    pub fn label(self) -> &'static str {
        match self {
            LayerName::Ocean => "Oceanography",
            LayerName::Bio => "Biodiversity Hotspots",
            LayerName::Fish => "Fisheries Zones",
            LayerName::Heat => "Heatmap",
            LayerName::Cluster => "Clustered Markers",
        }
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LayerName {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        LayerName::all()
            .into_iter()
            .find(|layer| layer.key() == key)
            .ok_or_else(|| MapError::NotFound(format!("unknown layer '{}'", s.trim())))
    }
}

/// Visibility of every layer.
///
/// This is a plain value: callers derive a render plan from it rather than
/// asking the record which markers to draw. All layers start visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerState {
    pub ocean: bool,
    pub bio: bool,
    pub fish: bool,
    pub heat: bool,
    pub cluster: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            ocean: true,
            bio: true,
            fish: true,
            heat: true,
            cluster: true,
        }
    }
}

impl LayerState {
    /// All layers hidden.
    pub fn none() -> Self {
        Self {
            ocean: false,
            bio: false,
            fish: false,
            heat: false,
            cluster: false,
        }
    }

    /// Builds a state where exactly the given layers are visible.
    pub fn only(layers: &[LayerName]) -> Self {
        layers
            .iter()
            .fold(Self::none(), |state, layer| state.with(*layer, true))
    }

    pub fn is_enabled(&self, layer: LayerName) -> bool {
        match layer {
            LayerName::Ocean => self.ocean,
            LayerName::Bio => self.bio,
            LayerName::Fish => self.fish,
            LayerName::Heat => self.heat,
            LayerName::Cluster => self.cluster,
        }
    }

    pub fn set(&mut self, layer: LayerName, visible: bool) {
        let slot = match layer {
            LayerName::Ocean => &mut self.ocean,
            LayerName::Bio => &mut self.bio,
            LayerName::Fish => &mut self.fish,
            LayerName::Heat => &mut self.heat,
            LayerName::Cluster => &mut self.cluster,
        };
        *slot = visible;
    }

    /// Flips a layer and returns its new visibility.
    pub fn toggle(&mut self, layer: LayerName) -> bool {
        let visible = !self.is_enabled(layer);
        self.set(layer, visible);
        visible
    }

    /// Copy of this state with one layer changed.
    pub fn with(mut self, layer: LayerName, visible: bool) -> Self {
        self.set(layer, visible);
        self
    }

    /// Visible layers in legend order.
    pub fn enabled_layers(&self) -> Vec<LayerName> {
        LayerName::all()
            .into_iter()
            .filter(|layer| self.is_enabled(*layer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_all_visible() {
        let state = LayerState::default();
        assert_eq!(state.enabled_layers().len(), 5);
    }

    #[test]
    fn test_toggle_flips_single_layer() {
        let mut state = LayerState::default();
        assert!(!state.toggle(LayerName::Cluster));
        assert!(!state.cluster);
        assert!(state.ocean && state.bio && state.fish && state.heat);
        assert!(state.toggle(LayerName::Cluster));
    }

    #[test]
    fn test_only_builds_exact_set() {
        let state = LayerState::only(&[LayerName::Ocean, LayerName::Fish]);
        assert_eq!(state.enabled_layers(), vec![LayerName::Ocean, LayerName::Fish]);
    }

    #[test]
    fn test_parse_layer_names() {
        assert_eq!("ocean".parse::<LayerName>().unwrap(), LayerName::Ocean);
        assert_eq!(" Cluster ".parse::<LayerName>().unwrap(), LayerName::Cluster);
        assert!("satellite".parse::<LayerName>().is_err());
    }

    #[test]
    fn test_partial_toml_state_keeps_defaults() {
        let state: LayerState = toml::from_str("cluster = false").unwrap();
        assert!(!state.cluster);
        assert!(state.ocean);
    }
}
