//! The operations the site overlay needs from a map widget.

use ratatui::style::Color;

use super::bounds::{GeoBounds, GeoPoint};

/// Handle to a shape placed on a map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: GeoPoint,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleLayer {
    pub center: GeoPoint,
    /// Metres
    pub radius: f64,
    pub stroke: Color,
    pub fill: Color,
    pub fill_opacity: f64,
}

/// Popup content bound to a layer: a title plus detail lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ToggleDetection,
    ToggleRisk,
}

/// Button drawn in the top-right corner of a map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    /// Keyboard shortcut
    pub key: char,
    pub action: ControlAction,
}

pub trait MapSurface {
    fn add_marker(&mut self, marker: Marker) -> LayerId;
    fn add_circle(&mut self, circle: CircleLayer) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);
    fn bind_popup(&mut self, id: LayerId, popup: Popup);
    /// Union bounds of the given layers, `None` if none of them exist
    fn bounds_of(&self, ids: &[LayerId]) -> Option<GeoBounds>;
    fn fit_bounds(&mut self, bounds: GeoBounds);
    fn add_control(&mut self, control: Control);
}
