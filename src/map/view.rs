use std::collections::BTreeMap;
use std::rc::Rc;

use ratatui::style::Color;
use tracing::{error, info, trace};

use super::basemap::{Basemap, LineString, Lod, MapInitError};
use super::bounds::GeoBounds;
use super::geometry::{draw_line, fill_circle, stroke_circle};
use super::projection::Viewport;
use super::surface::{CircleLayer, Control, LayerId, MapSurface, Marker, Popup};
use crate::braille::BrailleCanvas;

const LOAD_ERROR_TEXT: &str = "Error loading maps. Please check your map data and try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Open popup resolved to screen space
pub struct PopupView<'a> {
    /// Character cell of the owning marker, if on screen
    pub anchor: Option<(u16, u16)>,
    pub popup: &'a Popup,
}

/// Everything needed to paint one frame of a map panel
pub struct MapLayers<'a> {
    pub basemap: BrailleCanvas,
    pub shapes: BrailleCanvas,
    /// (column, row, colour) of each visible marker glyph
    pub markers: Vec<(u16, u16, Color)>,
    pub popup: Option<PopupView<'a>>,
}

/// A braille map panel: basemap, overlay layers, popups, and controls.
/// Once initialisation fails every mutation becomes a no-op.
pub struct MapView {
    pub title: &'static str,
    pub viewport: Viewport,
    status: MapStatus,
    basemap: Option<Rc<Basemap>>,
    next_layer: u64,
    markers: BTreeMap<LayerId, Marker>,
    circles: BTreeMap<LayerId, CircleLayer>,
    popups: BTreeMap<LayerId, Popup>,
    open_popup: Option<LayerId>,
    controls: Vec<Control>,
}

impl MapView {
    /// Braille gives 2x4 pixels per character
    pub fn new(title: &'static str, width_chars: usize, height_chars: usize) -> Self {
        Self {
            title,
            viewport: Viewport::amazon(width_chars * 2, height_chars * 4),
            status: MapStatus::Loading,
            basemap: None,
            next_layer: 0,
            markers: BTreeMap::new(),
            circles: BTreeMap::new(),
            popups: BTreeMap::new(),
            open_popup: None,
            controls: Vec::new(),
        }
    }

    pub fn init(&mut self, basemap: Result<Rc<Basemap>, &MapInitError>) {
        match basemap {
            Ok(basemap) => {
                info!(map = self.title, lines = basemap.line_count(), "map initialised");
                self.basemap = Some(basemap);
                self.status = MapStatus::Ready;
            }
            Err(e) => {
                error!(map = self.title, error = %e, "map initialisation failed");
                self.status = MapStatus::Failed(format!("{LOAD_ERROR_TEXT} ({e})"));
            }
        }
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == MapStatus::Ready
    }

    /// Update canvas size when the panel is resized
    pub fn resize(&mut self, width_chars: usize, height_chars: usize) {
        self.viewport.width = width_chars * 2;
        self.viewport.height = height_chars * 4;
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn circle_count(&self) -> usize {
        self.circles.len()
    }

    pub fn open_popup(&self) -> Option<&Popup> {
        self.open_popup.and_then(|id| self.popups.get(&id))
    }

    /// Open the next popup in placement order, wrapping to none at the end
    pub fn cycle_popup(&mut self) {
        let next = match self.open_popup {
            Some(current) => self.popups.range(current..).nth(1).map(|(id, _)| *id),
            None => self.popups.keys().next().copied(),
        };
        self.open_popup = next;
    }

    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    fn allocate(&mut self) -> LayerId {
        self.next_layer += 1;
        LayerId(self.next_layer)
    }

    fn layer_bounds(&self, id: &LayerId) -> Option<GeoBounds> {
        if let Some(marker) = self.markers.get(id) {
            return Some(GeoBounds::from_point(marker.position));
        }
        self.circles
            .get(id)
            .map(|c| GeoBounds::around_circle(c.center, c.radius))
    }

    /// Render all layers for a panel of `width` x `height` characters
    pub fn render_layers(&self, width: usize, height: usize) -> MapLayers<'_> {
        let mut viewport = self.viewport.clone();
        viewport.width = width * 2;
        viewport.height = height * 4;

        let mut basemap = BrailleCanvas::new(width, height);
        let mut shapes = BrailleCanvas::new(width, height);
        let mut markers = Vec::new();

        if let Some(data) = &self.basemap {
            for line in data.coastlines(Lod::from_zoom(viewport.zoom)) {
                draw_linestring(&mut basemap, line, &viewport);
            }
            basemap.set_pen(Some(Color::Blue));
            for line in &data.rivers {
                draw_linestring(&mut basemap, line, &viewport);
            }
        }

        for circle in self.circles.values() {
            let (px, py) = viewport.project_point(circle.center);
            let radius = viewport.meters_to_pixels(circle.center.lat, circle.radius).round() as i32;
            if !viewport.is_visible(px, py) && radius < viewport.width as i32 {
                continue;
            }
            let radius = radius.max(1);
            shapes.set_pen(Some(circle.fill));
            fill_circle(&mut shapes, px, py, radius, circle.fill_opacity < 1.0);
            shapes.set_pen(Some(circle.stroke));
            stroke_circle(&mut shapes, px, py, radius);
        }

        for marker in self.markers.values() {
            if let Some(cell) = to_cell(&viewport, marker, width, height) {
                markers.push((cell.0, cell.1, marker.color));
            }
        }

        let popup = self.open_popup.and_then(|id| {
            let popup = self.popups.get(&id)?;
            let anchor = self
                .markers
                .get(&id)
                .and_then(|m| to_cell(&viewport, m, width, height));
            Some(PopupView { anchor, popup })
        });

        MapLayers {
            basemap,
            shapes,
            markers,
            popup,
        }
    }
}

fn to_cell(viewport: &Viewport, marker: &Marker, width: usize, height: usize) -> Option<(u16, u16)> {
    let (px, py) = viewport.project_point(marker.position);
    if px < 0 || py < 0 {
        return None;
    }
    let (cx, cy) = ((px / 2) as usize, (py / 4) as usize);
    (cx < width && cy < height).then_some((cx as u16, cy as u16))
}

/// Draw a linestring with viewport culling
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width * 4 && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

impl MapSurface for MapView {
    fn add_marker(&mut self, marker: Marker) -> LayerId {
        let id = self.allocate();
        if self.is_ready() {
            self.markers.insert(id, marker);
        } else {
            trace!(map = self.title, "marker dropped, map not ready");
        }
        id
    }

    fn add_circle(&mut self, circle: CircleLayer) -> LayerId {
        let id = self.allocate();
        if self.is_ready() {
            self.circles.insert(id, circle);
        }
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.markers.remove(&id);
        self.circles.remove(&id);
        self.popups.remove(&id);
        if self.open_popup == Some(id) {
            self.open_popup = None;
        }
    }

    fn bind_popup(&mut self, id: LayerId, popup: Popup) {
        if self.markers.contains_key(&id) || self.circles.contains_key(&id) {
            self.popups.insert(id, popup);
        }
    }

    fn bounds_of(&self, ids: &[LayerId]) -> Option<GeoBounds> {
        ids.iter()
            .filter_map(|id| self.layer_bounds(id))
            .reduce(|a, b| a.union(&b))
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        if self.is_ready() {
            self.viewport.fit_bounds(&bounds);
        }
    }

    fn add_control(&mut self, control: Control) {
        if self.is_ready() {
            self.controls.push(control);
        }
    }
}
