use std::f64::consts::PI;

use super::bounds::{GeoBounds, GeoPoint};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 100.0;

/// Web Mercator y in [0, 1] for a latitude in degrees (0 = north edge)
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

/// Latitude in degrees for a normalized Mercator y
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}

/// Web Mercator camera over a braille pixel canvas
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Degrees, wrapped into -180..180
    pub center_lon: f64,
    /// Degrees, clamped to the Mercator limit
    pub center_lat: f64,
    /// 1.0 shows the whole world across the canvas width
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Initial view over the Amazon basin
    pub fn amazon(width: usize, height: usize) -> Self {
        Self::new(-51.92528, -14.235004, 6.0, width, height)
    }

    /// Shift the centre by a pixel offset
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the point under (px, py) fixed on screen
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Center and zoom so `bounds` just fits the canvas
    pub fn fit_bounds(&mut self, bounds: &GeoBounds) {
        let sw = bounds.south_west();
        let ne = bounds.north_east();

        let x_span = (ne.lng - sw.lng).abs() / 360.0;
        let top = mercator_y(ne.lat.clamp(-85.0, 85.0));
        let bottom = mercator_y(sw.lat.clamp(-85.0, 85.0));
        let y_span = (bottom - top).abs();

        let width = self.width.max(1) as f64;
        let height = self.height.max(1) as f64;

        let zoom_x = if x_span > 0.0 { 1.0 / x_span } else { MAX_ZOOM };
        let zoom_y = if y_span > 0.0 { height / (width * y_span) } else { MAX_ZOOM };

        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);
        self.center_lon = (sw.lng + ne.lng) / 2.0;
        self.center_lat = inverse_mercator_y((top + bottom) / 2.0);
    }

    /// Pixels covered by `meters` at latitude `lat`
    pub fn meters_to_pixels(&self, lat: f64, meters: f64) -> f64 {
        let probe = GeoBounds::around_circle(GeoPoint::new(lat, self.center_lon), meters);
        let (lng_span, _) = probe.span();
        lng_span / 2.0 / 360.0 * self.zoom * self.width as f64
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width.max(1) as f64;

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        (x * 360.0 - 180.0, inverse_mercator_y(y))
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;

        (px, py)
    }

    pub fn project_point(&self, point: GeoPoint) -> (i32, i32) {
        self.project(point.lng, point.lat)
    }

    /// On canvas, with a small margin for glyphs straddling the edge
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10
            && px < self.width as i32 + 10
            && py >= -10
            && py < self.height as i32 + 10
    }

    /// Cheap reject for segments wholly off canvas
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}
