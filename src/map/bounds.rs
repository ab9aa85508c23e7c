use glam::DVec2;

/// Equatorial circumference in metres, for metre → degree conversion
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_017.0;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// x = longitude, y = latitude
    fn to_vec(self) -> DVec2 {
        DVec2::new(self.lng, self.lat)
    }

    fn from_vec(v: DVec2) -> Self {
        Self::new(v.y, v.x)
    }
}

/// Axis-aligned lat/lng box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    min: DVec2,
    max: DVec2,
}

impl GeoBounds {
    pub fn from_point(point: GeoPoint) -> Self {
        let v = point.to_vec();
        Self { min: v, max: v }
    }

    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        let (a, b) = (a.to_vec(), b.to_vec());
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box enclosing a circle of `radius_m` metres around `center`
    pub fn around_circle(center: GeoPoint, radius_m: f64) -> Self {
        let lat_r = radius_m / EARTH_CIRCUMFERENCE_M * 360.0;
        let lng_r = lat_r / center.lat.to_radians().cos().max(1e-6);
        let half = DVec2::new(lng_r, lat_r);
        let c = center.to_vec();
        Self {
            min: c - half,
            max: c + half,
        }
    }

    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::from_vec(self.min)
    }

    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::from_vec(self.max)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::from_vec((self.min + self.max) * 0.5)
    }

    /// (longitude span, latitude span) in degrees
    pub fn span(&self) -> (f64, f64) {
        let d = self.max - self.min;
        (d.x, d.y)
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        let v = point.to_vec();
        v.cmpge(self.min).all() && v.cmple(self.max).all()
    }

    /// Grow each side by `ratio` of the box's span on that axis
    pub fn pad(&self, ratio: f64) -> GeoBounds {
        let buffer = (self.max - self.min).abs() * ratio;
        Self {
            min: self.min - buffer,
            max: self.max + buffer,
        }
    }
}
