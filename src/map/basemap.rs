use std::fs;
use std::path::{Path, PathBuf};

use geojson::{GeoJson, Geometry, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

#[derive(Debug, Error)]
pub enum MapInitError {
    #[error("map data directory {0} not found")]
    MissingDir(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },
    #[error("no coastline data found in {0}")]
    NoData(PathBuf),
}

/// Level of detail for coastline data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - continental
    Medium, // 50m - regional
    High,   // 10m - local
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 4.0 {
            Lod::Low
        } else if zoom < 16.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }
}

/// Background linework shared by every map panel
#[derive(Default)]
pub struct Basemap {
    pub coastlines_low: Vec<LineString>,
    pub coastlines_medium: Vec<LineString>,
    pub coastlines_high: Vec<LineString>,
    pub rivers: Vec<LineString>,
}

impl Basemap {
    /// Coastlines for the given LOD, falling back to coarser data
    pub fn coastlines(&self, lod: Lod) -> &[LineString] {
        let candidates = match lod {
            Lod::High => [&self.coastlines_high, &self.coastlines_medium, &self.coastlines_low],
            Lod::Medium => [&self.coastlines_medium, &self.coastlines_low, &self.coastlines_high],
            Lod::Low => [&self.coastlines_low, &self.coastlines_medium, &self.coastlines_high],
        };
        candidates
            .into_iter()
            .find(|lines| !lines.is_empty())
            .map(|lines| lines.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_coastlines(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.coastlines_low.len()
            + self.coastlines_medium.len()
            + self.coastlines_high.len()
            + self.rivers.len()
    }

    fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    /// Built-in outline of the Americas and the main Amazon rivers
    pub fn simple_world() -> Self {
        let mut basemap = Basemap::default();

        basemap.add_coastline(
            vec![
                (-80.0, 10.0), (-77.0, 8.5), (-75.0, 11.0), (-72.0, 12.0),
                (-68.0, 10.5), (-62.0, 10.5), (-60.0, 8.5), (-57.0, 6.0),
                (-52.0, 5.0), (-50.0, 1.5), (-48.5, -1.0), (-44.0, -2.5),
                (-40.0, -3.0), (-35.0, -5.0), (-35.0, -9.0), (-38.0, -13.0),
                (-39.0, -18.0), (-41.0, -22.0), (-45.0, -23.5), (-48.5, -26.0),
                (-50.0, -30.0), (-53.0, -33.5), (-58.0, -34.5), (-57.0, -38.0),
                (-62.0, -39.0), (-65.0, -42.0), (-67.5, -46.0), (-68.0, -50.0),
                (-69.0, -52.5), (-74.0, -52.5), (-75.0, -48.0), (-73.5, -42.0),
                (-73.0, -37.0), (-71.5, -30.0), (-70.5, -23.0), (-70.5, -18.5),
                (-75.0, -15.5), (-77.5, -12.0), (-79.5, -8.0), (-81.0, -5.0),
                (-80.0, -1.0), (-80.0, 1.0), (-78.5, 3.0), (-77.5, 7.0),
                (-80.0, 10.0),
            ],
            Lod::Low,
        );

        basemap.add_coastline(
            vec![
                (-77.5, 7.5), (-80.0, 9.0), (-83.5, 10.5), (-83.5, 14.0),
                (-88.0, 16.0), (-87.0, 21.5), (-90.5, 21.0), (-91.5, 18.5),
                (-94.5, 18.5), (-97.5, 22.0), (-97.0, 28.0), (-90.0, 29.5),
                (-84.0, 30.0), (-82.5, 27.0), (-80.0, 25.5), (-81.0, 31.0),
                (-75.5, 35.5), (-70.0, 41.5), (-66.0, 44.5), (-60.0, 46.0),
            ],
            Lod::Low,
        );

        basemap.add_coastline(
            vec![
                (-77.5, 7.5), (-79.5, 7.0), (-82.0, 8.0), (-86.0, 11.5),
                (-92.0, 14.5), (-96.0, 15.7), (-105.5, 20.0), (-105.5, 23.0),
                (-112.0, 29.0), (-114.5, 31.5), (-117.0, 32.5), (-121.0, 35.0),
                (-124.0, 40.0), (-124.0, 46.0),
            ],
            Lod::Low,
        );

        // Amazon main stem, east from Iquitos
        basemap.rivers.push(vec![
            (-73.25, -3.75), (-71.0, -4.3), (-69.9, -4.2), (-67.5, -3.2),
            (-65.0, -3.0), (-62.2, -3.3), (-60.0, -3.1), (-58.4, -3.2),
            (-56.0, -2.6), (-54.7, -2.4), (-52.0, -1.6), (-50.0, -0.5),
        ]);
        // Madeira, from Porto Velho to the confluence
        basemap.rivers.push(vec![
            (-63.9, -8.76), (-62.0, -6.5), (-60.5, -5.0), (-58.8, -3.4),
        ]);
        // Tapajós, meeting the Amazon at Santarém
        basemap.rivers.push(vec![
            (-57.5, -7.5), (-56.5, -5.5), (-55.9, -4.3), (-54.7, -2.4),
        ]);

        basemap
    }
}

const COASTLINE_FILES: [(&str, Lod); 3] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

const RIVER_FILES: [&str; 2] = [
    "ne_50m_rivers_lake_centerlines.json",
    "ne_10m_rivers_lake_centerlines.json",
];

/// Load the basemap both map panels draw on.
///
/// Without a data directory the built-in outline is used. A directory that
/// is missing, holds an unreadable file, or has no coastlines is an error.
pub fn load_basemap(data_dir: Option<&Path>) -> Result<Basemap, MapInitError> {
    let Some(dir) = data_dir else {
        debug!("no data directory, using built-in outline");
        return Ok(Basemap::simple_world());
    };

    if !dir.is_dir() {
        return Err(MapInitError::MissingDir(dir.to_path_buf()));
    }

    let mut basemap = Basemap::default();

    for (filename, lod) in COASTLINE_FILES {
        let path = dir.join(filename);
        if path.exists() {
            let geojson = read_geojson(&path)?;
            process_geojson_lines(&geojson, |line| basemap.add_coastline(line, lod));
        }
    }

    for filename in RIVER_FILES {
        let path = dir.join(filename);
        if !path.exists() {
            continue;
        }
        // Rivers are decoration; a broken file only costs the layer
        match read_geojson(&path) {
            Ok(geojson) => process_geojson_lines(&geojson, |line| basemap.rivers.push(line)),
            Err(e) => warn!(error = %e, "skipping river layer"),
        }
    }

    if !basemap.has_coastlines() {
        return Err(MapInitError::NoData(dir.to_path_buf()));
    }

    Ok(basemap)
}

fn read_geojson(path: &Path) -> Result<GeoJson, MapInitError> {
    let content = fs::read_to_string(path).map_err(|source| MapInitError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    content.parse::<GeoJson>().map_err(|source| MapInitError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// Top-level geometries of a document, skipping features without one
fn top_geometries(geojson: &GeoJson) -> Vec<&Geometry> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.iter().filter_map(|f| f.geometry.as_ref()).collect(),
        GeoJson::Feature(f) => f.geometry.iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    }
}

/// Hand every drawable line in a document to `add_line`.
///
/// The caller decides where a line lands: coastline files route into the
/// `Lod` slot their filename names, river files all go to `rivers`.
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    for geometry in top_geometries(geojson) {
        walk_geometry(geometry, &mut add_line);
    }
}

/// lon/lat pairs; positions with fewer than two ordinates are dropped
fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords
        .iter()
        .filter_map(|c| match c.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect()
}

fn emit_line<F>(coords: &[Vec<f64>], add_line: &mut F)
where
    F: FnMut(LineString),
{
    let line = to_line(coords);
    if line.len() >= 2 {
        add_line(line);
    }
}

/// Polygons contribute their outer ring only; points are not drawable
fn walk_geometry<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match &geometry.value {
        Value::LineString(coords) => emit_line(coords, add_line),
        Value::MultiLineString(lines) => {
            for coords in lines {
                emit_line(coords, add_line);
            }
        }
        Value::Polygon(rings) => {
            if let Some(ring) = rings.first() {
                emit_line(ring, add_line);
            }
        }
        Value::MultiPolygon(polygons) => {
            for ring in polygons.iter().filter_map(|rings| rings.first()) {
                emit_line(ring, add_line);
            }
        }
        Value::GeometryCollection(geometries) => {
            for inner in geometries {
                walk_geometry(inner, add_line);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) => {}
    }
}
