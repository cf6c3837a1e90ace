//! Vector output
//!
//! Two drivers are available: `GeoJSON` writes one FeatureCollection that
//! carries the layer name and a CRS84 `crs` member, `GeoJSONSeq` writes one
//! Feature per line. Files are written to a temporary sibling and renamed
//! over the destination, so a failed run never leaves a partial file.

use crate::error::{Error, Result};
use crate::feature::{Feature as BandFeature, FeatureCollection as BandCollection};
use crate::path::Vertex;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value as GeoValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Default coordinate precision (approximately 1 meter for degrees)
pub const DEFAULT_PRECISION: u32 = 5;

const CRS84: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

/// Round a coordinate value to specified decimal places
fn round_coord_with_precision(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Output driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "GeoJSON")]
    GeoJson,
    #[serde(rename = "GeoJSONSeq")]
    GeoJsonSeq,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::GeoJson => "GeoJSON",
            OutputFormat::GeoJsonSeq => "GeoJSONSeq",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geojson" => Ok(OutputFormat::GeoJson),
            "geojsonseq" => Ok(OutputFormat::GeoJsonSeq),
            _ => Err(Error::UnsupportedFormat(format!(
                "no driver named '{}', available: GeoJSON, GeoJSONSeq",
                s.trim()
            ))),
        }
    }
}

/// How a collection is written
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub format: OutputFormat,
    /// Property receiving each feature's attribute value
    pub attribute_field: String,
    /// Decimal places kept in coordinates, `None` keeps full precision
    pub precision: Option<u32>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::GeoJson,
            attribute_field: "wind".to_string(),
            precision: Some(DEFAULT_PRECISION),
        }
    }
}

/// Round and de-duplicate a closed ring
///
/// Returns `None` when rounding collapses the ring below a triangle.
fn ring_positions(ring: &[Vertex], precision: Option<u32>) -> Option<Vec<Position>> {
    let round = |v: f64| match precision {
        Some(p) => round_coord_with_precision(v, p),
        None => v,
    };

    let mut positions: Vec<Position> = Vec::with_capacity(ring.len());
    for vertex in ring {
        let position = vec![round(vertex.x), round(vertex.y)];
        if positions.last() != Some(&position) {
            positions.push(position);
        }
    }

    if let Some(first) = positions.first().cloned() {
        if positions.last() != Some(&first) {
            positions.push(first);
        }
    }

    (positions.len() >= 4).then_some(positions)
}

fn to_geojson_feature(feature: &BandFeature, options: &WriteOptions) -> Option<Feature> {
    let mut rings = feature.geometry.rings().iter();
    let exterior = ring_positions(rings.next()?, options.precision)?;
    let mut polygon = vec![exterior];
    polygon.extend(rings.filter_map(|hole| ring_positions(hole, options.precision)));

    let mut props = JsonObject::new();
    props.insert(
        options.attribute_field.clone(),
        serde_json::json!(feature.attribute_value),
    );
    props.insert("lower_level".to_string(), serde_json::json!(feature.band.lower));
    props.insert("upper_level".to_string(), serde_json::json!(feature.band.upper));

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoValue::Polygon(polygon))),
        id: None,
        properties: Some(props),
        foreign_members: None,
    })
}

/// Convert features to GeoJSON, dropping polygons that rounding collapses
pub fn to_geojson(collection: &BandCollection, options: &WriteOptions) -> FeatureCollection {
    let features: Vec<Feature> = collection
        .features
        .iter()
        .filter_map(|f| to_geojson_feature(f, options))
        .collect();

    let dropped = collection.features.len() - features.len();
    if dropped > 0 {
        debug!(dropped, "features collapsed by coordinate rounding");
    }

    let mut members = JsonObject::new();
    members.insert("name".to_string(), serde_json::json!(collection.layer));
    members.insert(
        "crs".to_string(),
        serde_json::json!({ "type": "name", "properties": { "name": CRS84 } }),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(members),
    }
}

/// Write a collection to `path`, replacing any existing file
pub fn write(collection: &BandCollection, path: &Path, options: &WriteOptions) -> Result<()> {
    let start = std::time::Instant::now();
    let geojson = to_geojson(collection, options);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("output directory {} does not exist", dir.display()),
        )));
    }

    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        match options.format {
            OutputFormat::GeoJson => serde_json::to_writer(&mut out, &geojson)?,
            OutputFormat::GeoJsonSeq => {
                for feature in &geojson.features {
                    serde_json::to_writer(&mut out, feature)?;
                    out.write_all(b"\n")?;
                }
            }
        }
        out.flush()?;
    }
    tmp.as_file().sync_all()?;

    if path.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} is a directory", path.display()),
        )));
    }
    if path.exists() {
        debug!(path = %path.display(), "replacing existing output");
    }
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(
        path = %path.display(),
        format = %options.format,
        features = geojson.features.len(),
        bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        elapsed = ?start.elapsed(),
        "wrote output"
    );

    Ok(())
}
