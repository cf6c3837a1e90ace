//! End-to-end run: points in, band features out

use crate::bands::extract_level_set;
use crate::cleaner::clean;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::feature::{emit_all, FeatureCollection};
use crate::grid::plan;
use crate::interpolation::interpolate;
use crate::point::PointSet;
use crate::source::read_csv;
use crate::writer::write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Run every stage on an in-memory point set
///
/// The configuration is validated before any work. An empty cleaned set is
/// `InsufficientData`.
pub fn run(points: PointSet, config: &Config) -> Result<FeatureCollection> {
    let start = Instant::now();
    config.validate()?;
    let levels = config.level_set()?;

    let raw = points.len();
    let points = clean(points);
    if points.is_empty() {
        return Err(Error::InsufficientData(format!(
            "no usable observations among {raw} input rows"
        )));
    }

    let grid = plan(&points, config.resolution, config.spatial_pad)?;
    debug!(
        rows = grid.rows(),
        cols = grid.cols(),
        west = grid.bbox.west,
        south = grid.bbox.south,
        east = grid.bbox.east,
        north = grid.bbox.north,
        "planned grid"
    );

    let field = interpolate(&points, &grid, &config.interpolation_params())?;
    let bands = extract_level_set(&field, &grid, &levels, config.extend)?;
    let collection = emit_all(&bands, config.attribute_policy, &config.layer_name)?;

    info!(
        points = points.len(),
        features = collection.len(),
        elapsed = ?start.elapsed(),
        "pipeline complete"
    );

    Ok(collection)
}

/// Read `src`, run the pipeline and write the result to `out`
///
/// The output driver is resolved before reading so an unknown format fails
/// without touching the file system.
pub fn run_files(src: &Path, out: &Path, config: &Config) -> Result<FeatureCollection> {
    config.validate()?;
    let options = config.write_options()?;

    let points = read_csv(src, &config.columns())?;
    let collection = run(points, config)?;
    write(&collection, out, &options)?;

    Ok(collection)
}
