//! Band extraction: contour paths for every band of a level set

use crate::error::{Error, Result};
use crate::grid::{Grid, ScalarField};
use crate::levels::{Band, Extend, LevelSet};
use crate::path::RingPath;
use crate::tracer::trace_band;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

/// Contour paths of a single band
#[derive(Debug, Clone, PartialEq)]
pub struct BandPaths {
    pub band: Band,
    pub paths: Vec<RingPath>,
}

/// Extract band paths from raw levels
///
/// The levels are validated through [`LevelSet::new`].
pub fn extract_bands(
    field: &ScalarField,
    grid: &Grid,
    levels: &[f64],
    extend: Extend,
) -> Result<Vec<BandPaths>> {
    let levels = LevelSet::new(levels.to_vec())?;
    extract_level_set(field, grid, &levels, extend)
}

/// Extract band paths for a validated level set
///
/// Bands are traced in parallel and returned in ascending order. Bands
/// without geometry are kept with no paths.
pub fn extract_level_set(
    field: &ScalarField,
    grid: &Grid,
    levels: &LevelSet,
    extend: Extend,
) -> Result<Vec<BandPaths>> {
    if field.rows() != grid.rows() || field.cols() != grid.cols() {
        return Err(Error::InvalidConfig(format!(
            "field of {}x{} does not match grid of {}x{}",
            field.rows(),
            field.cols(),
            grid.rows(),
            grid.cols()
        )));
    }

    let start = Instant::now();
    let bands = levels.bands(extend);

    let result = bands
        .into_par_iter()
        .map(|band| {
            trace_band(field, grid, &band).map(|paths| BandPaths { band, paths })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        bands = result.len(),
        paths = result.iter().map(|b| b.paths.len()).sum::<usize>(),
        %extend,
        elapsed = ?start.elapsed(),
        "extracted bands"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BoundingBox, GridSpec};

    fn ramp() -> (Grid, ScalarField) {
        let n = 5;
        let grid = Grid {
            bbox: BoundingBox {
                west: 0.0,
                south: 0.0,
                east: 4.0,
                north: 4.0,
            },
            spec: GridSpec {
                x_steps: n,
                y_steps: n,
            },
            xs: (0..n).map(|i| i as f64).collect(),
            ys: (0..n).map(|i| i as f64).collect(),
        };
        let field = ScalarField::from_fn(&grid, |x, _| Some(x));
        (grid, field)
    }

    #[test]
    fn test_bands_in_order() {
        let (grid, field) = ramp();
        let bands = extract_bands(&field, &grid, &[0.0, 1.0, 2.0, 3.0], Extend::Neither).unwrap();

        assert_eq!(bands.len(), 3);
        for (i, b) in bands.iter().enumerate() {
            assert_eq!(b.band.index, i);
            assert_eq!(b.band.lower, i as f64);
            assert_eq!(b.paths.len(), 1);
        }
    }

    #[test]
    fn test_empty_bands_kept() {
        let (grid, field) = ramp();
        let bands = extract_bands(&field, &grid, &[10.0, 20.0], Extend::Neither).unwrap();
        assert_eq!(bands.len(), 1);
        assert!(bands[0].paths.is_empty());
    }

    #[test]
    fn test_extend_adds_open_bands() {
        let (grid, field) = ramp();
        let bands = extract_bands(&field, &grid, &[1.0, 3.0], Extend::Both).unwrap();
        assert_eq!(bands.len(), 3);
        // x < 1, 1 <= x < 3, x >= 3
        assert!(bands.iter().all(|b| b.paths.len() == 1));
    }

    #[test]
    fn test_invalid_levels() {
        let (grid, field) = ramp();
        assert!(matches!(
            extract_bands(&field, &grid, &[5.0], Extend::Neither),
            Err(Error::InvalidConfig(_))
        ));
    }
}
