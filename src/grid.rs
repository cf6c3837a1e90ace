//! Regular grid planning and the scalar field stored on it
//!
//! The grid is sized from the extent of the cleaned observations. Its axes
//! are linear subdivisions of the padded bounding box with both bounds
//! included, so the resolution drives the number of samples rather than the
//! exact spacing between them.

use crate::error::{Error, Result};
use crate::point::Observation;

/// Padded extent of the observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Extent of `points` grown by `pad` on every side
    ///
    /// Returns `None` for an empty slice.
    pub fn around(points: &[Observation], pad: f64) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            west: first.x,
            south: first.y,
            east: first.x,
            north: first.y,
        };

        for p in &points[1..] {
            bbox.west = bbox.west.min(p.x);
            bbox.east = bbox.east.max(p.x);
            bbox.south = bbox.south.min(p.y);
            bbox.north = bbox.north.max(p.y);
        }

        bbox.west -= pad;
        bbox.south -= pad;
        bbox.east += pad;
        bbox.north += pad;

        Some(bbox)
    }

    pub fn x_range(&self) -> f64 {
        self.east - self.west
    }

    pub fn y_range(&self) -> f64 {
        self.north - self.south
    }
}

/// Number of samples along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub x_steps: usize,
    pub y_steps: usize,
}

impl GridSpec {
    /// `ceil(range / resolution)` per axis, never less than one sample
    ///
    /// Fails with `InvalidConfig` when the grid would exceed
    /// [`MAX_GRID_NODES`].
    pub fn from_bbox(bbox: &BoundingBox, resolution: f64) -> Result<Self> {
        let spec = Self {
            x_steps: steps(bbox.x_range(), resolution)?,
            y_steps: steps(bbox.y_range(), resolution)?,
        };
        match spec.x_steps.checked_mul(spec.y_steps) {
            Some(nodes) if nodes <= MAX_GRID_NODES => Ok(spec),
            _ => Err(too_large(spec.x_steps as f64 * spec.y_steps as f64)),
        }
    }

    pub fn node_count(&self) -> usize {
        self.x_steps * self.y_steps
    }
}

/// Largest number of nodes a planned grid may hold
pub const MAX_GRID_NODES: usize = 50_000_000;

fn too_large(nodes: f64) -> Error {
    Error::InvalidConfig(format!(
        "grid of {nodes:e} nodes is too large, at most {MAX_GRID_NODES} allowed; use a coarser resolution"
    ))
}

fn steps(range: f64, resolution: f64) -> Result<usize> {
    let count = (range / resolution).ceil();
    if !count.is_finite() || count > MAX_GRID_NODES as f64 {
        return Err(too_large(count));
    }
    Ok((count as usize).max(1))
}

/// `count` evenly spaced samples over `[start, stop]`, both bounds included
///
/// With a single sample the result is `[start]`.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = stop;
            values
        }
    }
}

/// A planned grid: bounding box, shape and node coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub bbox: BoundingBox,
    pub spec: GridSpec,
    /// Column coordinates, west to east
    pub xs: Vec<f64>,
    /// Row coordinates, south to north
    pub ys: Vec<f64>,
}

impl Grid {
    /// Build a grid from a bounding box and a horizontal resolution
    pub fn new(bbox: BoundingBox, resolution: f64) -> Result<Self> {
        validate_resolution(resolution)?;
        let spec = GridSpec::from_bbox(&bbox, resolution)?;
        Ok(Self {
            xs: linspace(bbox.west, bbox.east, spec.x_steps),
            ys: linspace(bbox.south, bbox.north, spec.y_steps),
            bbox,
            spec,
        })
    }

    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    pub fn cols(&self) -> usize {
        self.xs.len()
    }

    /// Coordinates of the node at (row, col)
    #[inline]
    pub fn node(&self, row: usize, col: usize) -> (f64, f64) {
        (self.xs[col], self.ys[row])
    }
}

fn validate_resolution(resolution: f64) -> Result<()> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "resolution must be a finite value > 0, got {resolution}"
        )));
    }
    Ok(())
}

/// Plan the interpolation grid for a cleaned point set
///
/// Fails with `InvalidConfig` for a non-positive resolution or a negative
/// pad, and with `InsufficientData` when there are no points.
pub fn plan(points: &[Observation], resolution: f64, pad: f64) -> Result<Grid> {
    validate_resolution(resolution)?;
    if !pad.is_finite() || pad < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "spatial pad must be a finite value >= 0, got {pad}"
        )));
    }

    let bbox = BoundingBox::around(points, pad).ok_or_else(|| {
        Error::InsufficientData("no observations left to compute a grid extent".into())
    })?;

    Grid::new(bbox, resolution)
}

/// Interpolated values on a grid, row-major, `None` where masked
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    rows: usize,
    cols: usize,
    values: Vec<Option<f64>>,
}

impl ScalarField {
    /// A field with every node masked
    pub fn masked(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![None; rows * cols],
        }
    }

    /// Wrap row-major values; non-finite numbers become masked nodes
    pub fn from_values(rows: usize, cols: usize, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(Error::InvalidConfig(format!(
                "field of {rows}x{cols} needs {} values, got {}",
                rows * cols,
                values.len()
            )));
        }
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Ok(Self { rows, cols, values })
    }

    /// Build a field by evaluating `f` at every node of `grid`
    pub fn from_fn<F>(grid: &Grid, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> Option<f64>,
    {
        let mut values = Vec::with_capacity(grid.rows() * grid.cols());
        for &y in &grid.ys {
            for &x in &grid.xs {
                values.push(f(x, y).filter(|v| v.is_finite()));
            }
        }
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            values,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        self.values[row * self.cols + col] = value.filter(|v| v.is_finite());
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_none()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Minimum and maximum over defined nodes
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Observation> {
        coords.iter().map(|&(x, y)| Observation::new(x, y, 1.0)).collect()
    }

    #[test]
    fn test_bbox_with_pad() {
        let bbox = BoundingBox::around(&pts(&[(1.0, 2.0), (4.0, -1.0), (3.0, 5.0)]), 0.5).unwrap();
        assert_eq!(bbox.west, 0.5);
        assert_eq!(bbox.east, 4.5);
        assert_eq!(bbox.south, -1.5);
        assert_eq!(bbox.north, 5.5);
    }

    #[test]
    fn test_plan_step_counts() {
        let grid = plan(&pts(&[(0.0, 0.0), (10.0, 4.0)]), 3.0, 0.0).unwrap();
        assert_eq!(grid.spec.x_steps, 4); // ceil(10/3)
        assert_eq!(grid.spec.y_steps, 2); // ceil(4/3)
        assert_eq!(grid.xs.len(), 4);
        assert_eq!(grid.ys.len(), 2);
    }

    #[test]
    fn test_plan_endpoints_exact() {
        let grid = plan(&pts(&[(0.1, 0.2), (0.7, 0.9)]), 0.07, 0.3).unwrap();
        assert_eq!(grid.xs[0], grid.bbox.west);
        assert_eq!(*grid.xs.last().unwrap(), grid.bbox.east);
        assert_eq!(grid.ys[0], grid.bbox.south);
        assert_eq!(*grid.ys.last().unwrap(), grid.bbox.north);
    }

    #[test]
    fn test_single_point_gets_one_step() {
        let grid = plan(&pts(&[(3.0, 3.0)]), 1.0, 0.0).unwrap();
        assert_eq!(grid.spec, GridSpec { x_steps: 1, y_steps: 1 });
        assert_eq!(grid.xs, vec![3.0]);
    }

    #[test]
    fn test_plan_rejects_oversized_grid() {
        let points = pts(&[(0.0, 0.0), (10.0, 10.0)]);
        for resolution in [1e-300, 1e-6, 5e-4] {
            let result = plan(&points, resolution, 0.0);
            assert!(
                matches!(result, Err(Error::InvalidConfig(ref msg)) if msg.contains("too large")),
                "resolution {resolution} gave {result:?}"
            );
        }
        assert!(matches!(plan(&points, 1.0, 1e308), Err(Error::InvalidConfig(_))));

        // 10 / 2e-3 = 5000 steps per axis, 25M nodes
        let spec = GridSpec::from_bbox(&BoundingBox::around(&points, 0.0).unwrap(), 2e-3).unwrap();
        assert!(spec.node_count() <= MAX_GRID_NODES);
    }

    #[test]
    fn test_plan_rejects_bad_resolution() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(plan(&points, 0.0, 0.0), Err(Error::InvalidConfig(_))));
        assert!(matches!(plan(&points, -1.0, 0.0), Err(Error::InvalidConfig(_))));
        assert!(matches!(plan(&points, f64::NAN, 0.0), Err(Error::InvalidConfig(_))));
        assert!(matches!(plan(&points, 1.0, -0.5), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_plan_rejects_empty() {
        assert!(matches!(plan(&[], 1.0, 0.0), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 8.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_field_masks_non_finite() {
        let field = ScalarField::from_values(1, 3, vec![Some(1.0), Some(f64::NAN), None]).unwrap();
        assert_eq!(field.get(0, 0), Some(1.0));
        assert!(field.is_masked(0, 1));
        assert!(field.is_masked(0, 2));
        assert_eq!(field.defined_count(), 1);
    }

    #[test]
    fn test_field_range() {
        let field =
            ScalarField::from_values(2, 2, vec![Some(3.0), None, Some(-1.0), Some(7.5)]).unwrap();
        assert_eq!(field.range(), Some((-1.0, 7.5)));
        assert_eq!(ScalarField::masked(2, 2).range(), None);
    }

    #[test]
    fn test_field_shape_mismatch() {
        assert!(ScalarField::from_values(2, 2, vec![Some(1.0)]).is_err());
    }
}
