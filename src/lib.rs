//! # geo-isobands
//!
//! Turn scattered point observations into filled contour polygons
//! (**isobands**).
//!
//! The pipeline runs in fixed stages:
//!
//! 1. **Clean**: drop observations without a value and repeated coordinates
//! 2. **Plan**: size a regular grid from the padded data extent
//! 3. **Interpolate**: estimate the field at every grid node with one of
//!    `nearest`, `linear`, `cubic` or `rbf`
//! 4. **Extract**: trace every band `[lower, upper)` into ring paths, one
//!    path per polygon, holes included
//! 5. **Assemble / emit**: close the rings and tag each polygon with its
//!    band's attribute value
//! 6. **Write**: serialize the features as GeoJSON or GeoJSONSeq
//!
//! Coordinates can be geographic (lon/lat) or any Cartesian system.
//!
//! ## Examples
//!
//! ### Whole pipeline
//!
//! ```rust,ignore
//! use geo_isobands::{pipeline, Config, Observation};
//!
//! let points = vec![
//!     Observation::new(-100.0, 40.0, 12.0),
//!     Observation::new(-99.0, 40.5, 18.0),
//!     Observation::new(-99.5, 41.0, 25.0),
//! ];
//!
//! let config = Config {
//!     levels: vec![10.0, 15.0, 20.0, 25.0],
//!     ..Config::default()
//! };
//!
//! let collection = pipeline::run(points, &config)?;
//! for feature in &collection.features {
//!     println!("{} -> {} rings", feature.band, feature.geometry.rings().len());
//! }
//! ```
//!
//! ### Stage by stage
//!
//! ```rust,ignore
//! use geo_isobands::{
//!     clean, emit_all, extract_bands, interpolate, plan, AttributePolicy, Extend,
//!     InterpolationParams, Method,
//! };
//!
//! let points = clean(load_points());
//! let grid = plan(&points, 0.25, 5.0)?;
//! let field = interpolate(&points, &grid, &InterpolationParams::new(Method::Linear))?;
//!
//! // N levels give N-1 closed bands
//! let bands = extract_bands(&field, &grid, &[0.0, 10.0, 20.0, 30.0], Extend::Neither)?;
//! let collection = emit_all(&bands, AttributePolicy::Lower, "bands")?;
//! ```
//!
//! ### Ring paths
//!
//! Each traced polygon is a flat [`RingPath`]: a `RingStart` opens a ring,
//! `RingPoint`s continue it. The first ring is the exterior, the others are
//! holes. [`assemble`] turns a path into a [`Polygon`].
//!
//! ## Masked nodes
//!
//! `linear` and `cubic` are undefined outside the convex hull of the data.
//! Those nodes are `None` in the [`ScalarField`] and no band geometry
//! touches them.
//!
//! ## Performance
//!
//! - **Parallel processing**: grid rows and bands run on Rayon's pool
//! - **Ordered**: results are collected in row and band order
//! - **Shared input**: the field is read-only across all threads

mod bands;
mod cell;
mod cleaner;
pub mod config;
mod edge;
mod error;
mod feature;
mod grid;
pub mod interpolation;
mod levels;
pub mod limits;
mod path;
pub mod pipeline;
mod point;
mod ring_assembler;
pub mod source;
mod tracer;
pub mod writer;

pub use bands::{extract_bands, extract_level_set, BandPaths};
pub use cleaner::clean;
pub use config::Config;
pub use error::{Error, Result};
pub use feature::{emit, emit_all, emit_band, AttributePolicy, Feature, FeatureCollection};
pub use grid::{linspace, plan, BoundingBox, Grid, GridSpec, ScalarField, MAX_GRID_NODES};
pub use interpolation::{
    build_interpolator, interpolate, InterpolationParams, Interpolator, Kernel, Method, RbfParams,
};
pub use levels::{Band, Extend, LevelSet};
pub use path::{PathCommand, PathElement, RingPath, Vertex};
pub use point::{Observation, PointSet};
pub use ring_assembler::{assemble, Polygon, RingAssembler};
pub use source::{read_csv, read_points, CsvColumns};
pub use tracer::trace_band;
pub use writer::{write, OutputFormat, WriteOptions, DEFAULT_PRECISION};
