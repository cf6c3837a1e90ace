use geo_isobands::{
    assemble, extract_bands, trace_band, Band, BoundingBox, Extend, Grid, GridSpec, PathCommand,
    ScalarField, Vertex,
};

/// Square grid with integer node coordinates 0..n
fn integer_grid(n: usize) -> Grid {
    let axis: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let max = (n - 1) as f64;
    Grid {
        bbox: BoundingBox {
            west: 0.0,
            south: 0.0,
            east: max,
            north: max,
        },
        spec: GridSpec {
            x_steps: n,
            y_steps: n,
        },
        xs: axis.clone(),
        ys: axis,
    }
}

fn bbox_of(ring: &[Vertex]) -> (f64, f64, f64, f64) {
    ring.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x0, y0, x1, y1), v| (x0.min(v.x), y0.min(v.y), x1.max(v.x), y1.max(v.y)),
    )
}

#[test]
fn test_pit_inside_band_gives_hole() {
    // Distance from the centre: a pit at (5, 5) rising outwards
    let grid = Grid::new(
        BoundingBox {
            west: 0.0,
            south: 0.0,
            east: 10.0,
            north: 10.0,
        },
        1.0,
    )
    .unwrap();
    let field = ScalarField::from_fn(&grid, |x, y| Some(((x - 5.0).powi(2) + (y - 5.0).powi(2)).sqrt()));

    let bands = extract_bands(&field, &grid, &[2.0, 6.0], Extend::Neither).unwrap();
    assert_eq!(bands.len(), 1);
    assert_eq!(bands[0].paths.len(), 1, "annulus should be a single polygon");

    let polygon = assemble(&bands[0].paths[0]).unwrap().unwrap();
    assert_eq!(polygon.holes().len(), 1);

    let (x0, y0, x1, y1) = bbox_of(&polygon.holes()[0]);
    assert!(x0 < 5.0 && x1 > 5.0 && y0 < 5.0 && y1 > 5.0, "hole should surround the pit");
    for v in &polygon.holes()[0] {
        let r = ((v.x - 5.0).powi(2) + (v.y - 5.0).powi(2)).sqrt();
        assert!((r - 2.0).abs() < 0.5, "hole vertex at radius {r}");
    }
}

#[test]
fn test_plane_boundary_is_straight() {
    let grid = integer_grid(6);
    let plane = |x: f64, y: f64| x + 0.5 * y;
    let field = ScalarField::from_fn(&grid, |x, y| Some(plane(x, y)));

    let bands = extract_bands(&field, &grid, &[2.0, 4.0], Extend::Neither).unwrap();
    assert_eq!(bands[0].paths.len(), 1);
    let polygon = assemble(&bands[0].paths[0]).unwrap().unwrap();
    assert!(polygon.holes().is_empty());

    for v in polygon.exterior() {
        let on_domain_edge = v.x == 0.0 || v.x == 5.0 || v.y == 0.0 || v.y == 5.0;
        let value = plane(v.x, v.y);
        let on_level = (value - 2.0).abs() < 1e-9 || (value - 4.0).abs() < 1e-9;
        assert!(on_domain_edge || on_level, "vertex ({}, {}) off the band boundary", v.x, v.y);
        assert!(value > 2.0 - 1e-9 && value < 4.0 + 1e-9);
    }
}

#[test]
fn test_masked_node_never_touched() {
    let grid = integer_grid(5);
    let mut field = ScalarField::from_fn(&grid, |_, _| Some(1.0));
    field.set(2, 2, None);

    let band = Band::new(0, 0.0, 2.0);
    let paths = trace_band(&field, &grid, &band).unwrap();
    assert_eq!(paths.len(), 1);

    let polygon = assemble(&paths[0]).unwrap().unwrap();
    assert_eq!(polygon.holes().len(), 1, "masked node should open a hole");
    for ring in polygon.rings() {
        assert!(ring.iter().all(|v| *v != Vertex::new(2.0, 2.0)));
    }
}

#[test]
fn test_fully_masked_field_has_no_paths() {
    let grid = integer_grid(4);
    let field = ScalarField::masked(4, 4);
    let bands = extract_bands(&field, &grid, &[0.0, 1.0, 2.0], Extend::Both).unwrap();
    assert_eq!(bands.len(), 4);
    assert!(bands.iter().all(|b| b.paths.is_empty()));
}

#[test]
fn test_extend_adds_open_bands() {
    let grid = integer_grid(11);
    let field = ScalarField::from_fn(&grid, |x, _| Some(x));

    let bands = extract_bands(&field, &grid, &[3.0, 7.0], Extend::Both).unwrap();
    assert_eq!(bands.len(), 3);
    assert_eq!(bands[0].band.lower, f64::NEG_INFINITY);
    assert_eq!(bands[2].band.upper, f64::INFINITY);
    for (i, b) in bands.iter().enumerate() {
        assert_eq!(b.band.index, i);
        assert_eq!(b.paths.len(), 1, "band {} should be one strip", b.band);
    }

    let closed = extract_bands(&field, &grid, &[3.0, 7.0], Extend::Neither).unwrap();
    assert_eq!(closed.len(), 1);
}

#[test]
fn test_ring_count_matches_ring_starts() {
    let grid = integer_grid(9);
    // Two separate bumps over a flat floor
    let field = ScalarField::from_fn(&grid, |x, y| {
        let a = ((x - 2.0).powi(2) + (y - 2.0).powi(2)).sqrt();
        let b = ((x - 6.0).powi(2) + (y - 6.0).powi(2)).sqrt();
        Some(10.0 - a.min(b))
    });

    let bands = extract_bands(&field, &grid, &[8.5, 20.0], Extend::Neither).unwrap();
    assert_eq!(bands[0].paths.len(), 2);

    for path in &bands[0].paths {
        let starts = path
            .elements()
            .iter()
            .filter(|e| e.command == PathCommand::RingStart)
            .count();
        assert_eq!(path.elements()[0].command, PathCommand::RingStart);
        let polygon = assemble(path).unwrap().unwrap();
        assert_eq!(polygon.rings().len(), starts);
    }
}

#[test]
fn test_bad_levels_rejected() {
    let grid = integer_grid(3);
    let field = ScalarField::from_fn(&grid, |x, _| Some(x));
    assert!(extract_bands(&field, &grid, &[5.0], Extend::Neither).is_err());
    assert!(extract_bands(&field, &grid, &[2.0, 1.0], Extend::Neither).is_err());
}
