/////////////////////////////////////////////////////////////////////////////////////////////
//
// Factories for random and regular node sets in and on hypercubes and hyperspheres.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Node generators.
//!
//! Random generators take an optional seed:
//! - `Some(seed)` produces the same nodes on every run and platform.
//! - `None` seeds from the operating system's randomness source.

use crate::{
    error::{RbfError, Result, ensure_dim},
    nodes::NodeSet,
};
use faer::Mat;
use meshfree_rbf_utils::cartesian_product;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn check_box(dim: usize, x_min: f64, x_max: f64) -> Result<()> {
    if dim == 0 {
        return Err(RbfError::InvalidArgument(
            "dimension must be at least 1".to_string(),
        ));
    }
    if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max) {
        return Err(RbfError::InvalidArgument(format!(
            "expected finite bounds with x_min < x_max, got [{x_min}, {x_max}]"
        )));
    }
    Ok(())
}

fn check_count(n: usize, minimum: usize) -> Result<()> {
    match n >= minimum {
        true => Ok(()),
        false => Err(RbfError::InvalidArgument(format!(
            "expected at least {minimum} node(s), got {n}"
        ))),
    }
}

fn check_ball(dim: usize, radius: f64, center: &[f64]) -> Result<()> {
    if dim == 0 {
        return Err(RbfError::InvalidArgument(
            "dimension must be at least 1".to_string(),
        ));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(RbfError::InvalidArgument(format!(
            "radius must be finite and positive, got {radius}"
        )));
    }
    ensure_dim(dim, center.len())
}

/// The two end points of a one-dimensional "boundary".
fn interval_ends(x_min: f64, x_max: f64, requested: usize) -> Result<NodeSet> {
    log::warn!(
        "the boundary of a 1-dimensional domain has exactly 2 nodes; requested count {requested} is ignored"
    );
    NodeSet::from_scalars(&[x_min, x_max])
}

/// `n` points uniformly distributed in `[x_min, x_max]^dim`.
pub fn random_in_hypercube(
    n: usize,
    dim: usize,
    x_min: f64,
    x_max: f64,
    seed: Option<u64>,
) -> Result<NodeSet> {
    check_box(dim, x_min, x_max)?;
    check_count(n, 1)?;
    let mut rng = make_rng(seed);

    NodeSet::new(Mat::from_fn(n, dim, |_, _| rng.random_range(x_min..x_max)))
}

/// `n` points uniformly distributed over the faces of `[x_min, x_max]^dim`.
///
/// Each point picks a random axis and a random side of that axis. In one
/// dimension the boundary is `{x_min, x_max}` whatever `n` is, and a warning
/// is logged.
pub fn random_on_hypercube_boundary(
    n: usize,
    dim: usize,
    x_min: f64,
    x_max: f64,
    seed: Option<u64>,
) -> Result<NodeSet> {
    check_box(dim, x_min, x_max)?;
    if dim == 1 {
        return interval_ends(x_min, x_max, n);
    }
    check_count(n, 1)?;

    let mut rng = make_rng(seed);
    let mut points = Mat::from_fn(n, dim, |_, _| rng.random_range(x_min..x_max));

    for i in 0..n {
        let axis = rng.random_range(0..dim);
        points[(i, axis)] = match rng.random_bool(0.5) {
            true => x_max,
            false => x_min,
        };
    }

    NodeSet::new(points)
}

/// `n` equispaced values covering `[x_min, x_max]`; the midpoint when `n == 1`.
fn linspace(n: usize, x_min: f64, x_max: f64) -> Vec<f64> {
    match n {
        1 => vec![0.5 * (x_min + x_max)],
        _ => {
            let step = (x_max - x_min) / (n - 1) as f64;
            (0..n)
                .map(|i| match i == n - 1 {
                    true => x_max,
                    false => x_min + step * i as f64,
                })
                .collect()
        }
    }
}

/// Tensor-product grid with `n` points per axis, `n^dim` points in total.
///
/// The last coordinate varies fastest.
pub fn grid_in_hypercube(n: usize, dim: usize, x_min: f64, x_max: f64) -> Result<NodeSet> {
    check_box(dim, x_min, x_max)?;
    check_count(n, 1)?;

    NodeSet::new(cartesian_product(&linspace(n, x_min, x_max), dim))
}

/// Nodes of the `n`-per-axis grid that lie on the boundary of the cube.
///
/// Built from the facets: the two extreme slabs of the first coordinate are
/// full `(dim - 1)`-grids, and each of the `n - 2` interior slabs carries the
/// boundary of the `(dim - 1)`-cube. This yields
/// `count(n, d) = 2 n^(d-1) + (n - 2) count(n, d - 1)` with `count(n, 1) = 2`.
///
/// In one dimension `n` is ignored with a logged warning.
pub fn grid_on_hypercube_boundary(
    n: usize,
    dim: usize,
    x_min: f64,
    x_max: f64,
) -> Result<NodeSet> {
    check_box(dim, x_min, x_max)?;
    if dim == 1 {
        return interval_ends(x_min, x_max, n);
    }
    check_count(n, 2)?;

    NodeSet::new(boundary_grid(&linspace(n, x_min, x_max), dim))
}

fn boundary_grid(axis: &[f64], dim: usize) -> Mat<f64> {
    let n = axis.len();
    if dim == 1 {
        return Mat::from_fn(2, 1, |i, _| axis[i * (n - 1)]);
    }

    let slab = cartesian_product(axis, dim - 1);
    let facet = boundary_grid(axis, dim - 1);
    let total = 2 * slab.nrows() + (n - 2) * facet.nrows();

    let mut points = Mat::<f64>::zeros(total, dim);
    let mut offset = 0;

    for (k, &x) in axis.iter().enumerate() {
        let layer = match k == 0 || k == n - 1 {
            true => &slab,
            false => &facet,
        };
        let rows = layer.nrows();
        points.subrows_mut(offset, rows).col_mut(0).fill(x);
        points
            .submatrix_mut(offset, 1, rows, dim - 1)
            .copy_from(layer);
        offset += rows;
    }

    points
}

/// Uniform random direction on the unit sphere in `R^dim`.
fn random_direction(rng: &mut StdRng, dim: usize) -> Vec<f64> {
    loop {
        let v: Vec<f64> = (0..dim).map(|_| rng.sample(StandardNormal)).collect();
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            return v.into_iter().map(|x| x / norm).collect();
        }
    }
}

/// `n` points uniformly distributed in the ball of `radius` around `center`.
pub fn random_in_hypersphere(
    n: usize,
    dim: usize,
    radius: f64,
    center: &[f64],
    seed: Option<u64>,
) -> Result<NodeSet> {
    check_ball(dim, radius, center)?;
    check_count(n, 1)?;
    let mut rng = make_rng(seed);

    let mut points = Mat::<f64>::zeros(n, dim);
    for i in 0..n {
        let direction = random_direction(&mut rng, dim);
        // Radial density proportional to r^(dim - 1).
        let r = radius * rng.random::<f64>().powf(1.0 / dim as f64);
        for j in 0..dim {
            points[(i, j)] = center[j] + r * direction[j];
        }
    }

    NodeSet::new(points)
}

/// `n` points uniformly distributed on the sphere of `radius` around `center`.
///
/// In one dimension the sphere is `{center - radius, center + radius}`
/// whatever `n` is, and a warning is logged.
pub fn random_on_hypersphere_boundary(
    n: usize,
    dim: usize,
    radius: f64,
    center: &[f64],
    seed: Option<u64>,
) -> Result<NodeSet> {
    check_ball(dim, radius, center)?;
    if dim == 1 {
        return interval_ends(center[0] - radius, center[0] + radius, n);
    }
    check_count(n, 1)?;

    let mut rng = make_rng(seed);
    let mut points = Mat::<f64>::zeros(n, dim);
    for i in 0..n {
        let direction = random_direction(&mut rng, dim);
        for j in 0..dim {
            points[(i, j)] = center[j] + radius * direction[j];
        }
    }

    NodeSet::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use std::sync::{Mutex, Once};
    use std::thread::{self, ThreadId};

    fn boundary_count(n: usize, dim: usize) -> usize {
        match dim {
            1 => 2,
            _ => 2 * n.pow(dim as u32 - 1) + (n - 2) * boundary_count(n, dim - 1),
        }
    }

    fn within(nodes: &NodeSet, lo: f64, hi: f64) -> bool {
        nodes.iter().all(|p| p.iter().all(|&x| lo <= x && x <= hi))
    }

    fn on_cube_boundary(nodes: &NodeSet, lo: f64, hi: f64) -> bool {
        nodes
            .iter()
            .all(|p| p.iter().any(|&x| x == lo || x == hi))
    }

    #[test]
    fn grid_has_n_pow_dim_points_inside_bounds() {
        for (n, dim) in [(5, 1), (4, 2), (3, 3), (2, 4)] {
            let nodes = grid_in_hypercube(n, dim, -1.0, 2.0).unwrap();
            assert!(nodes.len() == n.pow(dim as u32));
            assert!(within(&nodes, -1.0, 2.0));
        }

        let nodes = grid_in_hypercube(3, 2, 0.0, 1.0).unwrap();
        assert!(nodes.separation_distance() == 0.25);
    }

    #[test]
    fn boundary_grid_counts_follow_recursion() {
        for (n, dim) in [(2, 2), (5, 2), (4, 3), (3, 4)] {
            let nodes = grid_on_hypercube_boundary(n, dim, 0.0, 1.0).unwrap();
            assert!(nodes.len() == boundary_count(n, dim));
            assert!(on_cube_boundary(&nodes, 0.0, 1.0));
            assert!(nodes.unique(1e-12).unwrap().len() == nodes.len());
        }

        // The surface of a 5x5x5 grid: 125 - 27.
        assert!(grid_on_hypercube_boundary(5, 3, 0.0, 1.0).unwrap().len() == 98);
    }

    /// Collects warnings per test thread.
    struct WarningLog;

    static WARNINGS: Mutex<Vec<(ThreadId, String)>> = Mutex::new(Vec::new());
    static LOGGER: WarningLog = WarningLog;

    impl log::Log for WarningLog {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                if let Ok(mut w) = WARNINGS.lock() {
                    w.push((thread::current().id(), record.args().to_string()));
                }
            }
        }

        fn flush(&self) {}
    }

    /// Runs `f` and returns the warnings it logged on this thread.
    fn warnings_from<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Warn);
            }
        });

        let id = thread::current().id();
        let take = || -> Vec<String> {
            match WARNINGS.lock() {
                Ok(mut w) => {
                    let (mine, rest): (Vec<_>, Vec<_>) = w.drain(..).partition(|(t, _)| *t == id);
                    *w = rest;
                    mine.into_iter().map(|(_, msg)| msg).collect()
                }
                Err(_) => Vec::new(),
            }
        };

        take();
        let result = f();
        (result, take())
    }

    #[test]
    fn one_dimensional_boundaries_have_two_points() {
        for n in [0, 1, 2, 10] {
            let (random, warnings) =
                warnings_from(|| random_on_hypercube_boundary(n, 1, -2.0, 3.0, Some(1)).unwrap());
            assert!(random.values_along_dimension(0).unwrap() == vec![-2.0, 3.0]);
            assert!(warnings.len() == 1);
            assert!(warnings[0].contains("exactly 2 nodes"));

            let (grid, warnings) =
                warnings_from(|| grid_on_hypercube_boundary(n, 1, 0.0, 1.0).unwrap());
            assert!(grid.values_along_dimension(0).unwrap() == vec![0.0, 1.0]);
            assert!(warnings.len() == 1);

            let (sphere, warnings) = warnings_from(|| {
                random_on_hypersphere_boundary(n, 1, 0.5, &[2.0], Some(3)).unwrap()
            });
            assert!(sphere.values_along_dimension(0).unwrap() == vec![1.5, 2.5]);
            assert!(warnings.len() == 1);
        }

        // Higher dimensions log nothing.
        let (_, warnings) = warnings_from(|| grid_on_hypercube_boundary(3, 2, 0.0, 1.0).unwrap());
        assert!(warnings.is_empty());
    }

    #[test]
    fn random_cube_generators_respect_bounds() {
        let inside = random_in_hypercube(200, 3, 0.0, 1.0, Some(42)).unwrap();
        assert!(inside.len() == 200);
        assert!(within(&inside, 0.0, 1.0));

        let boundary = random_on_hypercube_boundary(200, 3, 0.0, 1.0, Some(42)).unwrap();
        assert!(boundary.len() == 200);
        assert!(within(&boundary, 0.0, 1.0));
        assert!(on_cube_boundary(&boundary, 0.0, 1.0));
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let a = random_in_hypersphere(50, 2, 1.0, &[0.0, 0.0], Some(7)).unwrap();
        let b = random_in_hypersphere(50, 2, 1.0, &[0.0, 0.0], Some(7)).unwrap();
        assert!(a == b);
    }

    #[test]
    fn sphere_generators_respect_radius() {
        let center = [1.0, -1.0, 0.5];
        let inside = random_in_hypersphere(300, 3, 2.0, &center, Some(5)).unwrap();
        let surface = random_on_hypersphere_boundary(300, 3, 2.0, &center, Some(6)).unwrap();

        let radius = |p: faer::RowRef<f64>| {
            p.iter()
                .zip(center.iter())
                .map(|(x, c)| (x - c) * (x - c))
                .sum::<f64>()
                .sqrt()
        };

        assert!(inside.iter().all(|p| radius(p) <= 2.0 + 1e-12));
        assert!(surface.iter().all(|p| (radius(p) - 2.0).abs() < 1e-12));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        assert!(matches!(
            random_in_hypercube(10, 2, 1.0, 0.0, None),
            Err(RbfError::InvalidArgument(_))
        ));
        assert!(grid_in_hypercube(0, 2, 0.0, 1.0).is_err());
        assert!(grid_in_hypercube(3, 0, 0.0, 1.0).is_err());
        assert!(grid_on_hypercube_boundary(1, 2, 0.0, 1.0).is_err());
        assert!(random_in_hypersphere(10, 2, -1.0, &[0.0, 0.0], None).is_err());
        assert!(matches!(
            random_on_hypersphere_boundary(10, 2, 1.0, &[0.0], None),
            Err(RbfError::DimensionMismatch { expected: 2, found: 1 })
        ));
    }
}
