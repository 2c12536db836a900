/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the node set: an ordered point collection with a cached separation distance.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Node sets.
//!
//! A [`NodeSet`] owns its points as the rows of a `faer` matrix. The
//! separation distance is computed on first request and cached; every
//! mutating method clears the cache, so a stale value is never observed.

use crate::{
    error::{RbfError, Result, ensure_dim},
    kdtree::KDTree,
    progress::{ProgressMsg, ProgressSink, report},
};
use faer::{Mat, MatRef, RowRef};
use meshfree_rbf_utils::{get_distance, select_mat_rows};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// Node count from which neighbour queries go through a KD-tree.
const KD_TREE_THRESHOLD: usize = 64;

/// Ordered collection of points in `R^dim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSet {
    points: Mat<f64>,

    #[serde(skip)]
    separation_distance: OnceLock<f64>,
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl NodeSet {
    /// A node set with no points.
    pub fn empty(dim: usize) -> Result<Self> {
        check_dimension(dim)?;
        Ok(Self::from_mat_unchecked(Mat::zeros(0, dim)))
    }

    /// Node set from a matrix whose rows are points.
    ///
    /// Fails with [`RbfError::DimensionMismatch`] for a matrix without rows.
    pub fn new(points: Mat<f64>) -> Result<Self> {
        check_dimension(points.ncols())?;
        if points.nrows() == 0 {
            return Err(RbfError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        Ok(Self::from_mat_unchecked(points))
    }

    /// Node set from a sequence of points.
    ///
    /// All points must share one dimension and there must be at least one.
    pub fn from_rows<P: AsRef<[f64]>>(rows: &[P]) -> Result<Self> {
        let first = rows.first().ok_or(RbfError::DimensionMismatch {
            expected: 1,
            found: 0,
        })?;
        let dim = first.as_ref().len();
        check_dimension(dim)?;

        for row in rows {
            ensure_dim(dim, row.as_ref().len())?;
        }

        Ok(Self::from_mat_unchecked(Mat::from_fn(rows.len(), dim, |i, j| {
            rows[i].as_ref()[j]
        })))
    }

    /// One-dimensional node set from scalar positions.
    pub fn from_scalars(values: &[f64]) -> Result<Self> {
        Self::new(Mat::from_fn(values.len(), 1, |i, _| values[i]))
    }

    /// Concatenates node sets of identical dimension.
    pub fn merge<'a, I>(sets: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a NodeSet>,
    {
        let sets: Vec<&NodeSet> = sets.into_iter().collect();
        let first = sets.first().ok_or_else(|| {
            RbfError::InvalidArgument("merge needs at least one node set".to_string())
        })?;
        let dim = first.dim();
        for set in &sets {
            ensure_dim(dim, set.dim())?;
        }

        let total: usize = sets.iter().map(|s| s.len()).sum();
        let mut points = Mat::<f64>::zeros(total, dim);
        let mut offset = 0;
        for set in &sets {
            points
                .subrows_mut(offset, set.len())
                .copy_from(&set.points);
            offset += set.len();
        }

        Ok(Self::from_mat_unchecked(points))
    }

    fn from_mat_unchecked(points: Mat<f64>) -> Self {
        Self {
            points,
            separation_distance: OnceLock::new(),
        }
    }

    #[inline]
    fn invalidate(&mut self) {
        self.separation_distance = OnceLock::new();
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    /// The `i`-th point. Panics if `i >= len()`, like slice indexing.
    pub fn node(&self, i: usize) -> RowRef<'_, f64> {
        self.points.row(i)
    }

    /// The `i`-th point, or `None` when out of range.
    pub fn get(&self, i: usize) -> Option<RowRef<'_, f64>> {
        (i < self.len()).then(|| self.points.row(i))
    }

    /// Iterates over the points in order.
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_, f64>> + '_ {
        self.points.row_iter()
    }

    /// Read-only view of the points, one row per point.
    pub fn as_mat(&self) -> MatRef<'_, f64> {
        self.points.as_ref()
    }

    pub fn to_mat(&self) -> Mat<f64> {
        self.points.clone()
    }

    /// Overwrites the `i`-th point.
    pub fn set_node(&mut self, i: usize, point: &[f64]) -> Result<()> {
        self.check_index(i)?;
        ensure_dim(self.dim(), point.len())?;
        self.points
            .row_mut(i)
            .iter_mut()
            .zip(point)
            .for_each(|(dst, &src)| *dst = src);
        self.invalidate();
        Ok(())
    }

    /// Appends a point.
    pub fn push(&mut self, point: &[f64]) -> Result<()> {
        ensure_dim(self.dim(), point.len())?;
        let (n, dim) = self.points.shape();
        self.points.resize_with(n + 1, dim, |_, j| point[j]);
        self.invalidate();
        Ok(())
    }

    /// Removes and returns the last point.
    pub fn pop(&mut self) -> Option<Vec<f64>> {
        let (n, dim) = self.points.shape();
        if n == 0 {
            return None;
        }
        let last = self.points.row(n - 1).iter().copied().collect();
        self.points.truncate(n - 1, dim);
        self.invalidate();
        Some(last)
    }

    /// Removes and returns the `i`-th point, shifting later points down.
    pub fn delete(&mut self, i: usize) -> Result<Vec<f64>> {
        self.check_index(i)?;
        let removed = self.points.row(i).iter().copied().collect();
        let keep: Vec<usize> = (0..self.len()).filter(|&k| k != i).collect();
        self.points = select_mat_rows(&self.points, &keep);
        self.invalidate();
        Ok(removed)
    }

    /// The `i`-th coordinate of every point.
    pub fn values_along_dimension(&self, i: usize) -> Result<Vec<f64>> {
        if i >= self.dim() {
            return Err(RbfError::InvalidArgument(format!(
                "dimension index {i} out of range for a {}-dimensional node set",
                self.dim()
            )));
        }
        Ok(self.points.col(i).iter().copied().collect())
    }

    /// Half the minimum positive pairwise distance; `f64::INFINITY` for
    /// fewer than two distinct points.
    pub fn separation_distance(&self) -> f64 {
        *self
            .separation_distance
            .get_or_init(|| compute_separation_distance(self.points.as_ref()))
    }

    /// Copy without points lying within `tolerance` of an earlier point.
    ///
    /// The first occurrence of each cluster is kept and order is preserved.
    pub fn unique(&self, tolerance: f64) -> Result<Self> {
        self.unique_with_progress(tolerance, &None)
    }

    /// [`NodeSet::unique`], reporting [`ProgressMsg::DuplicatesRemoved`] when
    /// anything was dropped.
    pub fn unique_with_progress(
        &self,
        tolerance: f64,
        progress_callback: &Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self> {
        check_tolerance(tolerance)?;
        let tree = KDTree::new(self.points.as_ref());

        let mut dropped: HashSet<usize> = HashSet::new();
        let mut keep: Vec<usize> = Vec::with_capacity(self.len());

        for i in 0..self.len() {
            if dropped.contains(&i) {
                continue;
            }
            keep.push(i);
            for j in tree.radius_search(self.points.row(i), tolerance) {
                if j > i {
                    dropped.insert(j);
                }
            }
        }

        if !dropped.is_empty() {
            log::warn!("removed {} duplicate node(s)", dropped.len());
            report(
                progress_callback,
                ProgressMsg::DuplicatesRemoved {
                    num_duplicates: dropped.len(),
                },
            );
        }

        Ok(Self::from_mat_unchecked(select_mat_rows(&self.points, &keep)))
    }

    /// Points of `self` farther than `tolerance` from every point of `other`.
    pub fn setdiff(&self, other: &NodeSet, tolerance: f64) -> Result<Self> {
        ensure_dim(self.dim(), other.dim())?;
        check_tolerance(tolerance)?;
        let tree = KDTree::new(other.points.as_ref());

        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| tree.radius_search(self.points.row(i), tolerance).is_empty())
            .collect();

        Ok(Self::from_mat_unchecked(select_mat_rows(&self.points, &keep)))
    }

    /// Dense matrix of pairwise euclidean distances.
    pub fn distance_matrix(&self) -> Mat<f64> {
        Mat::from_fn(self.len(), self.len(), |i, j| {
            get_distance(self.points.row(i), self.points.row(j))
        })
    }

    fn check_index(&self, i: usize) -> Result<()> {
        match i < self.len() {
            true => Ok(()),
            false => Err(RbfError::InvalidArgument(format!(
                "node index {i} out of range for {} nodes",
                self.len()
            ))),
        }
    }
}

impl TryFrom<Mat<f64>> for NodeSet {
    type Error = RbfError;

    fn try_from(points: Mat<f64>) -> Result<Self> {
        NodeSet::new(points)
    }
}

fn check_dimension(dim: usize) -> Result<()> {
    match dim {
        0 => Err(RbfError::InvalidArgument(
            "node dimension must be at least 1".to_string(),
        )),
        _ => Ok(()),
    }
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    match tolerance.is_finite() && tolerance >= 0.0 {
        true => Ok(()),
        false => Err(RbfError::InvalidArgument(format!(
            "tolerance must be finite and non-negative, got {tolerance}"
        ))),
    }
}

fn compute_separation_distance(points: MatRef<f64>) -> f64 {
    let n = points.nrows();
    if n < 2 {
        return f64::INFINITY;
    }

    let min_distance = if n >= KD_TREE_THRESHOLD {
        let tree = KDTree::new(points);
        (0..n)
            .filter_map(|i| tree.nearest_positive(points.row(i)))
            .fold(f64::INFINITY, |acc, (_, d)| acc.min(d))
    } else {
        let mut min_distance = f64::INFINITY;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = get_distance(points.row(i), points.row(j));
                if d > 0.0 && d < min_distance {
                    min_distance = d;
                }
            }
        }
        min_distance
    };

    0.5 * min_distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use faer::mat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force_separation(points: &Mat<f64>) -> f64 {
        let mut best = f64::INFINITY;
        for i in 0..points.nrows() {
            for j in 0..points.nrows() {
                if i != j {
                    let d = get_distance(points.row(i), points.row(j));
                    if d > 0.0 {
                        best = best.min(d);
                    }
                }
            }
        }
        best / 2.0
    }

    fn random_points(n: usize, dim: usize, seed: u64) -> Mat<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Mat::from_fn(n, dim, |_, _| rng.random_range(-1.0..1.0))
    }

    #[test]
    fn construction_validates_dimensions() {
        let ragged: Vec<Vec<f64>> = vec![vec![0.0, 1.0], vec![2.0]];
        assert!(matches!(
            NodeSet::from_rows(&ragged),
            Err(RbfError::DimensionMismatch { expected: 2, found: 1 })
        ));

        let none: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            NodeSet::from_rows(&none),
            Err(RbfError::DimensionMismatch { .. })
        ));
        assert!(NodeSet::new(Mat::zeros(0, 2)).is_err());
        assert!(NodeSet::empty(0).is_err());

        let nodes = NodeSet::from_rows(&[[0.0, 1.0], [2.0, 3.0]]).unwrap();
        assert!(nodes.len() == 2);
        assert!(nodes.dim() == 2);
        assert!(nodes.node(1)[0] == 2.0);
        assert!(nodes.get(2).is_none());
    }

    #[test]
    fn separation_distance_matches_bruteforce() {
        // Below and above the KD-tree threshold.
        for (n, dim, seed) in [(2, 1, 1u64), (10, 2, 2u64), (50, 3, 3u64), (300, 2, 4u64)] {
            let points = random_points(n, dim, seed);
            let expected = brute_force_separation(&points);
            let nodes = NodeSet::new(points).unwrap();
            assert!(nodes.separation_distance() == expected);
        }
    }

    #[test]
    fn separation_distance_of_small_sets_is_infinite() {
        assert!(NodeSet::empty(2).unwrap().separation_distance() == f64::INFINITY);
        assert!(NodeSet::from_rows(&[[1.0, 1.0]]).unwrap().separation_distance() == f64::INFINITY);
    }

    #[test]
    fn mutators_refresh_separation_distance() {
        let mut nodes = NodeSet::from_scalars(&[0.0, 1.0, 3.0]).unwrap();
        assert!(nodes.separation_distance() == 0.5);

        nodes.push(&[3.2]).unwrap();
        assert!((nodes.separation_distance() - 0.1).abs() < 1e-15);

        assert!(nodes.pop() == Some(vec![3.2]));
        assert!(nodes.separation_distance() == 0.5);

        nodes.set_node(2, &[1.5]).unwrap();
        assert!(nodes.separation_distance() == 0.25);

        assert!(nodes.delete(0).unwrap() == vec![0.0]);
        assert!(nodes.len() == 2);
        assert!(nodes.separation_distance() == 0.25);

        assert!(nodes.delete(5).is_err());
        assert!(nodes.set_node(0, &[1.0, 2.0]).is_err());
        assert!(nodes.push(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn merge_concatenates_in_order() {
        let a = NodeSet::from_rows(&[[0.0, 0.0], [1.0, 0.0]]).unwrap();
        let b = NodeSet::from_rows(&[[0.0, 2.0]]).unwrap();
        let merged = NodeSet::merge([&a, &b]).unwrap();

        let expected = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 2.0]];
        assert!(merged.to_mat() == expected);
        assert!(merged.separation_distance() == 0.5);

        let c = NodeSet::from_scalars(&[0.0]).unwrap();
        assert!(NodeSet::merge([&a, &c]).is_err());
    }

    #[test]
    fn values_along_dimension_extracts_columns() {
        let nodes = NodeSet::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(nodes.values_along_dimension(1).unwrap() == vec![2.0, 4.0]);
        assert!(matches!(
            nodes.values_along_dimension(2),
            Err(RbfError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        let nodes =
            NodeSet::from_rows(&[[0.0, 0.0], [1.0, 1.0], [0.0, 1e-12], [1.0, 1.0], [2.0, 0.0]])
                .unwrap();
        let unique = nodes.unique(1e-10).unwrap();

        let expected = mat![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]];
        assert!(unique.to_mat() == expected);
        assert!(nodes.unique(-1.0).is_err());
    }

    #[test]
    fn unique_reports_removed_duplicates() {
        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let store = Arc::clone(&received);
        let (sink, handle) = crate::progress::closure_sink(4, move |msg| {
            if let Ok(mut v) = store.lock() {
                v.push(msg);
            }
        });

        let nodes = NodeSet::from_scalars(&[0.0, 0.5, 0.0, 0.5, 1.0]).unwrap();
        let unique = nodes.unique_with_progress(1e-12, &Some(sink)).unwrap();
        handle.join().unwrap();

        assert!(unique.len() == 3);
        let received = received.lock().unwrap();
        assert!(*received == vec![ProgressMsg::DuplicatesRemoved { num_duplicates: 2 }]);
    }

    #[test]
    fn setdiff_removes_shared_points() {
        let a = NodeSet::from_scalars(&[0.0, 0.25, 0.5, 0.75, 1.0]).unwrap();
        let b = NodeSet::from_scalars(&[0.5, 1.0]).unwrap();
        let diff = a.setdiff(&b, 1e-12).unwrap();
        assert!(diff.values_along_dimension(0).unwrap() == vec![0.0, 0.25, 0.75]);
    }

    #[test]
    fn distance_matrix_is_symmetric() {
        let nodes = NodeSet::from_rows(&[[0.0, 0.0], [3.0, 4.0], [6.0, 8.0]]).unwrap();
        let d = nodes.distance_matrix();
        assert!(d[(0, 1)] == 5.0);
        assert!(d[(2, 0)] == 10.0);
        assert!(d == d.transpose().to_owned());
    }

    #[test]
    fn node_sets_round_trip_through_json() {
        let nodes = NodeSet::from_rows(&[[0.0, 1.0], [2.0, 3.0]]).unwrap();
        let json = serde_json::to_string(&nodes).unwrap();
        let restored: NodeSet = serde_json::from_str(&json).unwrap();
        assert!(nodes == restored);
        assert!(restored.separation_distance() == nodes.separation_distance());
    }
}
