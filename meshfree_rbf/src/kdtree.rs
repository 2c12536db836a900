/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides a simple KD-tree implementation for neighbour queries on node sets.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{MatRef, Row, RowRef};
use meshfree_rbf_utils::get_distance;
use std::cmp::Ordering;

// A single point together with its row index in the source matrix.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointRowWithId {
    pub coords: Row<f64>,
    pub id: usize,
}

impl PointRowWithId {
    pub fn new(coords: RowRef<f64>, id: usize) -> Self {
        Self {
            coords: coords.to_owned(),
            id,
        }
    }
}

/// A node in the KDTree
#[derive(Debug)]
struct Node {
    point: PointRowWithId,
    left: Option<usize>,
    right: Option<usize>,
}

/// Closest candidate found so far during a nearest-neighbour descent.
#[derive(Debug, Clone, Copy)]
struct Nearest {
    distance: f64,
    id: Option<usize>,
}

/// The KDTree structure
#[derive(Debug)]
pub(crate) struct KDTree {
    nodes: Vec<Node>,
}

impl KDTree {
    /// Constructs a new KDTree from the rows of a matrix.
    pub fn new(points: MatRef<f64>) -> Self {
        let mut rows: Vec<PointRowWithId> = (0..points.nrows())
            .map(|i| PointRowWithId::new(points.row(i), i))
            .collect();

        let mut tree = KDTree {
            nodes: Vec::with_capacity(rows.len()),
        };
        tree.build_tree(&mut rows, 0);
        tree
    }

    /// Recursively builds the KDTree and stores nodes in a flat vector.
    fn build_tree(&mut self, points: &mut [PointRowWithId], depth: usize) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        // Determine splitting axis
        let axis = depth % points[0].coords.ncols();

        points.sort_by(|a, b| {
            a.coords[axis]
                .partial_cmp(&b.coords[axis])
                .unwrap_or(Ordering::Equal)
        });

        // Choose the median as the pivot
        let mid = points.len() / 2;

        let node_index = self.nodes.len();
        self.nodes.push(Node {
            point: points[mid].clone(),
            left: None,
            right: None,
        });

        let (lower, upper) = points.split_at_mut(mid);
        self.nodes[node_index].left = self.build_tree(lower, depth + 1);
        self.nodes[node_index].right = self.build_tree(&mut upper[1..], depth + 1);

        Some(node_index)
    }

    /// Returns the ids of all points within euclidean `radius` of `target`.
    pub fn radius_search(&self, target: RowRef<f64>, radius: f64) -> Vec<usize> {
        let mut result = Vec::new();
        if !self.nodes.is_empty() {
            self.radius_search_impl(0, target, radius, 0, &mut result);
        }
        result
    }

    fn radius_search_impl(
        &self,
        node_index: usize,
        target: RowRef<f64>,
        radius: f64,
        depth: usize,
        result: &mut Vec<usize>,
    ) {
        let node = &self.nodes[node_index];

        if get_distance(target, node.point.coords.as_ref()) <= radius {
            result.push(node.point.id);
        }

        let axis = depth % node.point.coords.ncols();
        let diff = target[axis] - node.point.coords[axis];

        // |diff| <= radius means the ball crosses the splitting plane.
        let (visit_left, visit_right) = if diff.abs() <= radius {
            (true, true)
        } else {
            (diff < 0.0, diff >= 0.0)
        };

        if let (true, Some(left)) = (visit_left, node.left) {
            self.radius_search_impl(left, target, radius, depth + 1, result);
        }
        if let (true, Some(right)) = (visit_right, node.right) {
            self.radius_search_impl(right, target, radius, depth + 1, result);
        }
    }

    /// Returns the id of, and distance to, the closest point lying strictly
    /// away from `target`. Points coinciding with `target` are skipped.
    pub fn nearest_positive(&self, target: RowRef<f64>) -> Option<(usize, f64)> {
        let mut best = Nearest {
            distance: f64::INFINITY,
            id: None,
        };
        if !self.nodes.is_empty() {
            self.nearest_impl(0, target, 0, &mut best);
        }
        best.id.map(|id| (id, best.distance))
    }

    fn nearest_impl(&self, node_index: usize, target: RowRef<f64>, depth: usize, best: &mut Nearest) {
        let node = &self.nodes[node_index];

        let dist = get_distance(target, node.point.coords.as_ref());
        if dist > 0.0 && dist < best.distance {
            *best = Nearest {
                distance: dist,
                id: Some(node.point.id),
            };
        }

        let axis = depth % node.point.coords.ncols();
        let diff = target[axis] - node.point.coords[axis];

        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.nearest_impl(near, target, depth + 1, best);
        }
        if let Some(far) = far {
            if diff.abs() <= best.distance {
                self.nearest_impl(far, target, depth + 1, best);
            }
        }
    }
}
