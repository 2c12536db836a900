/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the monomial basis, and its exact derivatives, appended to kernel interpolants.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::common;
use faer::{Mat, MatRef, RowRef, unzip, zip};
use serde::{Deserialize, Serialize};

/// Number of monomials in `dim` variables of total degree `< order`.
///
/// This is `C(dim + order - 1, dim)`, and `0` for `order == 0`.
pub fn basis_size(dim: usize, order: usize) -> usize {
    if order == 0 {
        return 0;
    }
    let degree = order - 1;
    // C(dim + degree, degree), built up incrementally to stay exact.
    (1..=degree).fold(1usize, |acc, k| acc * (dim + k) / k)
}

/// Exponent tuples of total degree `degree` in `dim` variables, with the
/// power of the first variable descending (x², xy, xz, y², yz, z²).
fn exponents_of_degree(degree: usize, dim: usize) -> Vec<Vec<usize>> {
    if dim == 1 {
        return vec![vec![degree]];
    }
    (0..=degree)
        .rev()
        .flat_map(|first| {
            exponents_of_degree(degree - first, dim - 1)
                .into_iter()
                .map(move |mut rest| {
                    rest.insert(0, first);
                    rest
                })
        })
        .collect()
}

/// Monomial basis of total degree `< order`, evaluated on coordinates mapped
/// to `[-1, 1]^dim` by `(x - translation) / scale`.
///
/// Scaling keeps the polynomial block well conditioned. Derivatives carry the
/// chain-rule factor `1 / scale` per differentiation, so they are taken with
/// respect to the original coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialBasis {
    order: usize,
    exponents: Vec<Vec<usize>>,
    translation_factor: Vec<f64>,
    scale_factor: Vec<f64>,
}

impl PolynomialBasis {
    /// Basis for the given order, with scaling fitted to the extents of `points`.
    pub fn new(points: MatRef<f64>, order: usize) -> Self {
        let dim = points.ncols();
        let (translation_factor, scale_factor) = match points.nrows() {
            0 => (vec![0.0; dim], vec![1.0; dim]),
            _ => common::get_cheb_cube_scaling_factors(points),
        };

        let exponents = (0..order)
            .flat_map(|degree| exponents_of_degree(degree, dim))
            .collect();

        Self {
            order,
            exponents,
            translation_factor,
            scale_factor,
        }
    }

    /// Polynomial order: maximum monomial degree + 1, or 0 for an empty basis.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.scale_factor.len()
    }

    /// Exponent tuple of the `j`-th monomial.
    pub fn exponents(&self, j: usize) -> &[usize] {
        &self.exponents[j]
    }

    #[inline(always)]
    fn scaled(&self, x: RowRef<f64>, k: usize) -> f64 {
        (x[k] - self.translation_factor[k]) / self.scale_factor[k]
    }

    /// `d^m/dx_k^m` of `((x_k - t_k) / s_k)^e`.
    #[inline(always)]
    fn factor(&self, x: RowRef<f64>, k: usize, e: usize, m: usize) -> f64 {
        if m > e {
            return 0.0;
        }
        let falling = ((e - m + 1)..=e).product::<usize>() as f64;
        falling * self.scaled(x, k).powi((e - m) as i32) / self.scale_factor[k].powi(m as i32)
    }

    /// Applies derivative counts `orders[k]` per dimension to monomial `j` at `x`.
    fn differentiate(&self, j: usize, x: RowRef<f64>, orders: &[usize]) -> f64 {
        self.exponents[j]
            .iter()
            .zip(orders)
            .enumerate()
            .map(|(k, (&e, &m))| self.factor(x, k, e, m))
            .product()
    }

    /// Value of monomial `j` at `x`.
    pub fn value(&self, j: usize, x: RowRef<f64>) -> f64 {
        self.differentiate(j, x, &vec![0; self.dim()])
    }

    /// `∂/∂x_i` of monomial `j` at `x`.
    pub fn first_derivative(&self, j: usize, x: RowRef<f64>, i: usize) -> f64 {
        let mut orders = vec![0; self.dim()];
        orders[i] = 1;
        self.differentiate(j, x, &orders)
    }

    /// `∂²/∂x_i∂x_l` of monomial `j` at `x`.
    pub fn second_derivative(&self, j: usize, x: RowRef<f64>, i: usize, l: usize) -> f64 {
        let mut orders = vec![0; self.dim()];
        orders[i] += 1;
        orders[l] += 1;
        self.differentiate(j, x, &orders)
    }

    /// Evaluates every monomial at every row of `points`, one column per monomial.
    pub fn evaluate_monomials(&self, points: MatRef<f64>) -> Mat<f64> {
        // Scale the points to the [-1, 1]^d hypercube for monomial evaluation.
        let mut scaled_points = points.to_owned();
        common::scale_points(&mut scaled_points, &self.translation_factor, &self.scale_factor);

        let n = scaled_points.nrows();
        let mut monomials = Mat::<f64>::ones(n, self.len());

        for (j, exponents) in self.exponents.iter().enumerate() {
            let mut dst = monomials.col_mut(j);
            for (k, &e) in exponents.iter().enumerate().filter(|(_, e)| **e > 0) {
                let xk = scaled_points.col(k);
                zip!(&mut dst, &xk).for_each(|unzip!(dst, xk)| {
                    *dst *= xk.powi(e as i32);
                });
            }
        }

        monomials
    }
}
