/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles dense kernel, polynomial, operator and saddle-point system matrices.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Matrix assembly.
//!
//! Every entry is independent, so rows are computed in parallel with `rayon`
//! once the problem reaches the configured threshold. Each row is written once.

use crate::{
    error::{RbfError, Result, ensure_dim},
    nodes::NodeSet,
    operators::DifferentialOperator,
    polynomials::PolynomialBasis,
};
use faer::{Mat, concat};
use meshfree_rbf_utils::{Kernel, RadialKernel};
use rayon::prelude::*;

/// Builds an `nrows x ncols` matrix row by row.
fn assemble_rows<F>(nrows: usize, ncols: usize, parallel: bool, fill_row: F) -> Mat<f64>
where
    F: Fn(usize, &mut [f64]) + Sync,
{
    let compute = |i: usize| {
        let mut row = vec![0.0; ncols];
        fill_row(i, &mut row);
        row
    };

    let rows: Vec<Vec<f64>> = match parallel {
        true => (0..nrows).into_par_iter().map(compute).collect(),
        false => (0..nrows).map(compute).collect(),
    };

    Mat::from_fn(nrows, ncols, |i, j| rows[i][j])
}

#[inline]
fn use_parallel(nrows: usize, ncols: usize, parallel_threshold: usize) -> bool {
    nrows.max(ncols) >= parallel_threshold
}

/// `A[i, j] = k(x_i, y_j)`
pub fn kernel_matrix(
    kernel: &Kernel,
    x: &NodeSet,
    y: &NodeSet,
    parallel_threshold: usize,
) -> Result<Mat<f64>> {
    ensure_dim(kernel.dim(), x.dim())?;
    ensure_dim(kernel.dim(), y.dim())?;

    let (m, n) = (x.len(), y.len());
    Ok(assemble_rows(m, n, use_parallel(m, n, parallel_threshold), |i, row| {
        let xi = x.node(i);
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = kernel.evaluate(xi, y.node(j));
        }
    }))
}

/// `P[i, j] = p_j(x_i)`
pub fn polynomial_matrix(basis: &PolynomialBasis, x: &NodeSet) -> Result<Mat<f64>> {
    ensure_dim(basis.dim(), x.dim())?;
    Ok(basis.evaluate_monomials(x.as_mat()))
}

/// Rows `[k(x_i, y_1), .., k(x_i, y_n), p_1(x_i), .., p_q(x_i)]`.
///
/// Multiplying by the stacked coefficients evaluates an interpolant at `x`.
pub fn evaluation_matrix(
    kernel: &Kernel,
    basis: &PolynomialBasis,
    x: &NodeSet,
    centers: &NodeSet,
    parallel_threshold: usize,
) -> Result<Mat<f64>> {
    let kernel_block = kernel_matrix(kernel, x, centers, parallel_threshold)?;
    if basis.is_empty() {
        return Ok(kernel_block);
    }
    let poly_block = polynomial_matrix(basis, x)?;
    Ok(concat![[kernel_block, poly_block]])
}

/// Rows `[L k(·, y_1)(x_i), .., L k(·, y_n)(x_i), L p_1(x_i), .., L p_q(x_i)]`.
///
/// Fails with [`RbfError::InvalidArgument`] when the operator is undefined for
/// the kernel at some pair, typically a second-order operator applied to a
/// kernel that is not twice differentiable at coincident points.
pub fn operator_matrix(
    operator: &dyn DifferentialOperator,
    kernel: &Kernel,
    basis: &PolynomialBasis,
    x: &NodeSet,
    centers: &NodeSet,
    parallel_threshold: usize,
) -> Result<Mat<f64>> {
    ensure_dim(kernel.dim(), x.dim())?;
    ensure_dim(kernel.dim(), centers.dim())?;
    ensure_dim(basis.dim(), x.dim())?;
    operator.validate(x.dim())?;

    let (m, n, q) = (x.len(), centers.len(), basis.len());
    let matrix = assemble_rows(m, n + q, use_parallel(m, n, parallel_threshold), |i, row| {
        let xi = x.node(i);
        let (kernel_part, poly_part) = row.split_at_mut(n);
        for (j, entry) in kernel_part.iter_mut().enumerate() {
            *entry = operator.apply(kernel, xi, centers.node(j));
        }
        for (j, entry) in poly_part.iter_mut().enumerate() {
            *entry = operator.apply_polynomial(basis, j, xi);
        }
    });

    match matrix.is_all_finite() {
        true => Ok(matrix),
        false => Err(RbfError::InvalidArgument(format!(
            "{operator:?} is undefined for {} at some node pair",
            kernel.name()
        ))),
    }
}

/// Symmetric saddle-point matrix `[[A + λI, P], [Pᵀ, 0]]`.
///
/// With an empty basis this is just `A + λI`.
pub fn system_matrix(
    kernel: &Kernel,
    nodes: &NodeSet,
    basis: &PolynomialBasis,
    regularization: f64,
    parallel_threshold: usize,
) -> Result<Mat<f64>> {
    let mut a = kernel_matrix(kernel, nodes, nodes, parallel_threshold)?;
    for i in 0..nodes.len() {
        a[(i, i)] += regularization;
    }

    let q = basis.len();
    if q == 0 {
        return Ok(a);
    }

    let p = polynomial_matrix(basis, nodes)?;
    let p_t = p.transpose().to_owned();
    let zeros = Mat::<f64>::zeros(q, q);

    Ok(concat![[a, p], [p_t, zeros]])
}
