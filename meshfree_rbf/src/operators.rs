/////////////////////////////////////////////////////////////////////////////////////////////
//
// Linear differential operators applied exactly to kernels and polynomial basis functions.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Differential operators.
//!
//! Operators act on the first argument `x` of a kernel `k(x, y) = phi(‖x - y‖)`.
//! With `d = x - y` and `r = ‖d‖` the chain rule gives
//!
//! ```text
//! ∂_i k     = phi'(r) / r · d_i
//! ∂_i ∂_j k = (phi''(r) - phi'(r) / r) · d_i d_j / r² + phi'(r) / r · δ_ij
//! ```
//!
//! with the limits `∂_i k = 0` and `∂_i ∂_j k = phi''(0) δ_ij` at `r = 0`.
//! These limits exist only when `phi'(0) = 0` and `phi''(0)` is finite. For
//! kernels like `r`, `r^2 log r` or `-r^β` with `β < 2` the derivatives at
//! coincident points come out non-finite.
//!
//! `phi'` and `phi''` come from dual-number evaluation of the kernel profile,
//! so operator values are exact up to round-off.

use crate::{
    error::{RbfError, Result, ensure_dim},
    polynomials::PolynomialBasis,
};
use faer::{Mat, RowRef};
use meshfree_rbf_utils::{Dual2, Kernel, RadialKernel};
use std::fmt::Debug;

/// First and second partial derivatives of a scalar function at one point.
pub trait LocalDerivatives {
    fn value(&self) -> f64;

    /// `∂f/∂x_i`
    fn first(&self, i: usize) -> f64;

    /// `∂²f/∂x_i∂x_j`
    fn second(&self, i: usize, j: usize) -> f64;
}

/// Derivatives of `x ↦ k(x, y)`.
pub struct KernelDerivatives {
    diff: Vec<f64>,
    r: f64,
    jet: Dual2,
}

impl KernelDerivatives {
    pub fn new(kernel: &Kernel, x: RowRef<f64>, y: RowRef<f64>) -> Self {
        let diff: Vec<f64> = x.iter().zip(y.iter()).map(|(a, b)| a - b).collect();
        let r = diff.iter().map(|d| d * d).sum::<f64>().sqrt();
        Self {
            diff,
            r,
            jet: kernel.radial_derivatives(r),
        }
    }
}

impl LocalDerivatives for KernelDerivatives {
    #[inline]
    fn value(&self) -> f64 {
        self.jet.value
    }

    #[inline]
    fn first(&self, i: usize) -> f64 {
        if self.r == 0.0 {
            return match self.jet.d1 == 0.0 {
                true => 0.0,
                false => f64::NAN,
            };
        }
        self.jet.d1 / self.r * self.diff[i]
    }

    #[inline]
    fn second(&self, i: usize, j: usize) -> f64 {
        if self.r == 0.0 {
            return match (self.jet.d1 == 0.0, i == j) {
                (true, true) => self.jet.d2,
                (true, false) if self.jet.d2.is_finite() => 0.0,
                _ => f64::NAN,
            };
        }
        let delta = if i == j { 1.0 } else { 0.0 };
        let d1_over_r = self.jet.d1 / self.r;
        (self.jet.d2 - d1_over_r) * self.diff[i] * self.diff[j] / (self.r * self.r)
            + d1_over_r * delta
    }
}

/// Derivatives of the `index`-th monomial of a basis.
pub struct MonomialDerivatives<'a> {
    basis: &'a PolynomialBasis,
    index: usize,
    x: RowRef<'a, f64>,
}

impl<'a> MonomialDerivatives<'a> {
    pub fn new(basis: &'a PolynomialBasis, index: usize, x: RowRef<'a, f64>) -> Self {
        Self { basis, index, x }
    }
}

impl LocalDerivatives for MonomialDerivatives<'_> {
    fn value(&self) -> f64 {
        self.basis.value(self.index, self.x)
    }

    fn first(&self, i: usize) -> f64 {
        self.basis.first_derivative(self.index, self.x, i)
    }

    fn second(&self, i: usize, j: usize) -> f64 {
        self.basis.second_derivative(self.index, self.x, i, j)
    }
}

/// A scalar linear differential operator with constant coefficients.
pub trait DifferentialOperator: Debug + Send + Sync {
    /// Applies the operator given the local derivatives of a function.
    fn apply_local(&self, f: &dyn LocalDerivatives) -> f64;

    /// Checks the operator is defined in `dim` dimensions.
    fn validate(&self, dim: usize) -> Result<()>;

    /// Applies the operator to `k(·, y)` at `x`.
    fn apply(&self, kernel: &Kernel, x: RowRef<f64>, y: RowRef<f64>) -> f64 {
        self.apply_local(&KernelDerivatives::new(kernel, x, y))
    }

    /// Applies the operator to monomial `index` of `basis` at `x`.
    fn apply_polynomial(&self, basis: &PolynomialBasis, index: usize, x: RowRef<f64>) -> f64 {
        self.apply_local(&MonomialDerivatives::new(basis, index, x))
    }
}

/// `∂/∂x_component`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialDerivative {
    pub component: usize,
}

impl PartialDerivative {
    pub fn new(component: usize) -> Self {
        Self { component }
    }
}

impl DifferentialOperator for PartialDerivative {
    fn apply_local(&self, f: &dyn LocalDerivatives) -> f64 {
        f.first(self.component)
    }

    fn validate(&self, dim: usize) -> Result<()> {
        match self.component < dim {
            true => Ok(()),
            false => Err(RbfError::InvalidArgument(format!(
                "partial derivative component {} out of range in {dim} dimensions",
                self.component
            ))),
        }
    }
}

/// `Δ = Σ_i ∂²/∂x_i²`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laplacian {
    pub dim: usize,
}

impl Laplacian {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl DifferentialOperator for Laplacian {
    fn apply_local(&self, f: &dyn LocalDerivatives) -> f64 {
        (0..self.dim).map(|i| f.second(i, i)).sum()
    }

    fn validate(&self, dim: usize) -> Result<()> {
        ensure_dim(self.dim, dim)
    }
}

/// Second-order elliptic operator
/// `L u = -Σ_ij a_ij ∂_i∂_j u + Σ_i b_i ∂_i u + c u`
/// with constant coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticOperator {
    pub diffusion: Mat<f64>,
    pub advection: Vec<f64>,
    pub reaction: f64,
}

impl EllipticOperator {
    /// Fails unless `diffusion` is square and `advection` matches its size.
    pub fn new(diffusion: Mat<f64>, advection: Vec<f64>, reaction: f64) -> Result<Self> {
        let op = Self {
            diffusion,
            advection,
            reaction,
        };
        op.validate(op.diffusion.nrows())?;
        Ok(op)
    }

    /// `-κ Δ + b·∇`
    pub fn isotropic(dim: usize, diffusivity: f64, advection: Vec<f64>) -> Result<Self> {
        let diffusion = Mat::from_fn(dim, dim, |i, j| if i == j { diffusivity } else { 0.0 });
        Self::new(diffusion, advection, 0.0)
    }

    pub fn dim(&self) -> usize {
        self.diffusion.nrows()
    }
}

impl DifferentialOperator for EllipticOperator {
    fn apply_local(&self, f: &dyn LocalDerivatives) -> f64 {
        let dim = self.dim();
        let mut result = self.reaction * f.value();
        for i in 0..dim {
            if self.advection[i] != 0.0 {
                result += self.advection[i] * f.first(i);
            }
            for j in 0..dim {
                let a = self.diffusion[(i, j)];
                if a != 0.0 {
                    result -= a * f.second(i, j);
                }
            }
        }
        result
    }

    fn validate(&self, dim: usize) -> Result<()> {
        ensure_dim(dim, self.diffusion.nrows())?;
        ensure_dim(dim, self.diffusion.ncols())?;
        ensure_dim(dim, self.advection.len())
    }
}

/// `∇`, one [`PartialDerivative`] per dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub dim: usize,
}

impl Gradient {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn components(&self) -> Vec<PartialDerivative> {
        (0..self.dim).map(PartialDerivative::new).collect()
    }

    /// `∇_x k(x, y)`
    pub fn apply(&self, kernel: &Kernel, x: RowRef<f64>, y: RowRef<f64>) -> Vec<f64> {
        let local = KernelDerivatives::new(kernel, x, y);
        (0..self.dim).map(|i| local.first(i)).collect()
    }
}
