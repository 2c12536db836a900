/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the shared behaviour of radial kernels.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{dual::Dual2, dual::RadialScalar, error::KernelResult};
use faer::RowRef;

/// A radially symmetric kernel `k(x, y) = phi(‖x - y‖)` on `R^dim`.
pub trait RadialKernel {
    /// Radial profile, generic so it can be differentiated with [`Dual2`].
    fn phi<T: RadialScalar>(&self, r: T) -> T;

    /// Minimum polynomial order (degree + 1) that makes the augmented
    /// system nonsingular for distinct nodes. `0` means positive definite.
    fn order(&self) -> usize;

    /// Spatial dimension the kernel is defined on.
    fn dim(&self) -> usize;

    fn name(&self) -> &'static str;

    /// Re-checks parameter ranges, e.g. after deserialization.
    fn validate(&self) -> KernelResult<()>;

    /// Evaluates the kernel between two points.
    #[inline(always)]
    fn evaluate(&self, x: RowRef<f64>, y: RowRef<f64>) -> f64 {
        self.phi(crate::get_distance(x, y))
    }

    /// `phi(r)`, `phi'(r)` and `phi''(r)`.
    #[inline(always)]
    fn radial_derivatives(&self, r: f64) -> Dual2 {
        self.phi(Dual2::variable(r))
    }
}
