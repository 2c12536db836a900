/////////////////////////////////////////////////////////////////////////////////////////////
//
// Dense factorizations of interpolation and collocation systems, with singularity checks.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # linalg
//!
//! Helper linear algebra functionality.
//!
//! Interpolation systems `[[A, P], [Pᵀ, 0]]` are symmetric but indefinite,
//! so they are factorized with Bunch-Kaufman `LBLᵀ`. Collocation systems are
//! not symmetric and use partial-pivoting `LU`. Both report
//! [`RbfError::SingularSystem`] instead of returning garbage.

use crate::{
    config::Factorization,
    error::{RbfError, Result},
};
use faer::{
    self, Conj, Mat, Side,
    diag::Diag,
    dyn_stack::{MemBuffer, MemStack},
    linalg::solvers::{PartialPivLu, Solve},
    mat::*,
    perm::Perm,
    prelude::*,
};
use faer_traits::{ComplexField, Conjugate, math_utils::one};
use std::fmt;

/// Bunch-Kaufman factorization `P A Pᵀ = L B Lᵀ`.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Lblt<T> {
    L: Mat<T>,
    B_diag: Diag<T>,
    B_subdiag: Diag<T>,
    P: Perm<usize>,
}

#[allow(non_snake_case)]
impl<T: ComplexField> Lblt<T> {
    /// Returns the Bunch-Kaufman factorization of the input A.
    ///
    /// The A is interpreted as Hermitian, but only the provided side is accessed.
    pub fn new<C: Conjugate<Canonical = T>>(A: MatRef<'_, C>, side: Side) -> Self {
        let n = A.nrows();

        let mut L = Mat::zeros(n, n);

        match side {
            Side::Lower => L.copy_from_triangular_lower(A),
            Side::Upper => L.copy_from_triangular_lower(A.adjoint()),
        }

        Self::new_imp(L)
    }

    fn new_imp(mut L: Mat<T>) -> Self {
        let par = faer::get_global_parallelism();

        let n = L.nrows();

        let mut diag = Diag::zeros(n);
        let mut subdiag = Diag::zeros(n);
        let mut perm_fwd = vec![0usize; n];
        let mut perm_bwd = vec![0usize; n];

        let mut mem = MemBuffer::new(
            faer::linalg::cholesky::lblt::factor::cholesky_in_place_scratch::<usize, T>(
                n,
                par,
                default(),
            ),
        );

        let stack = MemStack::new(&mut mem);

        faer::linalg::cholesky::lblt::factor::cholesky_in_place(
            L.as_mut(),
            subdiag.as_mut(),
            &mut perm_fwd,
            &mut perm_bwd,
            par,
            stack,
            default(),
        );

        diag.copy_from(L.diagonal());
        L.diagonal_mut().fill(one());

        Self {
            L,
            B_diag: diag,
            B_subdiag: subdiag,
            P: unsafe {
                Perm::new_unchecked(perm_fwd.into_boxed_slice(), perm_bwd.into_boxed_slice())
            },
        }
    }

    pub fn solve(&self, rhs: MatRef<'_, T>) -> Mat<T> {
        let mut rhs = rhs.to_owned();
        self.solve_in_place_with_conj_impl(rhs.as_mut(), Conj::No);
        rhs
    }

    fn solve_in_place_with_conj_impl(&self, rhs: MatMut<'_, T>, conj: Conj) {
        let par = faer::get_global_parallelism();

        let mut mem = MemBuffer::new(
            faer::linalg::cholesky::lblt::solve::solve_in_place_scratch::<usize, T>(
                self.L.nrows(),
                rhs.ncols(),
                par,
            ),
        );
        let stack = MemStack::new(&mut mem);

        faer::linalg::cholesky::lblt::solve::solve_in_place_with_conj(
            self.L.as_ref(),
            self.B_diag.as_ref(),
            self.B_subdiag.as_ref(),
            conj,
            self.P.as_ref(),
            rhs,
            par,
            stack,
        );
    }
}

impl Lblt<f64> {
    /// True if a 1x1 pivot, or the determinant of a 2x2 pivot block, is
    /// within `tolerance` of zero.
    fn has_negligible_pivot(&self, tolerance: f64) -> bool {
        let d = self.B_diag.column_vector();
        let s = self.B_subdiag.column_vector();
        let n = d.nrows();

        let mut i = 0;
        while i < n {
            if i + 1 < n && s[i] != 0.0 {
                let det = d[i] * d[i + 1] - s[i] * s[i];
                let block_scale = d[i].abs().max(d[i + 1].abs()).max(s[i].abs());
                if det.abs() <= tolerance * block_scale {
                    return true;
                }
                i += 2;
            } else {
                if d[i].abs() <= tolerance {
                    return true;
                }
                i += 1;
            }
        }
        false
    }
}

/// A factorized system matrix.
pub enum SystemSolver {
    Lblt(Lblt<f64>),
    Lu(PartialPivLu<f64>),
}

impl fmt::Debug for SystemSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SystemSolver").field(&self.method()).finish()
    }
}

impl SystemSolver {
    /// Factorizes `a`.
    ///
    /// `Auto` resolves to LBLᵀ when `symmetric` is set and LU otherwise.
    /// Requesting LBLᵀ for a non-symmetric system is an error.
    pub fn new(a: MatRef<'_, f64>, factorization: Factorization, symmetric: bool) -> Result<Self> {
        if a.nrows() != a.ncols() {
            return Err(RbfError::DimensionMismatch {
                expected: a.nrows(),
                found: a.ncols(),
            });
        }
        if !a.is_all_finite() {
            return Err(RbfError::SingularSystem(
                "system matrix contains non-finite entries".to_string(),
            ));
        }

        let n = a.nrows();
        let tolerance = (n.max(1) as f64) * f64::EPSILON * a.norm_max();

        let solver = match (factorization, symmetric) {
            (Factorization::SymmetricIndefinite, false) => {
                return Err(RbfError::InvalidArgument(
                    "symmetric indefinite factorization requested for a non-symmetric system"
                        .to_string(),
                ));
            }
            (Factorization::Lu, _) | (Factorization::Auto, false) => {
                let lu = a.partial_piv_lu();
                let singular = lu.U().diagonal().column_vector().iter().any(|u| u.abs() <= tolerance);
                if singular {
                    return Err(RbfError::SingularSystem(format!(
                        "LU factorization of the {n}x{n} system has a negligible pivot"
                    )));
                }
                SystemSolver::Lu(lu)
            }
            (Factorization::SymmetricIndefinite, true) | (Factorization::Auto, true) => {
                let lblt = Lblt::<f64>::new(a, Side::Lower);
                if lblt.has_negligible_pivot(tolerance) {
                    return Err(RbfError::SingularSystem(format!(
                        "LBLT factorization of the {n}x{n} system has a negligible pivot"
                    )));
                }
                SystemSolver::Lblt(lblt)
            }
        };

        log::debug!("factorized {n}x{n} system with {:?}", solver.method());
        Ok(solver)
    }

    /// Solves `A X = rhs`.
    pub fn solve(&self, rhs: MatRef<'_, f64>) -> Result<Mat<f64>> {
        let solution = match self {
            SystemSolver::Lblt(s) => s.solve(rhs),
            SystemSolver::Lu(s) => s.solve(rhs),
        };

        match solution.is_all_finite() {
            true => Ok(solution),
            false => Err(RbfError::SingularSystem(
                "solution contains non-finite values".to_string(),
            )),
        }
    }

    /// Which factorization was used.
    pub fn method(&self) -> Factorization {
        match self {
            SystemSolver::Lblt(_) => Factorization::SymmetricIndefinite,
            SystemSolver::Lu(_) => Factorization::Lu,
        }
    }
}
