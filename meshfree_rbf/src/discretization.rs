/////////////////////////////////////////////////////////////////////////////////////////////
//
// Collocation of linear PDEs: stationary solves and semidiscretization in space.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Discretization
//!
//! PDEs are written as
//!
//! ```text
//! ∂_t u + L u = f   in Ω
//!           u = g   on ∂Ω
//! ```
//!
//! with `L` a linear [`DifferentialOperator`]. The unknown is sought as a
//! kernel expansion over all nodes, interior first and boundary second.
//! Interior rows collocate `L`, boundary rows evaluate the expansion, and the
//! polynomial moment conditions close the system.
//!
//! [`solve_stationary`] drops the time derivative and solves the resulting
//! non-symmetric system once. [`Semidiscretization`] turns the problem into
//! an ODE for the coefficients, `M c' = F(c, t)`, where `M` is the symmetric
//! interpolation matrix. Time integration is left to the caller.

use crate::{
    assembly,
    config::InterpolationSettings,
    error::{RbfError, Result, ensure_dim},
    interpolation::{Interpolation, factorize_system},
    linalg::SystemSolver,
    nodes::NodeSet,
    operators::{DifferentialOperator, EllipticOperator},
    polynomials::PolynomialBasis,
    progress::ProgressSink,
};
use faer::{Mat, RowRef, concat};
use meshfree_rbf_utils::{Kernel, RadialKernel};
use std::{fmt, sync::Arc};

/// A scalar function of space and time.
pub type SpaceTimeFn = Arc<dyn Fn(&[f64], f64) -> f64 + Send + Sync>;

/// A linear PDE `∂_t u + L u = f`. Stationary problems ignore `∂_t u`.
pub trait PartialDifferentialEquation: fmt::Debug + Send + Sync {
    /// The spatial operator `L`.
    fn operator(&self) -> &dyn DifferentialOperator;

    /// The source term `f(x, t)`.
    fn rhs(&self, x: &[f64], t: f64) -> f64;
}

macro_rules! impl_pde {
    ($name:ident) => {
        impl PartialDifferentialEquation for $name {
            fn operator(&self) -> &dyn DifferentialOperator {
                &self.operator
            }

            fn rhs(&self, x: &[f64], t: f64) -> f64 {
                (self.source)(x, t)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("operator", &self.operator)
                    .finish_non_exhaustive()
            }
        }
    };
}

/// `-Δu = f`
pub struct PoissonEquation {
    operator: EllipticOperator,
    source: SpaceTimeFn,
}

impl PoissonEquation {
    pub fn new<F>(dim: usize, f: F) -> Result<Self>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Ok(Self {
            operator: EllipticOperator::isotropic(dim, 1.0, vec![0.0; dim])?,
            source: time_independent(f),
        })
    }
}

/// `-Σ a_ij ∂_i∂_j u + Σ b_i ∂_i u + c u = f` for a general [`EllipticOperator`].
pub struct EllipticEquation {
    operator: EllipticOperator,
    source: SpaceTimeFn,
}

impl EllipticEquation {
    pub fn new<F>(operator: EllipticOperator, f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            operator,
            source: time_independent(f),
        }
    }
}

/// `∂_t u - κ Δu = f`
pub struct HeatEquation {
    operator: EllipticOperator,
    source: SpaceTimeFn,
}

impl HeatEquation {
    pub fn new<F>(dim: usize, diffusivity: f64, f: F) -> Result<Self>
    where
        F: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        check_diffusivity(diffusivity)?;
        Ok(Self {
            operator: EllipticOperator::isotropic(dim, diffusivity, vec![0.0; dim])?,
            source: Arc::new(f),
        })
    }
}

/// `∂_t u - κ Δu + b·∇u = f`
pub struct AdvectionDiffusionEquation {
    operator: EllipticOperator,
    source: SpaceTimeFn,
}

impl AdvectionDiffusionEquation {
    pub fn new<F>(diffusivity: f64, advection: Vec<f64>, f: F) -> Result<Self>
    where
        F: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        check_diffusivity(diffusivity)?;
        Ok(Self {
            operator: EllipticOperator::isotropic(advection.len(), diffusivity, advection)?,
            source: Arc::new(f),
        })
    }
}

impl_pde!(PoissonEquation);
impl_pde!(EllipticEquation);
impl_pde!(HeatEquation);
impl_pde!(AdvectionDiffusionEquation);

fn time_independent<F>(f: F) -> SpaceTimeFn
where
    F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
{
    Arc::new(move |x: &[f64], _t: f64| f(x))
}

fn check_diffusivity(diffusivity: f64) -> Result<()> {
    match diffusivity.is_finite() && diffusivity > 0.0 {
        true => Ok(()),
        false => Err(RbfError::InvalidArgument(format!(
            "diffusivity must be positive, got {diffusivity}"
        ))),
    }
}

/// Interior and boundary nodes with a Dirichlet condition `u = g(x, t)`.
#[derive(Clone)]
pub struct SpatialDiscretization {
    interior: NodeSet,
    boundary: NodeSet,

    /// `interior` followed by `boundary`.
    nodeset: Arc<NodeSet>,

    boundary_condition: SpaceTimeFn,

    /// `∂_t g`; zero when absent.
    boundary_rate: Option<SpaceTimeFn>,

    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl fmt::Debug for SpatialDiscretization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialDiscretization")
            .field("num_interior", &self.interior.len())
            .field("num_boundary", &self.boundary.len())
            .field("dim", &self.dim())
            .finish_non_exhaustive()
    }
}

impl SpatialDiscretization {
    /// Fails if the node sets differ in dimension or together hold no nodes.
    pub fn new<G>(interior: NodeSet, boundary: NodeSet, g: G) -> Result<Self>
    where
        G: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        ensure_dim(interior.dim(), boundary.dim())?;
        let nodeset = NodeSet::merge([&interior, &boundary])?;
        if nodeset.is_empty() {
            return Err(RbfError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }

        Ok(Self {
            interior,
            boundary,
            nodeset: Arc::new(nodeset),
            boundary_condition: Arc::new(g),
            boundary_rate: None,
            progress_callback: None,
        })
    }

    /// Sets `∂_t g` for time-dependent boundary data.
    pub fn with_boundary_rate<G>(mut self, dg: G) -> Self
    where
        G: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        self.boundary_rate = Some(Arc::new(dg));
        self
    }

    /// Optional callback for reporting assembly and factorization progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    pub fn dim(&self) -> usize {
        self.nodeset.dim()
    }

    pub fn interior(&self) -> &NodeSet {
        &self.interior
    }

    pub fn boundary(&self) -> &NodeSet {
        &self.boundary
    }

    /// All nodes, interior first.
    pub fn nodeset(&self) -> &NodeSet {
        &self.nodeset
    }

    pub fn boundary_value(&self, x: &[f64], t: f64) -> f64 {
        (self.boundary_condition)(x, t)
    }

    pub fn boundary_rate(&self, x: &[f64], t: f64) -> f64 {
        match &self.boundary_rate {
            Some(dg) => dg(x, t),
            None => 0.0,
        }
    }
}

/// Kernel, basis and operator validated against a discretization.
fn prepare(
    pde: &dyn PartialDifferentialEquation,
    discretization: &SpatialDiscretization,
    kernel: &Kernel,
    settings: &InterpolationSettings,
) -> Result<PolynomialBasis> {
    kernel.validate()?;
    settings.validate()?;
    ensure_dim(kernel.dim(), discretization.dim())?;
    pde.operator().validate(discretization.dim())?;

    let order = settings.resolve_polynomial_order(kernel.order())?;
    Ok(PolynomialBasis::new(discretization.nodeset.as_mat(), order))
}

/// `[Pᵀ 0]`, the polynomial moment rows.
fn moment_rows(basis: &PolynomialBasis, nodes: &NodeSet) -> Result<Mat<f64>> {
    let q = basis.len();
    let p = assembly::polynomial_matrix(basis, nodes)?;
    Ok(concat![[p.transpose().to_owned(), Mat::<f64>::zeros(q, q)]])
}

fn coordinates(row: RowRef<'_, f64>) -> Vec<f64> {
    row.iter().copied().collect()
}

/// Solves `L u = f(·, 0)` in the interior with `u = g(·, 0)` on the boundary.
///
/// Interior rows apply the operator and boundary rows evaluate the
/// expansion, so the system is not symmetric and is solved with LU.
pub fn solve_stationary(
    pde: &dyn PartialDifferentialEquation,
    discretization: &SpatialDiscretization,
    kernel: impl Into<Kernel>,
    settings: InterpolationSettings,
) -> Result<Interpolation> {
    let kernel = kernel.into();
    let basis = prepare(pde, discretization, &kernel, &settings)?;
    let centers = &discretization.nodeset;
    let threshold = settings.parallel_threshold;

    let interior_rows = assembly::operator_matrix(
        pde.operator(),
        &kernel,
        &basis,
        &discretization.interior,
        centers,
        threshold,
    )?;
    let boundary_rows =
        assembly::evaluation_matrix(&kernel, &basis, &discretization.boundary, centers, threshold)?;

    let mut system = match basis.is_empty() {
        true => concat![[interior_rows], [boundary_rows]],
        false => concat![[interior_rows], [boundary_rows], [moment_rows(&basis, centers)?]],
    };
    for i in 0..centers.len() {
        system[(i, i)] += settings.regularization;
    }

    let num_interior = discretization.interior.len();
    let rhs = Mat::from_fn(system.nrows(), 1, |i, _| {
        if i >= centers.len() {
            return 0.0;
        }
        let x = coordinates(centers.node(i));
        match i < num_interior {
            true => pde.rhs(&x, 0.0),
            false => discretization.boundary_value(&x, 0.0),
        }
    });

    Interpolation::solve_system(
        kernel,
        Arc::clone(centers),
        basis,
        system,
        false,
        rhs.as_ref(),
        settings,
        discretization.progress_callback.clone(),
    )
}

/// Method-of-lines form of a time-dependent PDE.
///
/// With `u(x, t) = Σ c_j(t) k(x, x_j) + Σ d_j(t) p_j(x)` the coefficients
/// obey `M c' = F(c, t)` where
///
/// ```text
/// F_i = f(x_i, t) - (L u)(x_i)   interior nodes
/// F_i = ∂_t g(x_i, t)            boundary nodes
/// F_i = 0                        moment rows
/// ```
///
/// `M` is factorized once on construction.
#[derive(Debug, Clone)]
pub struct Semidiscretization {
    pde: Arc<dyn PartialDifferentialEquation>,
    discretization: SpatialDiscretization,
    kernel: Kernel,
    basis: PolynomialBasis,
    settings: InterpolationSettings,

    /// Interpolation matrix over all nodes.
    mass_matrix: Arc<Mat<f64>>,

    /// `L` applied to every trial function at the interior nodes.
    operator_rows: Mat<f64>,

    solver: Arc<SystemSolver>,
}

impl Semidiscretization {
    pub fn new<P>(
        pde: P,
        discretization: SpatialDiscretization,
        kernel: impl Into<Kernel>,
        settings: InterpolationSettings,
    ) -> Result<Self>
    where
        P: PartialDifferentialEquation + 'static,
    {
        let kernel = kernel.into();
        let basis = prepare(&pde, &discretization, &kernel, &settings)?;
        let centers = &discretization.nodeset;

        let mass_matrix = assembly::system_matrix(
            &kernel,
            centers,
            &basis,
            settings.regularization,
            settings.parallel_threshold,
        )?;
        let operator_rows = assembly::operator_matrix(
            pde.operator(),
            &kernel,
            &basis,
            &discretization.interior,
            centers,
            settings.parallel_threshold,
        )?;

        let solver = factorize_system(
            mass_matrix.as_ref(),
            true,
            &settings,
            &discretization.progress_callback,
        )?;

        Ok(Self {
            pde: Arc::new(pde),
            discretization,
            kernel,
            basis,
            settings,
            mass_matrix: Arc::new(mass_matrix),
            operator_rows,
            solver: Arc::new(solver),
        })
    }

    /// Number of coefficients, nodes plus basis functions.
    pub fn len(&self) -> usize {
        self.mass_matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn discretization(&self) -> &SpatialDiscretization {
        &self.discretization
    }

    pub fn mass_matrix(&self) -> faer::MatRef<'_, f64> {
        Mat::as_ref(&self.mass_matrix)
    }

    fn solve_mass(&self, rhs: Mat<f64>) -> Result<Vec<f64>> {
        let solution = self.solver.solve(rhs.as_ref())?;
        Ok(solution.col(0).iter().copied().collect())
    }

    /// Coefficients interpolating `u0` at every node.
    pub fn initial_coefficients<F>(&self, u0: F) -> Result<Vec<f64>>
    where
        F: Fn(&[f64]) -> f64,
    {
        let centers = &self.discretization.nodeset;
        let rhs = Mat::from_fn(self.len(), 1, |i, _| match i < centers.len() {
            true => u0(&coordinates(centers.node(i))),
            false => 0.0,
        });
        self.solve_mass(rhs)
    }

    /// `c' = M⁻¹ F(c, t)`
    pub fn rhs(&self, c: &[f64], t: f64) -> Result<Vec<f64>> {
        ensure_dim(self.len(), c.len())?;

        let disc = &self.discretization;
        let num_interior = disc.interior.len();
        let num_nodes = disc.nodeset.len();

        let f = Mat::from_fn(self.len(), 1, |i, _| {
            if i >= num_nodes {
                return 0.0;
            }
            let x = coordinates(disc.nodeset.node(i));
            match i < num_interior {
                true => {
                    let lu: f64 = self
                        .operator_rows
                        .row(i)
                        .iter()
                        .zip(c)
                        .map(|(l, cj)| l * cj)
                        .sum();
                    self.pde.rhs(&x, t) - lu
                }
                false => disc.boundary_rate(&x, t),
            }
        });

        self.solve_mass(f)
    }

    /// `(c, t) ↦ c'` for an external time integrator.
    pub fn ode_function(&self) -> impl Fn(&[f64], f64) -> Result<Vec<f64>> + Send + Sync + '_ {
        move |c, t| self.rhs(c, t)
    }

    /// The function represented by coefficients `c`.
    pub fn interpolation(&self, c: &[f64]) -> Result<Interpolation> {
        ensure_dim(self.len(), c.len())?;
        Ok(Interpolation::from_coefficients(
            self.kernel.clone(),
            Arc::clone(&self.discretization.nodeset),
            self.basis.clone(),
            c.to_vec(),
            self.settings,
            Arc::clone(&self.mass_matrix),
            true,
            Arc::clone(&self.solver),
        ))
    }
}
