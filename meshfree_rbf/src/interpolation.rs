/////////////////////////////////////////////////////////////////////////////////////////////
//
// Fits and evaluates kernel interpolants with polynomial augmentation.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Interpolation
//!
//! An [`Interpolation`] is the function
//!
//! ```text
//! s(x) = Σ_i c_i k(x, x_i) + Σ_j d_j p_j(x)
//! ```
//!
//! whose coefficients solve the saddle-point system
//!
//! ```text
//! [ A + λI  P ] [c]   [f]
//! [ Pᵀ      0 ] [d] = [0]
//! ```
//!
//! The trailing `Pᵀ c = 0` rows make `s` reproduce every polynomial in the
//! span of the basis. Once fitted an interpolant is immutable and can be
//! evaluated, differentiated and persisted.

use crate::{
    assembly,
    config::{Factorization, InterpolationSettings},
    error::{RbfError, Result, ensure_dim},
    linalg::SystemSolver,
    nodes::NodeSet,
    operators::{DifferentialOperator, PartialDerivative},
    polynomials::PolynomialBasis,
    progress::{ProgressMsg, ProgressSink, report},
};
use faer::{Mat, MatRef, RowRef};
use meshfree_rbf_utils::{Kernel, RadialKernel};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    sync::Arc,
    time::Instant,
};

/// Builder for an [`Interpolation`].
///
/// The builder should be called via the [`Interpolation::builder`] method.
pub struct InterpolationBuilder {
    nodeset: Arc<NodeSet>,
    values: Vec<f64>,
    kernel: Kernel,
    settings: InterpolationSettings,
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl InterpolationBuilder {
    fn new(nodeset: Arc<NodeSet>, values: Vec<f64>, kernel: Kernel) -> Self {
        Self {
            nodeset,
            values,
            kernel,
            settings: InterpolationSettings::default(),
            progress_callback: None,
        }
    }

    /// Sets the fit settings.
    pub fn settings(mut self, settings: InterpolationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Optional callback for reporting assembly and factorization progress.
    ///
    /// Skipped during serialization.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Assembles, factorizes and solves the interpolation system.
    pub fn build(self) -> Result<Interpolation> {
        Interpolation::fit(
            self.nodeset,
            self.values,
            self.kernel,
            self.settings,
            self.progress_callback,
        )
    }
}

/// A fitted kernel interpolant. See the [module docs](self).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InterpolationModel")]
pub struct Interpolation {
    kernel: Kernel,

    /// Kernel centers.
    nodeset: Arc<NodeSet>,

    basis: PolynomialBasis,

    /// Kernel coefficients followed by polynomial coefficients.
    coefficients: Vec<f64>,

    settings: InterpolationSettings,

    system_matrix: Arc<Mat<f64>>,

    /// Whether `system_matrix` is symmetric, which decides the factorization.
    symmetric: bool,

    #[serde(skip_serializing)]
    solver: Arc<SystemSolver>,

    #[serde(skip_serializing)]
    progress_callback: Option<Arc<dyn ProgressSink>>,
}

/// Serialized form of an [`Interpolation`]; the factorization is rebuilt on load.
#[derive(Deserialize)]
struct InterpolationModel {
    kernel: Kernel,
    nodeset: Arc<NodeSet>,
    basis: PolynomialBasis,
    coefficients: Vec<f64>,
    settings: InterpolationSettings,
    system_matrix: Arc<Mat<f64>>,
    symmetric: bool,
}

impl TryFrom<InterpolationModel> for Interpolation {
    type Error = RbfError;

    fn try_from(model: InterpolationModel) -> Result<Self> {
        model.kernel.validate()?;
        model.settings.validate()?;
        ensure_dim(model.kernel.dim(), model.nodeset.dim())?;
        ensure_dim(model.kernel.dim(), model.basis.dim())?;

        let size = model.nodeset.len() + model.basis.len();
        ensure_dim(size, model.coefficients.len())?;
        ensure_dim(size, model.system_matrix.nrows())?;
        ensure_dim(size, model.system_matrix.ncols())?;

        let solver = SystemSolver::new(
            Mat::as_ref(&model.system_matrix),
            model.settings.factorization,
            model.symmetric,
        )?;

        Ok(Self {
            kernel: model.kernel,
            nodeset: model.nodeset,
            basis: model.basis,
            coefficients: model.coefficients,
            settings: model.settings,
            system_matrix: model.system_matrix,
            symmetric: model.symmetric,
            solver: Arc::new(solver),
            progress_callback: None,
        })
    }
}

/// Factorizes a system matrix, reporting its size and the time taken.
pub(crate) fn factorize_system(
    system_matrix: MatRef<'_, f64>,
    symmetric: bool,
    settings: &InterpolationSettings,
    progress_callback: &Option<Arc<dyn ProgressSink>>,
) -> Result<SystemSolver> {
    let (rows, cols) = (system_matrix.nrows(), system_matrix.ncols());
    report(progress_callback, ProgressMsg::SystemAssembled { rows, cols });

    let factor_start = Instant::now();
    let solver = SystemSolver::new(system_matrix, settings.factorization, symmetric)?;
    let elapsed_ms = factor_start.elapsed().as_secs_f64() * 1e3;
    report(
        progress_callback,
        ProgressMsg::Factorized {
            method: format!("{:?}", solver.method()),
            elapsed_ms,
        },
    );
    Ok(solver)
}

/// Fits an interpolant with default [`InterpolationSettings`].
pub fn interpolate(
    nodeset: impl Into<Arc<NodeSet>>,
    values: impl Into<Vec<f64>>,
    kernel: impl Into<Kernel>,
) -> Result<Interpolation> {
    Interpolation::builder(nodeset, values, kernel).build()
}

impl Interpolation {
    /// Creates a new [`InterpolationBuilder`].
    ///
    /// This is the way to fit an interpolant.
    pub fn builder(
        nodeset: impl Into<Arc<NodeSet>>,
        values: impl Into<Vec<f64>>,
        kernel: impl Into<Kernel>,
    ) -> InterpolationBuilder {
        InterpolationBuilder::new(nodeset.into(), values.into(), kernel.into())
    }

    fn fit(
        nodeset: Arc<NodeSet>,
        values: Vec<f64>,
        kernel: Kernel,
        settings: InterpolationSettings,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self> {
        kernel.validate()?;
        settings.validate()?;
        ensure_dim(kernel.dim(), nodeset.dim())?;
        ensure_dim(nodeset.len(), values.len())?;
        if nodeset.is_empty() {
            return Err(RbfError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(RbfError::InvalidArgument(format!(
                "interpolation values must be finite, got {v}"
            )));
        }

        let order = settings.resolve_polynomial_order(kernel.order())?;
        let basis = PolynomialBasis::new(nodeset.as_mat(), order);

        let system_matrix = assembly::system_matrix(
            &kernel,
            &nodeset,
            &basis,
            settings.regularization,
            settings.parallel_threshold,
        )?;

        let n = nodeset.len();
        let rhs = Mat::from_fn(system_matrix.nrows(), 1, |i, _| match i < n {
            true => values[i],
            false => 0.0,
        });

        Self::solve_system(
            kernel,
            nodeset,
            basis,
            system_matrix,
            true,
            rhs.as_ref(),
            settings,
            progress_callback,
        )
    }

    /// Factorizes an assembled system and solves for the coefficients.
    ///
    /// The kernel columns of `system_matrix` belong to the nodes of `nodeset`
    /// in order, followed by one column per basis function.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn solve_system(
        kernel: Kernel,
        nodeset: Arc<NodeSet>,
        basis: PolynomialBasis,
        system_matrix: Mat<f64>,
        symmetric: bool,
        rhs: MatRef<'_, f64>,
        settings: InterpolationSettings,
        progress_callback: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self> {
        ensure_dim(nodeset.len() + basis.len(), system_matrix.ncols())?;
        log::debug!(
            "{} nodes, {} kernel, polynomial order {}",
            nodeset.len(),
            kernel.name(),
            basis.order()
        );

        let solver = factorize_system(
            system_matrix.as_ref(),
            symmetric,
            &settings,
            &progress_callback,
        )?;
        let solution = solver.solve(rhs)?;
        let coefficients = solution.col(0).iter().copied().collect();

        let mut interpolation = Self::from_coefficients(
            kernel,
            nodeset,
            basis,
            coefficients,
            settings,
            Arc::new(system_matrix),
            symmetric,
            Arc::new(solver),
        );
        interpolation.progress_callback = progress_callback;
        Ok(interpolation)
    }

    /// Wraps already solved coefficients. The caller guarantees consistent sizes.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_coefficients(
        kernel: Kernel,
        nodeset: Arc<NodeSet>,
        basis: PolynomialBasis,
        coefficients: Vec<f64>,
        settings: InterpolationSettings,
        system_matrix: Arc<Mat<f64>>,
        symmetric: bool,
        solver: Arc<SystemSolver>,
    ) -> Self {
        Self {
            kernel,
            nodeset,
            basis,
            coefficients,
            settings,
            system_matrix,
            symmetric,
            solver,
            progress_callback: None,
        }
    }

    pub fn dim(&self) -> usize {
        self.nodeset.dim()
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The kernel centers.
    pub fn nodeset(&self) -> &NodeSet {
        &self.nodeset
    }

    pub fn polynomial_basis(&self) -> &PolynomialBasis {
        &self.basis
    }

    pub fn settings(&self) -> &InterpolationSettings {
        &self.settings
    }

    /// Polynomial order: highest monomial degree plus one, `0` without a basis.
    pub fn order(&self) -> usize {
        self.basis.order()
    }

    /// All coefficients, kernel part first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn kernel_coefficients(&self) -> &[f64] {
        &self.coefficients[..self.nodeset.len()]
    }

    pub fn polynomial_coefficients(&self) -> &[f64] {
        &self.coefficients[self.nodeset.len()..]
    }

    /// The assembled system matrix.
    pub fn system_matrix(&self) -> MatRef<'_, f64> {
        Mat::as_ref(&self.system_matrix)
    }

    /// The factorized system matrix.
    pub fn solver(&self) -> &SystemSolver {
        &self.solver
    }

    /// Factorization that was applied to the system matrix.
    pub fn factorization(&self) -> Factorization {
        self.solver.method()
    }

    /// Native-space norm of the kernel part, `sqrt(cᵀ A c)`.
    pub fn kernel_norm(&self) -> f64 {
        let c = self.kernel_coefficients();
        let n = c.len();
        let quadratic: f64 = (0..n)
            .map(|i| {
                let xi = self.nodeset.node(i);
                c[i] * (0..n)
                    .map(|j| c[j] * self.kernel.evaluate(xi, self.nodeset.node(j)))
                    .sum::<f64>()
            })
            .sum();
        quadratic.max(0.0).sqrt()
    }

    #[inline]
    fn value_at(&self, x: RowRef<'_, f64>) -> f64 {
        let c = self.kernel_coefficients();
        let kernel_part: f64 = self
            .nodeset
            .iter()
            .zip(c)
            .map(|(center, ci)| ci * self.kernel.evaluate(x, center))
            .sum();
        let poly_part: f64 = self
            .polynomial_coefficients()
            .iter()
            .enumerate()
            .map(|(j, dj)| dj * self.basis.value(j, x))
            .sum();
        kernel_part + poly_part
    }

    /// Evaluates the interpolant at one point.
    pub fn evaluate_point(&self, x: &[f64]) -> Result<f64> {
        ensure_dim(self.dim(), x.len())?;
        Ok(self.value_at(RowRef::from_slice(x)))
    }

    /// Evaluates a one-dimensional interpolant at a scalar.
    pub fn evaluate_scalar(&self, x: f64) -> Result<f64> {
        ensure_dim(self.dim(), 1)?;
        Ok(self.value_at(RowRef::from_slice(&[x])))
    }

    /// Evaluates the interpolant at every node of `points`.
    pub fn evaluate(&self, points: &NodeSet) -> Result<Vec<f64>> {
        ensure_dim(self.dim(), points.dim())?;
        Ok(self.evaluate_rows(points))
    }

    /// Evaluates the interpolant at its own centers.
    pub fn evaluate_at_nodes(&self) -> Vec<f64> {
        self.evaluate_rows(&self.nodeset)
    }

    fn evaluate_rows(&self, points: &NodeSet) -> Vec<f64> {
        let m = points.len();
        match m >= self.settings.parallel_threshold {
            true => (0..m)
                .into_par_iter()
                .map(|i| self.value_at(points.node(i)))
                .collect(),
            false => points.iter().map(|x| self.value_at(x)).collect(),
        }
    }

    /// Applies a differential operator to the interpolant at `x`.
    ///
    /// Fails when the result is not finite, e.g. the Laplacian of a thin
    /// plate spline interpolant evaluated at one of its nodes.
    pub fn evaluate_operator(&self, operator: &dyn DifferentialOperator, x: &[f64]) -> Result<f64> {
        ensure_dim(self.dim(), x.len())?;
        operator.validate(self.dim())?;

        let x = RowRef::from_slice(x);
        let kernel_part: f64 = self
            .nodeset
            .iter()
            .zip(self.kernel_coefficients())
            .map(|(center, ci)| ci * operator.apply(&self.kernel, x, center))
            .sum();
        let poly_part: f64 = self
            .polynomial_coefficients()
            .iter()
            .enumerate()
            .map(|(j, dj)| dj * operator.apply_polynomial(&self.basis, j, x))
            .sum();

        let value = kernel_part + poly_part;
        match value.is_finite() {
            true => Ok(value),
            false => Err(RbfError::InvalidArgument(format!(
                "{operator:?} of a {} interpolant is undefined at {x:?}",
                self.kernel.name()
            ))),
        }
    }

    /// Gradient of the interpolant at `x`.
    pub fn gradient(&self, x: &[f64]) -> Result<Vec<f64>> {
        (0..self.dim())
            .map(|i| self.evaluate_operator(&PartialDerivative::new(i), x))
            .collect()
    }

    /// Save this interpolant to a **JSON envelope** `{ format, version, model }`.
    ///
    /// Files produced here are intended to be read back with
    /// [`Interpolation::load_model`].
    ///
    /// ### Example
    /// ```no_run
    /// # use meshfree_rbf::Interpolation;
    /// # let itp: Interpolation = unimplemented!();
    /// itp.save_model("model.json")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);

        let env = JsonEnvelopeRef {
            format: JSON_FORMAT_NAME,
            version: JSON_VERSION,
            model: self,
        };

        serde_json::to_writer_pretty(&mut w, &env)?;
        w.flush()?;
        Ok(())
    }

    /// Load an interpolant from a versioned **JSON envelope**, validating
    /// format and version and refactorizing the system matrix.
    ///
    /// If `progress` is `Some`, it is installed on the returned model.
    pub fn load_model<P: AsRef<Path>>(
        path: P,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let env: JsonEnvelopeOwned<serde_json::Value> = serde_json::from_reader(reader)?;

        if env.format != JSON_FORMAT_NAME {
            return Err(RbfError::FormatMismatch {
                found: env.format,
                expected: JSON_FORMAT_NAME,
            });
        }

        if env.version != JSON_VERSION {
            return Err(RbfError::VersionMismatch {
                found: env.version,
                expected: JSON_VERSION,
            });
        }

        let mut model: Self = serde_json::from_value(env.model)?;
        model.progress_callback = progress;
        Ok(model)
    }
}

const JSON_FORMAT_NAME: &str = "meshfree_rbf.json";
const JSON_VERSION: u32 = 1;

/// Borrowing envelope for SAVE (no clone of the model).
#[derive(Serialize)]
struct JsonEnvelopeRef<'a, T: ?Sized> {
    format: &'static str,
    version: u32,
    #[serde(flatten)]
    model: &'a T,
}

/// Owning envelope for LOAD.
#[derive(Deserialize)]
struct JsonEnvelopeOwned<T> {
    format: String,
    version: u32,
    #[serde(flatten)]
    model: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generators, operators::Laplacian, progress::closure_sink};
    use equator::assert;
    use faer::{concat, linalg::solvers::Solve, utils::approx::*};
    use meshfree_rbf_utils::kernels::*;
    use std::sync::Mutex;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("meshfree_rbf_{}_{name}", std::process::id()))
    }

    fn phs3(dim: usize) -> Kernel {
        PolyharmonicSplineKernel::new(dim, 3).unwrap().into()
    }

    fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn sine_on_random_nodes_is_reproduced() {
        let nodes = generators::random_in_hypercube(10, 1, 0.0, 1.0, Some(42)).unwrap();
        let values: Vec<f64> = nodes.iter().map(|x| x[0].sin()).collect();
        let kernel = GaussKernel::new(1, 8.0).unwrap();

        let itp = interpolate(nodes.clone(), values.clone(), kernel).unwrap();

        assert!(itp.order() == 0);
        assert!(itp.polynomial_coefficients().is_empty());
        assert!(itp.factorization() == Factorization::SymmetricIndefinite);
        assert!(max_abs_diff(&itp.evaluate_at_nodes(), &values) <= 1e-10);

        let x0 = nodes.node(3)[0];
        assert!((itp.evaluate_scalar(x0).unwrap() - x0.sin()).abs() <= 1e-10);
    }

    #[test]
    fn cubic_spline_error_decreases_under_refinement() {
        let error = |n: usize| {
            let nodes = generators::grid_in_hypercube(n, 1, 0.0, 1.0).unwrap();
            let values: Vec<f64> = nodes.iter().map(|x| x[0].sin()).collect();
            let itp = interpolate(nodes, values, phs3(1)).unwrap();

            let target = generators::grid_in_hypercube(97, 1, 0.0, 1.0).unwrap();
            let exact: Vec<f64> = target.iter().map(|x| x[0].sin()).collect();
            max_abs_diff(&itp.evaluate(&target).unwrap(), &exact)
        };

        let coarse = error(11);
        let fine = error(41);
        assert!(coarse < 1e-2);
        assert!(fine < coarse / 4.0);
    }

    #[test]
    fn coefficients_match_naive_saddle_point_solve() {
        let nodes = generators::random_in_hypercube(20, 2, -1.0, 2.0, Some(7)).unwrap();
        let values: Vec<f64> = nodes.iter().map(|x| (x[0] * x[1]).cos()).collect();
        let kernel = phs3(2);

        let itp = interpolate(nodes.clone(), values.clone(), kernel.clone()).unwrap();
        let basis = itp.polynomial_basis();
        let (n, q) = (nodes.len(), basis.len());
        assert!(q == 3);

        let a = Mat::from_fn(n, n, |i, j| kernel.evaluate(nodes.node(i), nodes.node(j)));
        let p = Mat::from_fn(n, q, |i, j| basis.value(j, nodes.node(i)));
        let system = concat![[a, p.clone()], [p.transpose().to_owned(), Mat::<f64>::zeros(q, q)]];
        let rhs = Mat::from_fn(n + q, 1, |i, _| if i < n { values[i] } else { 0.0 });

        let expected = system.partial_piv_lu().solve(&rhs);
        let found = Mat::from_fn(n + q, 1, |i, _| itp.coefficients()[i]);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1e6 * ((n + q) as f64));
        assert!(&found ~ &expected);

        // Pᵀ c = 0
        for j in 0..q {
            let moment: f64 = (0..n).map(|i| p[(i, j)] * itp.kernel_coefficients()[i]).sum();
            assert!(moment.abs() < 1e-9);
        }
    }

    #[test]
    fn polynomials_are_reproduced_everywhere() {
        let nodes = generators::random_in_hypercube(25, 2, 0.0, 1.0, Some(11)).unwrap();
        let linear = |x: RowRef<f64>| 1.0 + 2.0 * x[0] - 3.0 * x[1];
        let values: Vec<f64> = nodes.iter().map(linear).collect();

        let kernel = ThinPlateSplineKernel::new(2).unwrap();
        let itp = interpolate(nodes, values, kernel).unwrap();
        assert!(itp.order() == 2);

        let targets = generators::random_in_hypercube(50, 2, -0.5, 1.5, Some(12)).unwrap();
        let exact: Vec<f64> = targets.iter().map(linear).collect();
        assert!(max_abs_diff(&itp.evaluate(&targets).unwrap(), &exact) < 1e-9);

        let grad = itp.gradient(&[0.3, 0.8]).unwrap();
        assert!(max_abs_diff(&grad, &[2.0, -3.0]) < 1e-8);
        assert!(itp.evaluate_operator(&Laplacian::new(2), &[0.3, 0.8]).unwrap().abs() < 1e-7);
        assert!(itp.kernel_norm() < 1e-6);

        // r^2 log r has no second derivative at its centers.
        let node: Vec<f64> = itp.nodeset().node(3).iter().copied().collect();
        assert!(matches!(
            itp.evaluate_operator(&Laplacian::new(2), &node),
            Err(RbfError::InvalidArgument(_))
        ));
        assert!(max_abs_diff(&itp.gradient(&node).unwrap(), &[2.0, -3.0]) < 1e-8);
    }

    #[test]
    fn higher_polynomial_order_reproduces_quadratics() {
        let nodes = generators::random_in_hypercube(30, 2, 0.0, 1.0, Some(5)).unwrap();
        let quadratic = |x: RowRef<f64>| x[0] * x[0] - x[0] * x[1] + 0.5;
        let values: Vec<f64> = nodes.iter().map(quadratic).collect();

        let settings = InterpolationSettings::builder()
            .polynomial_order(3)
            .build()
            .unwrap();
        let itp = Interpolation::builder(nodes, values, phs3(2))
            .settings(settings)
            .build()
            .unwrap();

        assert!(itp.order() == 3);
        assert!(itp.polynomial_coefficients().len() == 6);
        let x = [0.25, 0.75];
        assert!((itp.evaluate_point(&x).unwrap() - quadratic(RowRef::from_slice(&x))).abs() < 1e-9);
    }

    #[test]
    fn l_shaped_domain() {
        let square = generators::grid_in_hypercube(11, 2, 0.0, 1.0).unwrap();
        let corner = generators::grid_in_hypercube(6, 2, 0.5, 1.0).unwrap();
        let square_boundary = generators::grid_on_hypercube_boundary(11, 2, 0.0, 1.0).unwrap();

        let tol = 1e-10;
        let domain = square.setdiff(&corner, tol).unwrap();
        let boundary = square_boundary.setdiff(&corner, tol).unwrap();
        let interior = domain.setdiff(&boundary, tol).unwrap();

        assert!(domain.len() == 121 - 36);
        assert!(interior.setdiff(&boundary, tol).unwrap().len() == interior.len());
        for x in interior.iter() {
            assert!(!(x[0] > 0.5 - tol && x[1] > 0.5 - tol));
        }

        let merged = NodeSet::merge([&interior, &boundary, &boundary]).unwrap();
        let nodes = merged.unique(tol).unwrap();
        assert!(nodes.len() == interior.len() + boundary.len());
        assert!(nodes.separation_distance() > 0.04);

        let f = |x: RowRef<f64>| x[0].exp() * x[1].cos();
        let values: Vec<f64> = nodes.iter().map(f).collect();
        let itp = interpolate(nodes, values.clone(), phs3(2)).unwrap();

        assert!(max_abs_diff(&itp.evaluate_at_nodes(), &values) < 1e-8);
        let target = [0.25, 0.35];
        assert!((itp.evaluate_point(&target).unwrap() - f(RowRef::from_slice(&target))).abs() < 1e-2);
    }

    #[test]
    fn regularization_trades_exactness_for_smoothness() {
        let nodes = generators::random_in_hypercube(15, 2, 0.0, 1.0, Some(3)).unwrap();
        let values: Vec<f64> = nodes.iter().map(|x| x[0] + x[1] * x[1]).collect();
        let lambda = 0.1;

        let settings = InterpolationSettings::builder()
            .regularization(lambda)
            .build()
            .unwrap();
        let itp = Interpolation::builder(nodes, values.clone(), Matern52Kernel::new(2, 2.0).unwrap())
            .settings(settings)
            .build()
            .unwrap();

        // (A + λI) c = f  ⇒  f_i - s(x_i) = λ c_i
        let fitted = itp.evaluate_at_nodes();
        for i in 0..values.len() {
            let expected = lambda * itp.kernel_coefficients()[i];
            assert!((values[i] - fitted[i] - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn single_node_kernel_norm() {
        let nodes = NodeSet::from_rows(&[[0.2, 0.4]]).unwrap();
        let itp = interpolate(nodes, [-3.0], GaussKernel::new(2, 1.0).unwrap()).unwrap();
        assert!((itp.kernel_norm() - 3.0).abs() < 1e-14);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let nodes = generators::grid_in_hypercube(3, 2, 0.0, 1.0).unwrap();
        let values = vec![1.0; 9];

        assert!(matches!(
            interpolate(nodes.clone(), values.clone(), GaussKernel::new(3, 1.0).unwrap()),
            Err(RbfError::DimensionMismatch { expected: 3, found: 2 })
        ));
        assert!(matches!(
            interpolate(nodes.clone(), vec![1.0; 8], GaussKernel::new(2, 1.0).unwrap()),
            Err(RbfError::DimensionMismatch { expected: 9, found: 8 })
        ));

        let settings = InterpolationSettings::builder()
            .polynomial_order(1)
            .build()
            .unwrap();
        assert!(matches!(
            Interpolation::builder(nodes.clone(), values.clone(), phs3(2))
                .settings(settings)
                .build(),
            Err(RbfError::InvalidArgument(_))
        ));

        let itp = interpolate(nodes, values, GaussKernel::new(2, 1.0).unwrap()).unwrap();
        assert!(itp.evaluate_point(&[0.5]).is_err());
        assert!(itp.evaluate_scalar(0.5).is_err());
    }

    #[test]
    fn duplicate_nodes_make_the_system_singular() {
        let nodes = NodeSet::from_rows(&[[0.0, 0.0], [1.0, 0.5], [0.0, 0.0], [0.3, 0.9]]).unwrap();
        let result = interpolate(nodes, [1.0, 2.0, 3.0, 4.0], GaussKernel::new(2, 1.0).unwrap());
        assert!(matches!(result, Err(RbfError::SingularSystem(_))));
    }

    #[test]
    fn collinear_nodes_make_the_system_singular() {
        // Linear polynomials are not unisolvent on a line.
        let nodes =
            NodeSet::from_rows(&[[0.0, 0.0], [0.25, 0.25], [0.5, 0.5], [1.0, 1.0]]).unwrap();
        let result = interpolate(nodes, [1.0, 0.0, 2.0, -1.0], ThinPlateSplineKernel::new(2).unwrap());
        assert!(matches!(result, Err(RbfError::SingularSystem(_))));
    }

    #[test]
    fn progress_is_reported() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&received);
        let (sink, handle) = closure_sink(16, move |msg| {
            if let Ok(mut v) = store.lock() {
                v.push(msg);
            }
        });

        let nodes = generators::grid_in_hypercube(4, 2, 0.0, 1.0).unwrap();
        let itp = Interpolation::builder(nodes, vec![1.0; 16], phs3(2))
            .progress_callback(sink.clone())
            .build()
            .unwrap();
        drop(itp);
        drop(sink);
        handle.join().unwrap();

        let received = received.lock().unwrap();
        assert!(received[0] == ProgressMsg::SystemAssembled { rows: 19, cols: 19 });
        assert!(matches!(&received[1], ProgressMsg::Factorized { method, .. } if method == "SymmetricIndefinite"));
    }

    #[test]
    fn model_survives_save_and_load() {
        let nodes = generators::random_in_hypercube(12, 2, 0.0, 1.0, Some(8)).unwrap();
        let values: Vec<f64> = nodes.iter().map(|x| x[0].sin() + x[1]).collect();
        let itp = interpolate(nodes, values, phs3(2)).unwrap();

        let path = temp_path("model.json");
        itp.save_model(&path).unwrap();
        let loaded = Interpolation::load_model(&path, None);
        let _ = std::fs::remove_file(&path);
        let loaded = loaded.unwrap();

        assert!(loaded.kernel() == itp.kernel());
        assert!(loaded.order() == itp.order());
        assert!(loaded.factorization() == itp.factorization());

        let targets = generators::random_in_hypercube(20, 2, 0.0, 1.0, Some(9)).unwrap();
        let before = itp.evaluate(&targets).unwrap();
        let after = loaded.evaluate(&targets).unwrap();
        assert!(max_abs_diff(&before, &after) < 1e-12);
    }

    #[test]
    fn foreign_model_files_are_rejected() {
        let path = temp_path("foreign.json");
        std::fs::write(&path, r#"{"format": "other.json", "version": 1}"#).unwrap();
        let result = Interpolation::load_model(&path, None);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(RbfError::FormatMismatch { .. })));
    }
}
