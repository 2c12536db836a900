/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for meshfree kernel methods.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Meshfree kernel interpolation and PDE collocation.
//!
//! Scattered data `f_i` at nodes `x_i` is interpolated by
//!
//! ```text
//! s(x) = Σ_i c_i k(x, x_i) + Σ_j d_j p_j(x)
//! ```
//!
//! where `k` is a radial kernel from [`meshfree_rbf_utils`] and `p_j` are
//! monomials up to the degree the kernel needs for a uniquely solvable
//! system. Systems are dense and solved directly with
//! [`faer`](https://docs.rs/faer/latest/faer/), so the crate targets node
//! counts in the thousands rather than millions.
//!
//! The same machinery discretizes linear PDEs by collocation: interior rows
//! apply a [`DifferentialOperator`](operators::DifferentialOperator) to the
//! kernel exactly, boundary rows impose Dirichlet data. Stationary problems
//! are solved directly and time-dependent problems are reduced to an ODE for
//! the coefficients.
//!
//! # Features
//! - Node sets with a cached separation distance, set operations and
//!   generators for hypercubes and hyperspheres in any dimension
//! - Gaussian, multiquadric, polyharmonic, Wendland, Wu, Matérn and Riesz
//!   kernels, plus sum, product and scaling combinators
//! - Exact derivatives through dual numbers, no finite differences
//! - Symmetric indefinite (`LBLᵀ`) and `LU` factorizations with singularity checks
//! - Parallel matrix assembly with [`rayon`](https://docs.rs/rayon)
//! - JSON persistence of fitted models
//!
//! # Examples
//!
//! ```
//! use meshfree_rbf::{generators, interpolate};
//! use meshfree_rbf_utils::kernels::GaussKernel;
//!
//! // Ten random nodes in the unit interval
//! let nodes = generators::random_in_hypercube(10, 1, 0.0, 1.0, Some(42))?;
//! let values: Vec<f64> = nodes.iter().map(|x| x[0].sin()).collect();
//!
//! // Pure kernel interpolation, no polynomial part
//! let kernel = GaussKernel::new(1, 8.0)?;
//! let itp = interpolate(nodes, values.clone(), kernel)?;
//!
//! // The interpolant reproduces the data
//! let max_diff = itp
//!     .evaluate_at_nodes()
//!     .iter()
//!     .zip(&values)
//!     .fold(0.0_f64, |acc, (a, b)| acc.max((a - b).abs()));
//!
//! assert!(max_diff < 1e-10);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # References
//! 1.  Fasshauer, G., 2007. Meshfree Approximation Methods with Matlab. World Scientific Publishing Co.
//! 2.  Wendland, H., 2004. Scattered Data Approximation. Cambridge University Press.
//! 3.  Kansa, E. J., 1990. Multiquadrics - A scattered data approximation scheme with
//!     applications to computational fluid-dynamics. Computers & Mathematics with
//!     Applications, 19(8-9):147-161.
mod common;

mod error;

mod kdtree;

mod linalg;

mod nodes;

mod polynomials;

mod interpolation;

mod discretization;

pub mod assembly;

pub mod config;

pub mod generators;

pub mod operators;

pub mod progress;

pub use {
    common::{
        create_evaluation_grid, csv_to_nodeset, get_cheb_cube_scaling_factors,
        nodeset_to_csv, scale_points,
    },
    config::{Factorization, InterpolationSettings, InterpolationSettingsBuilder},
    discretization::{
        AdvectionDiffusionEquation, EllipticEquation, HeatEquation, PartialDifferentialEquation,
        PoissonEquation, Semidiscretization, SpaceTimeFn, SpatialDiscretization,
        solve_stationary,
    },
    error::{RbfError, Result},
    interpolation::{Interpolation, InterpolationBuilder, interpolate},
    linalg::{Lblt, SystemSolver},
    nodes::NodeSet,
    polynomials::{PolynomialBasis, basis_size},
};
