/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernel utilities, dual numbers, and helper functions used across the meshfree_rbf crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Kernels and utilities for the [`meshfree_rbf`] crate
//!
//! Every kernel is a radial profile `phi(r)` written once over
//! [`RadialScalar`], so the same code yields kernel values (`f64`) and exact
//! first and second radial derivatives ([`Dual2`]) for collocation.
mod combinators;
mod dual;
mod error;
mod rbf_kernels;
mod special;
mod traits;
mod utils;

/// Implemented kernels and combinators.
pub mod kernels {
    pub use super::combinators::*;
    pub use super::rbf_kernels::*;
}

pub use {
    dual::{Dual2, RadialScalar},
    error::{KernelError, KernelResult},
    special::{bessel_k, bessel_k_scaled, ln_gamma},
    traits::RadialKernel,
    utils::{
        Kernel, cartesian_product, get_distance, get_distance_sq, get_pointarray_extents,
        select_mat_rows,
    },
};
