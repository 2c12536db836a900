/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for fitting interpolants and assembling collocation systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for fitting interpolants and assembling collocation systems.
use crate::error::{RbfError, Result};
use serde::{Deserialize, Serialize};

/// Dense factorization used for the system matrix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Factorization {
    /// Symmetric indefinite (Bunch-Kaufman LBLᵀ) for symmetric systems,
    /// partial-pivoting LU otherwise.
    #[default]
    Auto,

    /// Always use Bunch-Kaufman LBLᵀ. Only valid for symmetric systems.
    SymmetricIndefinite,

    /// Always use partial-pivoting LU.
    Lu,
}

/// Settings used when fitting an [`Interpolation`](crate::Interpolation) or
/// discretizing a PDE.
///
/// ### Default Values
/// - `polynomial_order`: `None` (the kernel's own order)
/// - `regularization`: `0.0`
/// - `parallel_threshold`: `256`
/// - `factorization`: [`Factorization::Auto`]
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct InterpolationSettings {
    /// Polynomial order `m`: the basis holds all monomials of total degree
    /// `< m`. Must not be below the kernel's order.
    pub polynomial_order: Option<usize>,

    /// Non-negative value added to the diagonal of the kernel block.
    /// `0.0` interpolates exactly; positive values smooth the fit.
    pub regularization: f64,

    /// Number of nodes from which matrix assembly is parallelised.
    pub parallel_threshold: usize,

    /// Dense factorization to use.
    pub factorization: Factorization,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        InterpolationSettings {
            polynomial_order: None,
            regularization: 0.0,
            parallel_threshold: 256,
            factorization: Factorization::Auto,
        }
    }
}

impl InterpolationSettings {
    /// Returns a new [`InterpolationSettingsBuilder`] populated with defaults.
    pub fn builder() -> InterpolationSettingsBuilder {
        InterpolationSettingsBuilder {
            settings: InterpolationSettings::default(),
        }
    }

    /// Checks that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.regularization.is_finite() && self.regularization >= 0.0) {
            return Err(RbfError::InvalidArgument(format!(
                "regularization must be finite and non-negative, got {}",
                self.regularization
            )));
        }
        Ok(())
    }

    /// Resolves the polynomial order against the kernel's requirement.
    pub(crate) fn resolve_polynomial_order(&self, kernel_order: usize) -> Result<usize> {
        match self.polynomial_order {
            None => Ok(kernel_order),
            Some(order) if order >= kernel_order => Ok(order),
            Some(order) => Err(RbfError::InvalidArgument(format!(
                "polynomial order {order} is below the kernel's required order {kernel_order}"
            ))),
        }
    }
}

/// Builder for [`InterpolationSettings`].
///
/// The builder should be called via the [`InterpolationSettings::builder`] method.
#[derive(Debug, Clone)]
pub struct InterpolationSettingsBuilder {
    settings: InterpolationSettings,
}

impl InterpolationSettingsBuilder {
    /// Sets the polynomial order.
    pub fn polynomial_order(mut self, polynomial_order: usize) -> Self {
        self.settings.polynomial_order = Some(polynomial_order);
        self
    }

    /// Sets the diagonal regularization.
    pub fn regularization(mut self, regularization: f64) -> Self {
        self.settings.regularization = regularization;
        self
    }

    /// Sets the node count from which assembly runs in parallel.
    pub fn parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.settings.parallel_threshold = parallel_threshold;
        self
    }

    /// Sets the factorization.
    pub fn factorization(mut self, factorization: Factorization) -> Self {
        self.settings.factorization = factorization;
        self
    }

    /// Validates and returns the settings.
    pub fn build(self) -> Result<InterpolationSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
