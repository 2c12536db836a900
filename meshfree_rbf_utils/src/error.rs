/////////////////////////////////////////////////////////////////////////////////////////////
//
// Error type for kernel construction and validation.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use thiserror::Error;

/// Errors raised while constructing or validating a kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// A parameter is outside the admissible range for the kernel.
    #[error("invalid kernel argument: {0}")]
    InvalidArgument(String),

    /// Child kernels (or kernel and points) disagree on the spatial dimension.
    #[error("kernel dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

pub type KernelResult<T> = std::result::Result<T, KernelError>;

/// Rejects non-positive or non-finite shape parameters.
pub(crate) fn check_positive(name: &str, value: f64) -> KernelResult<()> {
    match value.is_finite() && value > 0.0 {
        true => Ok(()),
        false => Err(KernelError::InvalidArgument(format!(
            "{name} must be positive and finite, got {value}"
        ))),
    }
}

pub(crate) fn check_dim(dim: usize) -> KernelResult<()> {
    match dim {
        0 => Err(KernelError::InvalidArgument(
            "kernel dimension must be at least 1".to_string(),
        )),
        _ => Ok(()),
    }
}
