/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the error taxonomy shared by node sets, interpolation and discretization.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use meshfree_rbf_utils::KernelError;
use thiserror::Error;

/// Errors returned by the public API.
///
/// Numerical routines never degrade silently: invalid dimensions, invalid
/// parameters and singular systems are reported to the caller immediately
/// and no partial result is returned.
#[derive(Debug, Error)]
pub enum RbfError {
    /// Inconsistent point, vector or kernel dimensions.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A parameter is outside its admissible range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Factorization of the system matrix failed.
    #[error("singular system: {0}")]
    SingularSystem(String),

    /// The requested operation is not available in this dimension.
    #[error("unsupported dimension: {0}")]
    UnsupportedDimension(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not parse number: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// The JSON `format` field does not match the expected model format.
    #[error("unsupported format {found:?} (expected {expected:?})")]
    FormatMismatch { found: String, expected: &'static str },

    /// The JSON `version` field does not match the supported version.
    #[error("unsupported version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

impl From<KernelError> for RbfError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::InvalidArgument(msg) => RbfError::InvalidArgument(msg),
            KernelError::DimensionMismatch { expected, found } => {
                RbfError::DimensionMismatch { expected, found }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RbfError>;

/// Fails with [`RbfError::DimensionMismatch`] unless `found == expected`.
#[inline]
pub(crate) fn ensure_dim(expected: usize, found: usize) -> Result<()> {
    match expected == found {
        true => Ok(()),
        false => Err(RbfError::DimensionMismatch { expected, found }),
    }
}
