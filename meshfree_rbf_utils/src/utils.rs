/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for matrices, distances, and the kernel registry.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{RadialKernel, dual::RadialScalar, error::KernelResult};
use faer::{Mat, MatRef, RowRef};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Returns an owned `Mat<T>` from a subset of row indices.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use meshfree_rbf_utils::select_mat_rows;
///
/// let matrix = mat![
///     [0.0, 1.0],
///     [1.0, 1.0],
///     [2.0, 2.0],
///     [3.0, 3.0f64],
/// ];
///
/// let sub_matrix = select_mat_rows(&matrix, &[0usize, 2]);
///
/// assert_eq!(
///     sub_matrix,
///     mat![
///         [0.0, 1.0],
///         [2.0, 2.0f64],
///     ]
/// );
/// ```
#[inline(always)]
pub fn select_mat_rows<T>(existing_mat: &Mat<T>, row_indices: &[usize]) -> Mat<T>
where
    T: Clone,
{
    Mat::from_fn(row_indices.len(), existing_mat.ncols(), |i, j| {
        existing_mat.get(row_indices[i], j).clone()
    })
}

/// Generates the cartesian product of a slice of values repeated `num_columns` times.
///
/// The last column varies fastest.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use meshfree_rbf_utils::cartesian_product;
///
/// let values = vec![0, 1];
///
/// let result = cartesian_product(&values, 2);
///
/// assert_eq!(
///     result,
///     mat![
///         [0, 0],
///         [0, 1],
///         [1, 0],
///         [1, 1],
///     ]
/// );
/// ```
#[inline(always)]
pub fn cartesian_product<T>(values: &[T], num_columns: usize) -> Mat<T>
where
    T: Clone + Debug,
{
    let base = values.len();
    let total_rows = base.pow(num_columns as u32);

    Mat::from_fn(total_rows, num_columns, |i, j| {
        let index = (i / base.pow((num_columns - j - 1) as u32)) % base;
        values[index].clone()
    })
}

/// Returns the extents of a point array laid out as `[min_0, .., min_{d-1}, max_0, .., max_{d-1}]`.
///
/// Returns an empty vector for an empty point array.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use meshfree_rbf_utils::get_pointarray_extents;
///
/// let points = mat![
///     [1.0, -1.0],
///     [3.0, 2.0],
///     [0.5, 4.0f64]
/// ];
/// let extents = get_pointarray_extents(points.as_ref());
/// assert_eq!(extents, vec![0.5, -1.0, 3.0, 4.0]);
/// ```
#[inline(always)]
pub fn get_pointarray_extents<T>(points: MatRef<T>) -> Vec<T>
where
    T: PartialOrd + Clone,
{
    let ncols = points.ncols();

    if points.nrows() == 0 {
        return Vec::new();
    }

    // First half of the vector stores mins, second half stores maxs.
    let mut extents: Vec<T> = Vec::with_capacity(2 * ncols);
    for col in 0..ncols {
        extents.push(points.get(0, col).clone());
    }
    for col in 0..ncols {
        extents.push(points.get(0, col).clone());
    }

    for row in points.row_iter() {
        for (col, item) in row.iter().enumerate() {
            if item < &extents[col] {
                extents[col] = item.clone();
            }
            if item > &extents[col + ncols] {
                extents[col + ncols] = item.clone();
            }
        }
    }

    extents
}

/// Calculates the squared euclidean distance between two points.
#[inline(always)]
pub fn get_distance_sq(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}

/// Calculates the euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use meshfree_rbf_utils::get_distance;
///
/// let points = mat![
///     [1.0, 2.0],
///     [4.0, 6.0],
/// ];
///
/// let dist = get_distance(points.row(0), points.row(1));
///
/// assert_eq!(dist, 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    get_distance_sq(target, source).sqrt()
}

// Tagged dispatcher generated from the kernel registry below.
// Every registered type implements `RadialKernel`.
macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:ty) ),* $(,)? ] ) => {

        /// Runtime kernel selector built from the kernel registry.
        ///
        /// Serialises as an externally tagged enum, e.g.
        /// `{"Gauss": {"dim": 2, "shape_parameter": 1.0}}`.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub enum Kernel {
            $( $V($Kty), )*
        }

        impl RadialKernel for Kernel {
            #[inline(always)]
            fn phi<T: RadialScalar>(&self, r: T) -> T {
                match self {
                    $( Kernel::$V(k) => k.phi(r), )*
                }
            }

            fn order(&self) -> usize {
                match self {
                    $( Kernel::$V(k) => k.order(), )*
                }
            }

            fn dim(&self) -> usize {
                match self {
                    $( Kernel::$V(k) => k.dim(), )*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $( Kernel::$V(k) => k.name(), )*
                }
            }

            fn validate(&self) -> KernelResult<()> {
                match self {
                    $( Kernel::$V(k) => k.validate(), )*
                }
            }
        }

        $(
            impl From<$Kty> for Kernel {
                #[inline]
                fn from(kernel: $Kty) -> Self {
                    Kernel::$V(kernel)
                }
            }
        )*
    };
}

for_each_kernel! {
    registry = [
        (Gauss,                crate::kernels::GaussKernel),
        (Multiquadric,         crate::kernels::MultiquadricKernel),
        (InverseMultiquadric,  crate::kernels::InverseMultiquadricKernel),
        (PolyharmonicSpline,   crate::kernels::PolyharmonicSplineKernel),
        (ThinPlateSpline,      crate::kernels::ThinPlateSplineKernel),
        (Wendland,             crate::kernels::WendlandKernel),
        (Wu,                   crate::kernels::WuKernel),
        (RadialCharacteristic, crate::kernels::RadialCharacteristicKernel),
        (Matern12,             crate::kernels::Matern12Kernel),
        (Matern32,             crate::kernels::Matern32Kernel),
        (Matern52,             crate::kernels::Matern52Kernel),
        (Matern72,             crate::kernels::Matern72Kernel),
        (Matern,               crate::kernels::MaternKernel),
        (Riesz,                crate::kernels::RieszKernel),
        (Sum,                  crate::kernels::SumKernel),
        (Product,              crate::kernels::ProductKernel),
        (Transformation,       crate::kernels::TransformationKernel),
    ]
}
