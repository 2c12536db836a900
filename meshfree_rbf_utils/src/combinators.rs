/////////////////////////////////////////////////////////////////////////////////////////////
//
// Kernel combinators: pointwise sums, products and affine rescalings of kernels.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    Kernel, RadialKernel,
    dual::RadialScalar,
    error::{KernelError, KernelResult, check_positive},
};
use serde::{Deserialize, Serialize};

fn check_children(kernels: &[Kernel]) -> KernelResult<()> {
    let first = kernels.first().ok_or_else(|| {
        KernelError::InvalidArgument("a combined kernel needs at least one child".to_string())
    })?;

    let dim = first.dim();
    for kernel in kernels {
        kernel.validate()?;
        if kernel.dim() != dim {
            return Err(KernelError::DimensionMismatch {
                expected: dim,
                found: kernel.dim(),
            });
        }
    }

    Ok(())
}

/// Pointwise sum `k(x, y) = Σ k_i(x, y)`.
///
/// Requires the largest polynomial order of its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SumKernel {
    pub kernels: Vec<Kernel>,
}

impl SumKernel {
    pub fn new(kernels: Vec<Kernel>) -> KernelResult<Self> {
        check_children(&kernels)?;
        Ok(Self { kernels })
    }
}

impl RadialKernel for SumKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        self.kernels
            .iter()
            .fold(T::constant(0.0), |acc, k| acc + k.phi(r))
    }

    fn order(&self) -> usize {
        self.kernels.iter().map(|k| k.order()).max().unwrap_or(0)
    }

    fn dim(&self) -> usize {
        self.kernels.first().map_or(0, |k| k.dim())
    }

    fn name(&self) -> &'static str {
        "SumKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_children(&self.kernels)
    }
}

/// Pointwise product `k(x, y) = Π k_i(x, y)`.
///
/// Requires the sum of its children's polynomial orders. This is conservative:
/// a product of positive definite kernels stays positive definite (order 0).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductKernel {
    pub kernels: Vec<Kernel>,
}

impl ProductKernel {
    pub fn new(kernels: Vec<Kernel>) -> KernelResult<Self> {
        check_children(&kernels)?;
        Ok(Self { kernels })
    }
}

impl RadialKernel for ProductKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        self.kernels
            .iter()
            .fold(T::constant(1.0), |acc, k| acc * k.phi(r))
    }

    fn order(&self) -> usize {
        self.kernels.iter().map(|k| k.order()).sum()
    }

    fn dim(&self) -> usize {
        self.kernels.first().map_or(0, |k| k.dim())
    }

    fn name(&self) -> &'static str {
        "ProductKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_children(&self.kernels)
    }
}

/// Affine rescaling `phi(r) = α phi_child(β r)`.
///
/// `β` stretches the input distance, `α` scales the output. Both must be
/// positive, so the child's polynomial order carries over unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformationKernel {
    pub kernel: Box<Kernel>,
    pub input_scale: f64,
    pub output_scale: f64,
}

impl TransformationKernel {
    pub fn new(kernel: Kernel, input_scale: f64, output_scale: f64) -> KernelResult<Self> {
        let transformed = Self {
            kernel: Box::new(kernel),
            input_scale,
            output_scale,
        };
        transformed.validate()?;
        Ok(transformed)
    }
}

impl RadialKernel for TransformationKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        self.kernel.phi(r * self.input_scale) * self.output_scale
    }

    fn order(&self) -> usize {
        self.kernel.order()
    }

    fn dim(&self) -> usize {
        self.kernel.dim()
    }

    fn name(&self) -> &'static str {
        "TransformationKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        self.kernel.validate()?;
        check_positive("input_scale", self.input_scale)?;
        check_positive("output_scale", self.output_scale)
    }
}

impl Kernel {
    /// `self + other`, flattening nested sums.
    pub fn sum(self, other: Kernel) -> KernelResult<Kernel> {
        let mut kernels = match self {
            Kernel::Sum(s) => s.kernels,
            k => vec![k],
        };
        match other {
            Kernel::Sum(s) => kernels.extend(s.kernels),
            k => kernels.push(k),
        }
        Ok(SumKernel::new(kernels)?.into())
    }

    /// `self * other`, flattening nested products.
    pub fn product(self, other: Kernel) -> KernelResult<Kernel> {
        let mut kernels = match self {
            Kernel::Product(p) => p.kernels,
            k => vec![k],
        };
        match other {
            Kernel::Product(p) => kernels.extend(p.kernels),
            k => kernels.push(k),
        }
        Ok(ProductKernel::new(kernels)?.into())
    }

    /// `α phi(β r)`.
    pub fn transform(self, input_scale: f64, output_scale: f64) -> KernelResult<Kernel> {
        Ok(TransformationKernel::new(self, input_scale, output_scale)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::*;
    use faer::Mat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, dim: usize, seed: u64) -> Mat<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Mat::from_fn(n, dim, |_, _| rng.random_range(-1.0..1.0))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-14 * (1.0 + b.abs())
    }

    #[test]
    fn sum_and_product_are_pointwise() {
        let k1: Kernel = GaussKernel::new(2, 1.3).unwrap().into();
        let k2: Kernel = PolyharmonicSplineKernel::new(2, 3).unwrap().into();

        let sum = k1.clone().sum(k2.clone()).unwrap();
        let product = k1.clone().product(k2.clone()).unwrap();

        let xs = random_points(20, 2, 7);
        let ys = random_points(20, 2, 8);

        for i in 0..xs.nrows() {
            let (x, y) = (xs.row(i), ys.row(i));
            let (a, b) = (k1.evaluate(x, y), k2.evaluate(x, y));
            assert!(close(sum.evaluate(x, y), a + b));
            assert!(close(product.evaluate(x, y), a * b));
        }

        assert_eq!(sum.order(), 2);
        assert_eq!(product.order(), 2);
        assert_eq!(sum.name(), "SumKernel");
    }

    #[test]
    fn nested_sums_are_flattened() {
        let k1: Kernel = GaussKernel::new(1, 1.0).unwrap().into();
        let k2: Kernel = Matern32Kernel::new(1, 1.0).unwrap().into();
        let k3: Kernel = RieszKernel::new(1, 1.0).unwrap().into();

        let sum = k1.sum(k2).unwrap().sum(k3).unwrap();
        match &sum {
            Kernel::Sum(s) => assert_eq!(s.kernels.len(), 3),
            other => panic!("expected a sum, got {}", other.name()),
        }
        assert_eq!(sum.order(), 1);
    }

    #[test]
    fn transformation_rescales_distance_and_output() {
        let base: Kernel = GaussKernel::new(3, 1.0).unwrap().into();
        let scaled = base.clone().transform(2.0, 3.0).unwrap();

        for &r in &[0.0, 0.1, 0.7, 1.5] {
            assert!(close(scaled.phi(r), 3.0 * base.phi(2.0 * r)));
        }

        // Chain rule through the input scaling.
        let d = scaled.radial_derivatives(0.4);
        let b = base.radial_derivatives(0.8);
        assert!(close(d.d1, 3.0 * 2.0 * b.d1));
        assert!(close(d.d2, 3.0 * 4.0 * b.d2));

        assert!(base.clone().transform(0.0, 1.0).is_err());
        assert!(base.transform(1.0, -1.0).is_err());
    }

    #[test]
    fn combinators_reject_mismatched_dimensions() {
        let k1: Kernel = GaussKernel::new(2, 1.0).unwrap().into();
        let k2: Kernel = GaussKernel::new(3, 1.0).unwrap().into();

        assert_eq!(
            k1.clone().sum(k2.clone()),
            Err(KernelError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
        assert!(k1.product(k2).is_err());
        assert!(SumKernel::new(Vec::new()).is_err());
    }
}
