/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the concrete radial kernel profiles and their order requirements.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    RadialKernel,
    dual::RadialScalar,
    error::{KernelError, KernelResult, check_dim, check_positive},
    special::{bessel_k_scaled, ln_gamma},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Gaussian kernel with `phi(r) = exp(-(εr)^2)`.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussKernel {
    pub dim: usize,
    pub shape_parameter: f64,
}

impl GaussKernel {
    pub fn new(dim: usize, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }
}

impl RadialKernel for GaussKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let e = self.shape_parameter;
        (-(r * r) * (e * e)).exp()
    }

    fn order(&self) -> usize {
        0
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "GaussKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("shape_parameter", self.shape_parameter)
    }
}

/// Generalised multiquadric `phi(r) = (-1)^⌈β⌉ (1 + (εr)^2)^β`.
///
/// The sign makes the kernel conditionally positive definite of order `⌈β⌉`.
/// `β = 1/2` gives the classical `-sqrt(1 + (εr)^2)`. Integer `β` is rejected:
/// the profile is then a polynomial in `r^2` and no order makes it definite.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiquadricKernel {
    pub dim: usize,
    pub beta: f64,
    pub shape_parameter: f64,
}

impl MultiquadricKernel {
    pub fn new(dim: usize, beta: f64, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            beta,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Hardy's multiquadric, `β = 1/2`.
    pub fn hardy(dim: usize, shape_parameter: f64) -> KernelResult<Self> {
        Self::new(dim, 0.5, shape_parameter)
    }

    fn sign(&self) -> f64 {
        match (self.beta.ceil() as i64) % 2 {
            0 => 1.0,
            _ => -1.0,
        }
    }
}

impl RadialKernel for MultiquadricKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let e = self.shape_parameter;
        (r * r * (e * e) + 1.0).powf(self.beta) * self.sign()
    }

    fn order(&self) -> usize {
        self.beta.ceil() as usize
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "MultiquadricKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("beta", self.beta)?;
        if self.beta.fract() == 0.0 {
            return Err(KernelError::InvalidArgument(format!(
                "multiquadric exponent must not be an integer, got {}",
                self.beta
            )));
        }
        check_positive("shape_parameter", self.shape_parameter)
    }
}

/// Inverse multiquadric `phi(r) = (1 + (εr)^2)^(-β)`, positive definite for `β > 0`.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverseMultiquadricKernel {
    pub dim: usize,
    pub beta: f64,
    pub shape_parameter: f64,
}

impl InverseMultiquadricKernel {
    pub fn new(dim: usize, beta: f64, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            beta,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// `β = 1/2`, i.e. `1 / sqrt(1 + (εr)^2)`.
    pub fn hardy(dim: usize, shape_parameter: f64) -> KernelResult<Self> {
        Self::new(dim, 0.5, shape_parameter)
    }
}

impl RadialKernel for InverseMultiquadricKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let e = self.shape_parameter;
        (r * r * (e * e) + 1.0).powf(-self.beta)
    }

    fn order(&self) -> usize {
        0
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "InverseMultiquadricKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("beta", self.beta)?;
        check_positive("shape_parameter", self.shape_parameter)
    }
}

/// Polyharmonic spline: `phi(r) = r^k` for odd `k`, `r^k log r` for even `k`.
///
/// Conditionally positive definite of order `⌊k/2⌋ + 1`. Only `k >= 3` kernels
/// are twice differentiable at the origin.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolyharmonicSplineKernel {
    pub dim: usize,
    pub k: u32,
}

impl PolyharmonicSplineKernel {
    pub fn new(dim: usize, k: u32) -> KernelResult<Self> {
        let kernel = Self { dim, k };
        kernel.validate()?;
        Ok(kernel)
    }
}

impl RadialKernel for PolyharmonicSplineKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let k = self.k as i32;
        match (k % 2, r.value() > 0.0) {
            (1, _) => r.powi(k),
            (_, true) => r.powi(k) * r.ln(),
            (_, false) => log_power_origin(r, k),
        }
    }

    fn order(&self) -> usize {
        (self.k / 2) as usize + 1
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "PolyharmonicSplineKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        match self.k {
            0 => Err(KernelError::InvalidArgument(
                "polyharmonic spline exponent k must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Limit jet of `r^k log r` at the origin for even `k >= 2`.
///
/// `phi` and `phi'` vanish; `phi''` diverges to `-inf` for `k = 2`.
#[inline(always)]
fn log_power_origin<T: RadialScalar>(r: T, k: i32) -> T {
    let d2 = match k {
        2 => f64::NEG_INFINITY,
        _ => 0.0,
    };
    r.compose(0.0, 0.0, d2)
}

/// Thin plate spline kernel with `phi(r) = r^2 log r`.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinPlateSplineKernel {
    pub dim: usize,
}

impl ThinPlateSplineKernel {
    pub fn new(dim: usize) -> KernelResult<Self> {
        check_dim(dim)?;
        Ok(Self { dim })
    }
}

impl RadialKernel for ThinPlateSplineKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        match r.value() > 0.0 {
            true => r * r * r.ln(),
            false => log_power_origin(r, 2),
        }
    }

    fn order(&self) -> usize {
        2
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "ThinPlateSplineKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)
    }
}

/// Wendland's compactly supported kernels `phi_{d,k}`, `k ∈ {0, 1, 2, 3}`.
///
/// With `ℓ = ⌊d/2⌋ + k + 1` and `s = εr`:
///
/// - `k = 0`: `(1-s)_+^ℓ`
/// - `k = 1`: `(1-s)_+^(ℓ+1) ((ℓ+1)s + 1)`
/// - `k = 2`: `(1-s)_+^(ℓ+2) ((ℓ²+4ℓ+3)s² + (3ℓ+6)s + 3) / 3`
/// - `k = 3`: `(1-s)_+^(ℓ+3) ((ℓ³+9ℓ²+23ℓ+15)s³ + (6ℓ²+36ℓ+45)s² + (15ℓ+45)s + 15) / 15`
///
/// Positive definite on `R^d` and `C^{2k}` at the origin.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct WendlandKernel {
    pub dim: usize,
    pub k: u32,
    pub shape_parameter: f64,
}

impl WendlandKernel {
    pub fn new(dim: usize, k: u32, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            k,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }
}

impl RadialKernel for WendlandKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let s = r * self.shape_parameter;
        if s.value() >= 1.0 {
            return T::constant(0.0);
        }

        let l = (self.dim / 2) as i32 + self.k as i32 + 1;
        let lf = l as f64;
        let one_minus = -s + 1.0;

        match self.k {
            0 => one_minus.powi(l),
            1 => one_minus.powi(l + 1) * (s * (lf + 1.0) + 1.0),
            2 => {
                let p = s * s * (lf * lf + 4.0 * lf + 3.0) + s * (3.0 * lf + 6.0) + 3.0;
                one_minus.powi(l + 2) * p / 3.0
            }
            _ => {
                let p = s * s * s * (lf.powi(3) + 9.0 * lf * lf + 23.0 * lf + 15.0)
                    + s * s * (6.0 * lf * lf + 36.0 * lf + 45.0)
                    + s * (15.0 * lf + 45.0)
                    + 15.0;
                one_minus.powi(l + 3) * p / 15.0
            }
        }
    }

    fn order(&self) -> usize {
        0
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "WendlandKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("shape_parameter", self.shape_parameter)?;
        match self.k {
            0..=3 => Ok(()),
            k => Err(KernelError::InvalidArgument(format!(
                "Wendland smoothness k must be in 0..=3, got {k}"
            ))),
        }
    }
}

/// Wu's compactly supported kernels `psi_{k,l}` for `0 <= k <= l <= 3`, `l >= 1`.
///
/// `psi_{k,l}` is positive definite on `R^d` for `d <= 2k + 1`. Profiles are
/// normalised so `phi(0) = 1`.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct WuKernel {
    pub dim: usize,
    pub k: u32,
    pub l: u32,
    pub shape_parameter: f64,
}

impl WuKernel {
    pub fn new(dim: usize, k: u32, l: u32, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            k,
            l,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// Exponent of `(1-s)_+` and ascending coefficients of the polynomial factor.
    fn table(&self) -> (i32, &'static [f64]) {
        match (self.k, self.l) {
            (0, 1) => (3, &[1.0, 3.0, 1.0][..]),
            (1, 1) => (2, &[2.0, 1.0][..]),
            (0, 2) => (5, &[1.0, 5.0, 9.0, 5.0, 1.0][..]),
            (1, 2) => (4, &[4.0, 16.0, 12.0, 3.0][..]),
            (2, 2) => (3, &[8.0, 9.0, 3.0][..]),
            (0, 3) => (7, &[5.0, 35.0, 101.0, 147.0, 101.0, 35.0, 5.0][..]),
            (1, 3) => (6, &[6.0, 36.0, 82.0, 72.0, 30.0, 5.0][..]),
            (2, 3) => (5, &[8.0, 40.0, 48.0, 25.0, 5.0][..]),
            _ => (4, &[16.0, 29.0, 20.0, 5.0][..]),
        }
    }
}

impl RadialKernel for WuKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let s = r * self.shape_parameter;
        if s.value() >= 1.0 {
            return T::constant(0.0);
        }

        let (power, coefficients) = self.table();

        // Horner, highest degree first
        let mut poly = T::constant(0.0);
        for c in coefficients.iter().rev() {
            poly = poly * s + *c;
        }

        (-s + 1.0).powi(power) * poly / coefficients[0]
    }

    fn order(&self) -> usize {
        0
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "WuKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("shape_parameter", self.shape_parameter)?;
        match self.l >= 1 && self.l <= 3 && self.k <= self.l {
            true => Ok(()),
            false => Err(KernelError::InvalidArgument(format!(
                "Wu kernel requires 0 <= k <= l <= 3 and l >= 1, got k = {}, l = {}",
                self.k, self.l
            ))),
        }
    }
}

/// Truncated power `phi(r) = (1 - εr)_+^β`.
///
/// Positive definite on `R^d` for `β >= (d + 1) / 2`.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialCharacteristicKernel {
    pub dim: usize,
    pub beta: f64,
    pub shape_parameter: f64,
}

impl RadialCharacteristicKernel {
    pub fn new(dim: usize, beta: f64, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            beta,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }
}

impl RadialKernel for RadialCharacteristicKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let s = r * self.shape_parameter;
        match s.value() >= 1.0 {
            true => T::constant(0.0),
            false => (-s + 1.0).powf(self.beta),
        }
    }

    fn order(&self) -> usize {
        0
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "RadialCharacteristicKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("beta", self.beta)?;
        check_positive("shape_parameter", self.shape_parameter)
    }
}

macro_rules! matern_half_integer {
    ($(#[$doc:meta])* $name:ident, $label:literal, |$a:ident| $body:expr, $scale:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub dim: usize,
            pub shape_parameter: f64,
        }

        impl $name {
            pub fn new(dim: usize, shape_parameter: f64) -> KernelResult<Self> {
                let kernel = Self {
                    dim,
                    shape_parameter,
                };
                kernel.validate()?;
                Ok(kernel)
            }
        }

        impl RadialKernel for $name {
            #[inline(always)]
            fn phi<T: RadialScalar>(&self, r: T) -> T {
                let $a = r * (self.shape_parameter * $scale);
                $body
            }

            fn order(&self) -> usize {
                0
            }

            fn dim(&self) -> usize {
                self.dim
            }

            fn name(&self) -> &'static str {
                $label
            }

            fn validate(&self) -> KernelResult<()> {
                check_dim(self.dim)?;
                check_positive("shape_parameter", self.shape_parameter)
            }
        }
    };
}

matern_half_integer!(
    /// Matérn kernel of order 1/2: `exp(-εr)`.
    Matern12Kernel, "Matern12Kernel",
    |a| (-a).exp(),
    1.0
);

matern_half_integer!(
    /// Matérn kernel of order 3/2: `(1 + a) exp(-a)` with `a = √3 εr`.
    Matern32Kernel, "Matern32Kernel",
    |a| (a + 1.0) * (-a).exp(),
    3.0f64.sqrt()
);

matern_half_integer!(
    /// Matérn kernel of order 5/2: `(1 + a + a²/3) exp(-a)` with `a = √5 εr`.
    Matern52Kernel, "Matern52Kernel",
    |a| (a + 1.0 + a * a / 3.0) * (-a).exp(),
    5.0f64.sqrt()
);

matern_half_integer!(
    /// Matérn kernel of order 7/2: `(1 + a + 2a²/5 + a³/15) exp(-a)` with `a = √7 εr`.
    Matern72Kernel, "Matern72Kernel",
    |a| (a + 1.0 + a * a * 0.4 + a * a * a / 15.0) * (-a).exp(),
    7.0f64.sqrt()
);

/// Matérn kernel of general order `ν > 0`:
///
/// `phi(r) = 2^(1-ν) / Γ(ν) z^ν K_ν(z)`, `z = √(2ν) εr`.
///
/// For `ν = 1/2, 3/2, 5/2, 7/2` this coincides with the closed forms above.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaternKernel {
    pub dim: usize,
    pub nu: f64,
    pub shape_parameter: f64,
}

impl MaternKernel {
    pub fn new(dim: usize, nu: f64, shape_parameter: f64) -> KernelResult<Self> {
        let kernel = Self {
            dim,
            nu,
            shape_parameter,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// `phi'(0)` and `phi''(0)`, taken from the small-argument expansion.
    fn derivatives_at_origin(&self) -> (f64, f64) {
        let e = self.shape_parameter;
        let nu = self.nu;

        let d1 = if nu > 0.5 {
            0.0
        } else if nu == 0.5 {
            -e
        } else {
            f64::NEG_INFINITY
        };

        let d2 = if nu > 1.0 {
            -nu * e * e / (nu - 1.0)
        } else if nu == 0.5 {
            e * e
        } else {
            f64::NEG_INFINITY
        };

        (d1, d2)
    }
}

impl RadialKernel for MaternKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        let nu = self.nu;
        let z = r * (self.shape_parameter * (2.0 * nu).sqrt());

        if z.value() <= 0.0 {
            let (d1, d2) = self.derivatives_at_origin();
            return r.compose(1.0, d1, d2);
        }

        let normalisation = ((1.0 - nu) * std::f64::consts::LN_2 - ln_gamma(nu)).exp();
        bessel_k_scaled(nu, z) * normalisation
    }

    fn order(&self) -> usize {
        0
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "MaternKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        check_positive("nu", self.nu)?;
        check_positive("shape_parameter", self.shape_parameter)
    }
}

/// Riesz kernel `phi(r) = -r^β` for `0 < β < 2`, conditionally positive definite of order 1.
#[derive(Clone, Debug, Copy, PartialEq, Serialize, Deserialize)]
pub struct RieszKernel {
    pub dim: usize,
    pub beta: f64,
}

impl RieszKernel {
    pub fn new(dim: usize, beta: f64) -> KernelResult<Self> {
        let kernel = Self { dim, beta };
        kernel.validate()?;
        Ok(kernel)
    }
}

impl RadialKernel for RieszKernel {
    #[inline(always)]
    fn phi<T: RadialScalar>(&self, r: T) -> T {
        if r.value() > 0.0 {
            return -r.powf(self.beta);
        }
        // One-sided limits of -β r^(β-1) and -β(β-1) r^(β-2).
        let (d1, d2) = match self.beta.partial_cmp(&1.0) {
            Some(Ordering::Less) => (f64::NEG_INFINITY, f64::INFINITY),
            Some(Ordering::Equal) => (-1.0, 0.0),
            _ => (0.0, f64::NEG_INFINITY),
        };
        r.compose(0.0, d1, d2)
    }

    fn order(&self) -> usize {
        1
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &'static str {
        "RieszKernel"
    }

    fn validate(&self) -> KernelResult<()> {
        check_dim(self.dim)?;
        match self.beta > 0.0 && self.beta < 2.0 {
            true => Ok(()),
            false => Err(KernelError::InvalidArgument(format!(
                "Riesz exponent must lie in (0, 2), got {}",
                self.beta
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual::Dual2;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * (1.0 + b.abs())
    }

    /// Compares dual-number derivatives against central differences.
    fn check_derivatives<K: RadialKernel>(kernel: &K, r: f64) {
        let jet = kernel.radial_derivatives(r);
        let h = 1e-4;
        let f = |x: f64| kernel.phi(x);
        let fd1 = (f(r + h) - f(r - h)) / (2.0 * h);
        let fd2 = (f(r + h) - 2.0 * f(r) + f(r - h)) / (h * h);

        assert!(close(jet.value, f(r), 1e-14), "{}: value", kernel.name());
        assert!(close(jet.d1, fd1, 1e-6), "{}: d1 {} vs {}", kernel.name(), jet.d1, fd1);
        assert!(close(jet.d2, fd2, 1e-4), "{}: d2 {} vs {}", kernel.name(), jet.d2, fd2);
    }

    #[test]
    fn gaussian_profile() {
        let k = GaussKernel::new(2, 2.0).unwrap();
        assert_eq!(k.phi(0.0), 1.0);
        assert!(close(k.phi(0.5), (-1.0f64).exp(), 1e-15));
        check_derivatives(&k, 0.37);
    }

    #[test]
    fn multiquadric_sign_and_order() {
        let mq = MultiquadricKernel::hardy(2, 1.0).unwrap();
        assert!(close(mq.phi(1.0), -(2.0f64).sqrt(), 1e-15));
        assert_eq!(mq.order(), 1);

        let mq = MultiquadricKernel::new(2, 1.5, 1.0).unwrap();
        assert!(mq.phi(1.0) > 0.0);
        assert_eq!(mq.order(), 2);

        let imq = InverseMultiquadricKernel::hardy(3, 2.0).unwrap();
        assert!(close(imq.phi(0.5), 1.0 / 2.0f64.sqrt(), 1e-15));
        assert_eq!(imq.order(), 0);

        check_derivatives(&mq, 0.8);
        check_derivatives(&imq, 0.8);

        // Integer exponents give plain polynomials in r^2.
        assert!(MultiquadricKernel::new(2, 1.0, 1.0).is_err());
        assert!(MultiquadricKernel::new(2, 2.0, 1.0).is_err());
        assert!(InverseMultiquadricKernel::new(2, 1.0, 1.0).is_ok());
    }

    #[test]
    fn polyharmonic_parity() {
        let cubic = PolyharmonicSplineKernel::new(2, 3).unwrap();
        assert_eq!(cubic.phi(2.0), 8.0);
        assert_eq!(cubic.order(), 2);

        let even = PolyharmonicSplineKernel::new(2, 4).unwrap();
        assert!(close(even.phi(2.0), 16.0 * 2.0f64.ln(), 1e-15));
        assert_eq!(even.phi(0.0), 0.0);
        assert_eq!(even.order(), 3);

        let tps = ThinPlateSplineKernel::new(2).unwrap();
        assert!(close(tps.phi(3.0), 9.0 * 3.0f64.ln(), 1e-15));
        assert_eq!(tps.order(), 2);

        check_derivatives(&cubic, 0.6);
        check_derivatives(&even, 0.6);
        check_derivatives(&tps, 0.6);

        // r^3 is twice differentiable at the origin with phi' = phi'' = 0.
        let origin = cubic.radial_derivatives(0.0);
        assert_eq!(origin, Dual2::new(0.0, 0.0, 0.0));

        assert!(PolyharmonicSplineKernel::new(2, 0).is_err());
    }

    #[test]
    fn compact_support() {
        for k in 0..=3 {
            let w = WendlandKernel::new(3, k, 2.0).unwrap();
            assert!(close(w.phi(0.0), 1.0, 1e-15));
            assert_eq!(w.phi(0.5), 0.0);
            assert_eq!(w.phi(0.75), 0.0);
            assert!(w.phi(0.25) > 0.0);
            check_derivatives(&w, 0.2);
        }

        for l in 1..=3 {
            for k in 0..=l {
                let wu = WuKernel::new(2, k, l, 1.0).unwrap();
                assert!(close(wu.phi(0.0), 1.0, 1e-15));
                assert_eq!(wu.phi(1.0), 0.0);
                assert!(wu.phi(0.5) > 0.0);
                check_derivatives(&wu, 0.4);
            }
        }

        let rc = RadialCharacteristicKernel::new(2, 2.0, 1.0).unwrap();
        assert!(close(rc.phi(0.5), 0.25, 1e-15));
        assert_eq!(rc.phi(1.5), 0.0);

        assert!(WendlandKernel::new(2, 4, 1.0).is_err());
        assert!(WuKernel::new(2, 3, 2, 1.0).is_err());
    }

    #[test]
    fn wendland_second_order_closed_form() {
        // d = 3, k = 1: ℓ = 3, phi(s) = (1-s)^4 (4s + 1)
        let w = WendlandKernel::new(3, 1, 1.0).unwrap();
        let s: f64 = 0.3;
        assert!(close(w.phi(s), (1.0 - s).powi(4) * (4.0 * s + 1.0), 1e-15));
    }

    #[test]
    fn matern_general_matches_closed_forms() {
        let eps = 1.7;
        let closed: [(f64, Box<dyn Fn(f64) -> f64>); 4] = [
            (0.5, Box::new(move |r| Matern12Kernel::new(1, eps).unwrap().phi(r))),
            (1.5, Box::new(move |r| Matern32Kernel::new(1, eps).unwrap().phi(r))),
            (2.5, Box::new(move |r| Matern52Kernel::new(1, eps).unwrap().phi(r))),
            (3.5, Box::new(move |r| Matern72Kernel::new(1, eps).unwrap().phi(r))),
        ];

        for (nu, f) in closed.iter() {
            let general = MaternKernel::new(1, *nu, eps).unwrap();
            for &r in &[0.0, 1e-3, 0.1, 0.5, 1.0, 2.5] {
                assert!(
                    close(general.phi(r), f(r), 1e-11),
                    "nu = {nu}, r = {r}: {} vs {}",
                    general.phi(r),
                    f(r)
                );
            }
        }
    }

    #[test]
    fn matern_derivatives() {
        let general = MaternKernel::new(2, 2.5, 1.3).unwrap();
        let closed = Matern52Kernel::new(2, 1.3).unwrap();

        for &r in &[0.05, 0.4, 1.2] {
            let a = general.radial_derivatives(r);
            let b = closed.radial_derivatives(r);
            assert!(close(a.d1, b.d1, 1e-10));
            assert!(close(a.d2, b.d2, 1e-10));
        }

        // Second derivative at the origin comes from the series expansion.
        let a = general.radial_derivatives(0.0);
        let b = closed.radial_derivatives(0.0);
        assert!(close(a.d2, b.d2, 1e-12));
        assert_eq!(a.d1, 0.0);

        check_derivatives(&MaternKernel::new(2, 1.2, 0.9).unwrap(), 0.7);
    }

    #[test]
    fn riesz_kernel() {
        let k = RieszKernel::new(2, 1.0).unwrap();
        assert_eq!(k.phi(3.0), -3.0);
        assert_eq!(k.phi(0.0), 0.0);
        assert_eq!(k.order(), 1);
        assert!(RieszKernel::new(2, 2.0).is_err());
        check_derivatives(&RieszKernel::new(2, 1.5).unwrap(), 0.9);
    }

    #[test]
    fn origin_jets_carry_the_one_sided_limits() {
        // r: phi' = 1 at the origin.
        let linear = PolyharmonicSplineKernel::new(2, 1).unwrap().radial_derivatives(0.0);
        assert_eq!(linear, Dual2::new(0.0, 1.0, 0.0));

        // r^2 log r: phi'' = 2 log r + 3 diverges.
        let tps = ThinPlateSplineKernel::new(2).unwrap().radial_derivatives(0.0);
        assert_eq!(tps, Dual2::new(0.0, 0.0, f64::NEG_INFINITY));
        let even = PolyharmonicSplineKernel::new(2, 2).unwrap().radial_derivatives(0.0);
        assert_eq!(even, tps);

        // r^4 log r is twice differentiable.
        let quartic = PolyharmonicSplineKernel::new(2, 4).unwrap().radial_derivatives(0.0);
        assert_eq!(quartic, Dual2::new(0.0, 0.0, 0.0));

        let riesz = |beta: f64| RieszKernel::new(2, beta).unwrap().radial_derivatives(0.0);
        assert!(riesz(0.5).d1 == f64::NEG_INFINITY);
        assert!(!riesz(0.5).d2.is_finite());
        assert_eq!(riesz(1.0), Dual2::new(0.0, -1.0, 0.0));
        assert_eq!(riesz(1.5), Dual2::new(0.0, 0.0, f64::NEG_INFINITY));

        // Values are unaffected.
        assert_eq!(ThinPlateSplineKernel::new(2).unwrap().phi(0.0), 0.0);
        assert_eq!(RieszKernel::new(2, 0.5).unwrap().phi(0.0), 0.0);
    }

    #[test]
    fn rejects_bad_shape_parameters() {
        assert!(GaussKernel::new(2, 0.0).is_err());
        assert!(GaussKernel::new(2, -1.0).is_err());
        assert!(GaussKernel::new(0, 1.0).is_err());
        assert!(MaternKernel::new(2, 0.0, 1.0).is_err());
        assert!(Matern32Kernel::new(2, f64::NAN).is_err());
    }
}
