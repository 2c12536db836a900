/////////////////////////////////////////////////////////////////////////////////////////////
//
// Second-order forward-mode dual numbers used to differentiate radial kernel profiles.
//
// Created on: 18 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Exact first and second derivatives of `phi(r)` via forward-mode automatic
//! differentiation.
//!
//! Every kernel profile is written once, generically over [`RadialScalar`].
//! Evaluating it with an `f64` gives `phi(r)`; evaluating it with
//! [`Dual2::variable`] gives `phi(r)`, `phi'(r)` and `phi''(r)` in a single pass.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Scalar type a radial profile can be evaluated on.
///
/// All elementary functions are expressed through [`RadialScalar::compose`],
/// which applies the chain rule given the value and first two derivatives of
/// the outer function at `self.value()`.
pub trait RadialScalar:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    /// Lifts a constant (zero derivatives).
    fn constant(c: f64) -> Self;

    /// Primal value.
    fn value(&self) -> f64;

    /// Returns `f(self)` given `f`, `f'` and `f''` evaluated at `self.value()`.
    fn compose(self, f0: f64, f1: f64, f2: f64) -> Self;

    #[inline(always)]
    fn exp(self) -> Self {
        let e = self.value().exp();
        self.compose(e, e, e)
    }

    #[inline(always)]
    fn ln(self) -> Self {
        let v = self.value();
        self.compose(v.ln(), 1.0 / v, -1.0 / (v * v))
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        let s = self.value().sqrt();
        self.compose(s, 0.5 / s, -0.25 / (s * s * s))
    }

    /// Integer power. `powi(0)` and `powi(1)` are exact at zero.
    #[inline(always)]
    fn powi(self, n: i32) -> Self {
        match n {
            0 => Self::constant(1.0),
            1 => self,
            _ => {
                let v = self.value();
                let nf = n as f64;
                self.compose(
                    v.powi(n),
                    nf * v.powi(n - 1),
                    nf * (nf - 1.0) * v.powi(n - 2),
                )
            }
        }
    }

    #[inline(always)]
    fn powf(self, p: f64) -> Self {
        let v = self.value();
        self.compose(
            v.powf(p),
            p * v.powf(p - 1.0),
            p * (p - 1.0) * v.powf(p - 2.0),
        )
    }
}

impl RadialScalar for f64 {
    #[inline(always)]
    fn constant(c: f64) -> Self {
        c
    }

    #[inline(always)]
    fn value(&self) -> f64 {
        *self
    }

    #[inline(always)]
    fn compose(self, f0: f64, _f1: f64, _f2: f64) -> Self {
        f0
    }

    #[inline(always)]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline(always)]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline(always)]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline(always)]
    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }

    #[inline(always)]
    fn powf(self, p: f64) -> Self {
        f64::powf(self, p)
    }
}

/// Truncated Taylor jet `(f, f', f'')` of a function of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dual2 {
    pub value: f64,
    pub d1: f64,
    pub d2: f64,
}

impl Dual2 {
    /// The independent variable evaluated at `x`.
    #[inline(always)]
    pub fn variable(x: f64) -> Self {
        Self {
            value: x,
            d1: 1.0,
            d2: 0.0,
        }
    }

    #[inline(always)]
    pub fn new(value: f64, d1: f64, d2: f64) -> Self {
        Self { value, d1, d2 }
    }

    #[inline(always)]
    fn recip(self) -> Self {
        let v = self.value;
        self.compose(1.0 / v, -1.0 / (v * v), 2.0 / (v * v * v))
    }
}

impl RadialScalar for Dual2 {
    #[inline(always)]
    fn constant(c: f64) -> Self {
        Self {
            value: c,
            d1: 0.0,
            d2: 0.0,
        }
    }

    #[inline(always)]
    fn value(&self) -> f64 {
        self.value
    }

    #[inline(always)]
    fn compose(self, f0: f64, f1: f64, f2: f64) -> Self {
        // (f o g)'' = f''(g) g'^2 + f'(g) g''
        Self {
            value: f0,
            d1: f1 * self.d1,
            d2: f2 * self.d1 * self.d1 + f1 * self.d2,
        }
    }
}

impl Add for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            d1: self.d1 + rhs.d1,
            d2: self.d2 + rhs.d2,
        }
    }
}

impl Sub for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
            d1: self.d1 - rhs.d1,
            d2: self.d2 - rhs.d2,
        }
    }
}

impl Mul for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self {
            value: self.value * rhs.value,
            d1: self.d1 * rhs.value + self.value * rhs.d1,
            d2: self.d2 * rhs.value + 2.0 * self.d1 * rhs.d1 + self.value * rhs.d2,
        }
    }
}

impl Div for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        self * rhs.recip()
    }
}

impl Neg for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            value: -self.value,
            d1: -self.d1,
            d2: -self.d2,
        }
    }
}

impl Add<f64> for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: f64) -> Self {
        Self {
            value: self.value + rhs,
            ..self
        }
    }
}

impl Sub<f64> for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: f64) -> Self {
        Self {
            value: self.value - rhs,
            ..self
        }
    }
}

impl Mul<f64> for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self {
        Self {
            value: self.value * rhs,
            d1: self.d1 * rhs,
            d2: self.d2 * rhs,
        }
    }
}

impl Div<f64> for Dual2 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: f64) -> Self {
        self * (1.0 / rhs)
    }
}
