//! Scalar trait for tensor element types.
//!
//! The contraction core is generic over a closed set of numeric kinds
//! (`f32`, `f64`, `c32`, `c64`). A runtime [`DType`] tag mirrors the
//! compile-time parameter so that the type-erased entry points in
//! [`crate::api`] can dispatch to the monomorphic implementation.

use faer_traits::ComplexField;
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

pub use faer::{c32, c64};

/// Runtime tag for the supported element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    C32,
    C64,
}

impl DType {
    /// Whether this type has an imaginary component.
    pub fn is_complex(self) -> bool {
        matches!(self, DType::C32 | DType::C64)
    }
}

/// Trait for scalar types supported by einmult.
///
/// This trait wraps faer's `ComplexField` (required by the blocked GEMM
/// primitive) with the additional operations the contraction kernels need:
/// conjugation, identity constants, and a modulus for error bounds.
pub trait Scalar:
    ComplexField
    + Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Runtime tag matching this type.
    const DTYPE: DType;

    /// Whether the type has an imaginary component.
    const IS_COMPLEX: bool;

    /// Returns the additive identity (zero).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one).
    fn one() -> Self;

    /// Complex conjugate (identity for real types).
    fn conjugate(self) -> Self;

    /// Build a value from a real part (imaginary part zero).
    fn from_real(re: f64) -> Self;

    /// Modulus as `f64`, used for numerical tolerances.
    fn modulus(self) -> f64;

    /// Whether this value equals zero.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Whether this value equals one.
    fn is_one(&self) -> bool {
        *self == Self::one()
    }
}

impl Scalar for f32 {
    const DTYPE: DType = DType::F32;
    const IS_COMPLEX: bool = false;

    fn one() -> Self {
        1.0
    }

    fn conjugate(self) -> Self {
        self
    }

    fn from_real(re: f64) -> Self {
        re as f32
    }

    fn modulus(self) -> f64 {
        f64::from(self).abs()
    }
}

impl Scalar for f64 {
    const DTYPE: DType = DType::F64;
    const IS_COMPLEX: bool = false;

    fn one() -> Self {
        1.0
    }

    fn conjugate(self) -> Self {
        self
    }

    fn from_real(re: f64) -> Self {
        re
    }

    fn modulus(self) -> f64 {
        self.abs()
    }
}

impl Scalar for c32 {
    const DTYPE: DType = DType::C32;
    const IS_COMPLEX: bool = true;

    fn one() -> Self {
        c32::new(1.0, 0.0)
    }

    fn conjugate(self) -> Self {
        c32::new(self.re, -self.im)
    }

    fn from_real(re: f64) -> Self {
        c32::new(re as f32, 0.0)
    }

    fn modulus(self) -> f64 {
        f64::from(self.re).hypot(f64::from(self.im))
    }
}

impl Scalar for c64 {
    const DTYPE: DType = DType::C64;
    const IS_COMPLEX: bool = true;

    fn one() -> Self {
        c64::new(1.0, 0.0)
    }

    fn conjugate(self) -> Self {
        c64::new(self.re, -self.im)
    }

    fn from_real(re: f64) -> Self {
        c64::new(re, 0.0)
    }

    fn modulus(self) -> f64 {
        self.re.hypot(self.im)
    }
}

/// Apply conjugation when the flag is set.
#[inline(always)]
pub(crate) fn maybe_conj<T: Scalar>(conj: bool, value: T) -> T {
    if conj {
        value.conjugate()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_one() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(f64::one(), 1.0);
        assert_eq!(c64::zero(), c64::new(0.0, 0.0));
        assert_eq!(c64::one(), c64::new(1.0, 0.0));
    }

    #[test]
    fn test_conjugate() {
        assert_eq!(2.5f64.conjugate(), 2.5);
        let z = c64::new(1.0, 2.0);
        assert_eq!(Scalar::conjugate(z), c64::new(1.0, -2.0));
        assert_eq!(maybe_conj(false, z), z);
    }

    #[test]
    fn test_dtype_tags() {
        assert_eq!(<f32 as Scalar>::DTYPE, DType::F32);
        assert_eq!(<c64 as Scalar>::DTYPE, DType::C64);
        assert!(DType::C32.is_complex());
        assert!(!DType::F64.is_complex());
    }

    #[test]
    fn test_modulus() {
        assert_eq!((-3.0f64).modulus(), 3.0);
        assert_eq!(c64::new(3.0, 4.0).modulus(), 5.0);
    }
}
