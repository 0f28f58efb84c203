//! Public entry points.
//!
//! [`mult`] is the typed entry: classify the labels, spawn the thread pool,
//! and run the dispatcher. The `Any*` types and [`mult_dyn`] form the
//! type-erased boundary for callers that carry element types at runtime;
//! they check tag agreement and forward to the monomorphic core.

use crate::comm;
use crate::config::Config;
use crate::error::MultError;
use crate::index;
use crate::mult::{self, MultRequest};
use crate::scalar::{DType, Scalar, c32, c64};
use crate::view::{TensorMut, TensorRef};

/// Labeled contraction: `C = alpha * op(A) * op(B) + beta * op(C)`.
///
/// Each operand's index string assigns one character label per dimension.
/// A label shared by A and B is contracted; a label shared with C is a free
/// or batch dimension. `op` is conjugation when the corresponding view
/// carries the conjugate flag.
///
/// C must not alias A or B.
///
/// # Examples
///
/// ```
/// use einmult::{Config, Tensor, mult};
///
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let b = Tensor::from_vec(vec![1.0, 0.0, 1.0], &[3]).unwrap();
/// let mut c: Tensor<f64> = Tensor::zeros(&[2]);
///
/// let config = Config::new().with_num_threads(1);
/// mult(
///     &config,
///     1.0,
///     &a.view(),
///     "ij",
///     &b.view(),
///     "j",
///     0.0,
///     &mut c.view_mut(),
///     "i",
/// )
/// .unwrap();
/// assert_eq!(c.data(), &[6.0, 8.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn mult<T: Scalar>(
    config: &Config,
    alpha: T,
    a: &TensorRef<'_, T>,
    idx_a: &str,
    b: &TensorRef<'_, T>,
    idx_b: &str,
    beta: T,
    c: &mut TensorMut<'_, T>,
    idx_c: &str,
) -> Result<(), MultError> {
    let groups = index::classify(
        a.dims(),
        a.strides(),
        idx_a,
        b.dims(),
        b.strides(),
        idx_b,
        c.dims(),
        c.strides(),
        idx_c,
    )?;
    let req = MultRequest {
        groups,
        alpha,
        conj_a: a.is_conj(),
        a: a.as_ptr(),
        conj_b: b.is_conj(),
        b: b.as_ptr(),
        beta,
        conj_c: c.is_conj(),
        c: c.as_mut_ptr(),
    };
    comm::run(config.num_threads(), |comm| {
        mult::mult(config, comm, &req);
    });
    Ok(())
}

/// A scalar whose element type is chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyScalar {
    F32(f32),
    F64(f64),
    C32(c32),
    C64(c64),
}

impl AnyScalar {
    /// Runtime tag of this scalar.
    pub fn dtype(&self) -> DType {
        match self {
            AnyScalar::F32(_) => DType::F32,
            AnyScalar::F64(_) => DType::F64,
            AnyScalar::C32(_) => DType::C32,
            AnyScalar::C64(_) => DType::C64,
        }
    }

    /// Build a scalar of the given type from real and imaginary parts.
    ///
    /// Rejects a nonzero imaginary part for the real types.
    pub fn from_parts(dtype: DType, re: f64, im: f64) -> Result<Self, MultError> {
        match dtype {
            DType::F32 | DType::F64 if im != 0.0 => Err(MultError::NonRealScalar { dtype, im }),
            DType::F32 => Ok(AnyScalar::F32(re as f32)),
            DType::F64 => Ok(AnyScalar::F64(re)),
            DType::C32 => Ok(AnyScalar::C32(c32::new(re as f32, im as f32))),
            DType::C64 => Ok(AnyScalar::C64(c64::new(re, im))),
        }
    }
}

/// An immutable operand whose element type is chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyTensorRef<'a> {
    F32(TensorRef<'a, f32>),
    F64(TensorRef<'a, f64>),
    C32(TensorRef<'a, c32>),
    C64(TensorRef<'a, c64>),
}

impl AnyTensorRef<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            AnyTensorRef::F32(_) => DType::F32,
            AnyTensorRef::F64(_) => DType::F64,
            AnyTensorRef::C32(_) => DType::C32,
            AnyTensorRef::C64(_) => DType::C64,
        }
    }
}

/// A mutable operand whose element type is chosen at runtime.
#[derive(Debug)]
pub enum AnyTensorMut<'a> {
    F32(TensorMut<'a, f32>),
    F64(TensorMut<'a, f64>),
    C32(TensorMut<'a, c32>),
    C64(TensorMut<'a, c64>),
}

impl AnyTensorMut<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            AnyTensorMut::F32(_) => DType::F32,
            AnyTensorMut::F64(_) => DType::F64,
            AnyTensorMut::C32(_) => DType::C32,
            AnyTensorMut::C64(_) => DType::C64,
        }
    }
}

fn check_dtype(expected: DType, actual: DType) -> Result<(), MultError> {
    if expected != actual {
        return Err(MultError::TypeMismatch { expected, actual });
    }
    Ok(())
}

/// Type-erased counterpart of [`mult`].
///
/// All three operands and both scalars must carry the same element type.
#[allow(clippy::too_many_arguments)]
pub fn mult_dyn(
    config: &Config,
    alpha: AnyScalar,
    a: &AnyTensorRef<'_>,
    idx_a: &str,
    b: &AnyTensorRef<'_>,
    idx_b: &str,
    beta: AnyScalar,
    c: &mut AnyTensorMut<'_>,
    idx_c: &str,
) -> Result<(), MultError> {
    let dtype = c.dtype();
    check_dtype(dtype, a.dtype())?;
    check_dtype(dtype, b.dtype())?;
    check_dtype(dtype, alpha.dtype())?;
    check_dtype(dtype, beta.dtype())?;

    match (c, a, b, alpha, beta) {
        (
            AnyTensorMut::F32(c),
            AnyTensorRef::F32(a),
            AnyTensorRef::F32(b),
            AnyScalar::F32(alpha),
            AnyScalar::F32(beta),
        ) => mult(config, alpha, a, idx_a, b, idx_b, beta, c, idx_c),
        (
            AnyTensorMut::F64(c),
            AnyTensorRef::F64(a),
            AnyTensorRef::F64(b),
            AnyScalar::F64(alpha),
            AnyScalar::F64(beta),
        ) => mult(config, alpha, a, idx_a, b, idx_b, beta, c, idx_c),
        (
            AnyTensorMut::C32(c),
            AnyTensorRef::C32(a),
            AnyTensorRef::C32(b),
            AnyScalar::C32(alpha),
            AnyScalar::C32(beta),
        ) => mult(config, alpha, a, idx_a, b, idx_b, beta, c, idx_c),
        (
            AnyTensorMut::C64(c),
            AnyTensorRef::C64(a),
            AnyTensorRef::C64(b),
            AnyScalar::C64(alpha),
            AnyScalar::C64(beta),
        ) => mult(config, alpha, a, idx_a, b, idx_b, beta, c, idx_c),
        _ => unreachable!("tags checked above"),
    }
}
