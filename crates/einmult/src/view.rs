//! Borrowed strided views over dense tensor data.
//!
//! A view is a base pointer plus per-dimension `(length, stride)` pairs and a
//! conjugation flag. Strides are in elements and may be negative or zero on
//! input operands; bounds are checked once at construction, after which the
//! contraction core walks the region with raw offset arithmetic.

use crate::error::MultError;
use crate::scalar::Scalar;
use std::marker::PhantomData;

fn check_bounds(
    len: usize,
    dims: &[usize],
    strides: &[isize],
    offset: usize,
) -> Result<(), MultError> {
    if dims.len() != strides.len() {
        return Err(MultError::RankMismatch {
            ndim: dims.len(),
            nstrides: strides.len(),
        });
    }
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut lo = offset as isize;
    let mut hi = offset as isize;
    for (&d, &s) in dims.iter().zip(strides) {
        let span = (d as isize - 1) * s;
        if span < 0 {
            lo += span;
        } else {
            hi += span;
        }
    }
    if lo < 0 || hi >= len as isize {
        return Err(MultError::ViewOutOfBounds {
            lo,
            hi,
            len,
        });
    }
    Ok(())
}

/// Immutable strided view of tensor data.
#[derive(Debug, Clone)]
pub struct TensorRef<'a, T: Scalar> {
    ptr: *const T,
    dims: Vec<usize>,
    strides: Vec<isize>,
    conj: bool,
    _marker: PhantomData<&'a [T]>,
}

impl<'a, T: Scalar> TensorRef<'a, T> {
    /// Create a view over `data` with the given dimensions and element strides,
    /// starting `offset` elements into the buffer.
    ///
    /// Fails if any addressable element would fall outside `data`.
    pub fn new(
        data: &'a [T],
        dims: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self, MultError> {
        check_bounds(data.len(), dims, strides, offset)?;
        let ptr = if dims.iter().any(|&d| d == 0) {
            data.as_ptr()
        } else {
            // SAFETY: check_bounds verified offset <= hi < data.len().
            unsafe { data.as_ptr().add(offset) }
        };
        Ok(Self {
            ptr,
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            conj: false,
            _marker: PhantomData,
        })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Dimension lengths.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Element strides.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Whether elements are read conjugated.
    pub fn is_conj(&self) -> bool {
        self.conj
    }

    /// Returns the same view with the conjugation flag toggled.
    pub fn conj(mut self) -> Self {
        self.conj = !self.conj;
        self
    }

    pub(crate) fn as_ptr(&self) -> ConstPtr<T> {
        ConstPtr(self.ptr)
    }
}

/// Mutable strided view of tensor data.
///
/// The caller guarantees that the view does not alias any input view passed
/// to the same contraction call.
#[derive(Debug)]
pub struct TensorMut<'a, T: Scalar> {
    ptr: *mut T,
    dims: Vec<usize>,
    strides: Vec<isize>,
    conj: bool,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T: Scalar> TensorMut<'a, T> {
    /// Create a mutable view over `data`. See [`TensorRef::new`].
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self, MultError> {
        check_bounds(data.len(), dims, strides, offset)?;
        let ptr = if dims.iter().any(|&d| d == 0) {
            data.as_mut_ptr()
        } else {
            // SAFETY: check_bounds verified offset <= hi < data.len().
            unsafe { data.as_mut_ptr().add(offset) }
        };
        Ok(Self {
            ptr,
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            conj: false,
            _marker: PhantomData,
        })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Dimension lengths.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Element strides.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Whether the existing contents are read conjugated before scaling.
    pub fn is_conj(&self) -> bool {
        self.conj
    }

    /// Returns the same view with the conjugation flag toggled.
    pub fn conj(mut self) -> Self {
        self.conj = !self.conj;
        self
    }

    pub(crate) fn as_mut_ptr(&mut self) -> MutPtr<T> {
        MutPtr(self.ptr)
    }
}

/// Raw const pointer that can cross thread boundaries.
///
/// The contraction core partitions the addressed region so that no element is
/// written by more than one thread; the wrapper only exists to satisfy `Send`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConstPtr<T>(pub *const T);

unsafe impl<T: Send + Sync> Send for ConstPtr<T> {}
unsafe impl<T: Send + Sync> Sync for ConstPtr<T> {}

impl<T> ConstPtr<T> {
    #[inline(always)]
    pub fn at(self, offset: isize) -> *const T {
        self.0.wrapping_offset(offset)
    }
}

/// Raw mut pointer counterpart of [`ConstPtr`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct MutPtr<T>(pub *mut T);

unsafe impl<T: Send + Sync> Send for MutPtr<T> {}
unsafe impl<T: Send + Sync> Sync for MutPtr<T> {}

impl<T> MutPtr<T> {
    #[inline(always)]
    pub fn at(self, offset: isize) -> *mut T {
        self.0.wrapping_offset(offset)
    }

    #[inline(always)]
    pub fn as_const(self) -> ConstPtr<T> {
        ConstPtr(self.0)
    }
}
