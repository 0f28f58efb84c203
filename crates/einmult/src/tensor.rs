//! Owning dense tensor in column-major layout.
//!
//! [`Tensor`] is the construction convenience around the borrowed view types:
//! contraction operands are [`crate::view::TensorRef`] / [`crate::view::TensorMut`],
//! which a `Tensor` hands out over its own canonical layout. Arbitrary strides
//! (permuted, sliced, negative) are expressed by building views directly over
//! `data()`.

use crate::error::MultError;
use crate::scalar::Scalar;
use crate::strides::{cartesian_to_linear, col_major_strides};
use crate::view::{TensorMut, TensorRef};

/// A dense n-dimensional tensor with column-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T: Scalar> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

/// Number of stored elements for a shape: rank-0 scalars hold one element,
/// shapes with a zero dimension hold none.
pub(crate) fn storage_len(shape: &[usize]) -> usize {
    if shape.is_empty() {
        1
    } else {
        shape.iter().product()
    }
}

impl<T: Scalar> Tensor<T> {
    /// Create a new tensor with the given shape, zero-initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use einmult::Tensor;
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        let len = storage_len(shape);
        Self {
            data: vec![T::zero(); len],
            shape: shape.to_vec(),
            strides: col_major_strides(shape),
        }
    }

    /// Create a tensor from data in column-major order.
    ///
    /// # Errors
    ///
    /// Returns `MultError::ShapeMismatch` if the data length does not match
    /// the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use einmult::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[1, 0]), Some(&2.0));
    /// assert_eq!(t.get(&[0, 1]), Some(&3.0));
    /// ```
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self, MultError> {
        let expected = storage_len(shape);
        if data.len() != expected {
            return Err(MultError::ShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
                expected,
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: col_major_strides(shape),
        })
    }

    /// Shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Rank (number of dimensions).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of stored elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor stores zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Column-major element strides.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Underlying data as a slice.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Underlying data as a mutable slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get an element by cartesian indices.
    ///
    /// Returns `None` if the indices are out of bounds or the wrong arity.
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        if indices.len() != self.ndim() {
            return None;
        }
        if indices.iter().zip(&self.shape).any(|(&i, &d)| i >= d) {
            return None;
        }
        let linear = cartesian_to_linear(indices, &self.strides);
        self.data.get(linear as usize)
    }

    /// Set an element by cartesian indices.
    pub fn set(&mut self, indices: &[usize], value: T) -> Option<()> {
        if indices.len() != self.ndim() {
            return None;
        }
        if indices.iter().zip(&self.shape).any(|(&i, &d)| i >= d) {
            return None;
        }
        let linear = cartesian_to_linear(indices, &self.strides);
        self.data[linear as usize] = value;
        Some(())
    }

    /// Immutable view over the whole tensor in its canonical layout.
    pub fn view(&self) -> TensorRef<'_, T> {
        TensorRef::new(&self.data, &self.shape, &self.strides, 0)
            .expect("canonical layout is always in bounds")
    }

    /// Mutable view over the whole tensor in its canonical layout.
    pub fn view_mut(&mut self) -> TensorMut<'_, T> {
        let (shape, strides) = (self.shape.clone(), self.strides.clone());
        TensorMut::new(&mut self.data, &shape, &strides, 0)
            .expect("canonical layout is always in bounds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::c64;

    fn test_zeros_generic<T: Scalar>() {
        let t: Tensor<T> = Tensor::zeros(&[2, 3]);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.len(), 6);
        assert_eq!(t.strides(), &[1, 2]);
        assert!(t.data().iter().all(|&v| v == T::zero()));
    }

    #[test]
    fn test_zeros_f64() {
        test_zeros_generic::<f64>();
    }

    #[test]
    fn test_zeros_c64() {
        test_zeros_generic::<c64>();
    }

    #[test]
    fn test_from_vec_col_major() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.get(&[0, 0]), Some(&1.0));
        assert_eq!(t.get(&[1, 0]), Some(&2.0));
        assert_eq!(t.get(&[0, 1]), Some(&3.0));
        assert_eq!(t.get(&[1, 2]), Some(&6.0));
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        let result = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0], &[2, 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        assert_eq!(t.get(&[2, 0]), None);
        assert_eq!(t.get(&[0]), None);
        assert_eq!(t.get(&[0, 0, 0]), None);
    }

    #[test]
    fn test_set() {
        let mut t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        t.set(&[1, 2], 42.0).unwrap();
        assert_eq!(t.get(&[1, 2]), Some(&42.0));
    }

    #[test]
    fn test_zero_extent_shape() {
        let t: Tensor<f64> = Tensor::zeros(&[0, 2]);
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.shape(), &[0, 2]);

        let t = Tensor::<f64>::from_vec(Vec::new(), &[0, 2]).unwrap();
        assert!(t.is_empty());
        assert!(Tensor::<f64>::from_vec(vec![1.0], &[0, 2]).is_err());
    }

    #[test]
    fn test_scalar_tensor() {
        let t: Tensor<f64> = Tensor::zeros(&[]);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_views() {
        let mut t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        assert_eq!(t.view().dims(), &[2, 2]);
        assert_eq!(t.view().strides(), &[1, 2]);
        assert_eq!(t.view_mut().dims(), &[2, 2]);
    }
}
