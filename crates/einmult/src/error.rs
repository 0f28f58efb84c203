//! Error types for einmult operations.

use crate::scalar::DType;
use thiserror::Error;

/// Errors that can occur during tensor construction and contraction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MultError {
    /// Data length does not match the product of the requested dimensions.
    #[error("data length {data_len} does not match shape {shape:?} (expected {expected})")]
    ShapeMismatch {
        data_len: usize,
        shape: Vec<usize>,
        expected: usize,
    },

    /// A view was given a different number of strides than dimensions.
    #[error("rank mismatch: {ndim} dimensions but {nstrides} strides")]
    RankMismatch { ndim: usize, nstrides: usize },

    /// A strided view would address elements outside its backing buffer.
    #[error("view addresses offsets {lo}..={hi} but the buffer has {len} elements")]
    ViewOutOfBounds { lo: isize, hi: isize, len: usize },

    /// The number of index labels differs from the operand's rank.
    #[error("operand {operand} has {ndim} dimensions but {nlabels} index labels")]
    WrongNumberOfIndices {
        operand: char,
        ndim: usize,
        nlabels: usize,
    },

    /// Two dimensions carrying the same label have different lengths.
    #[error("index '{label}' has conflicting lengths {len1} and {len2}")]
    IndexMismatch {
        label: char,
        len1: usize,
        len2: usize,
    },

    /// A label appears more than once within a single operand.
    #[error("index '{label}' is repeated within operand {operand}")]
    DuplicateIndex { label: char, operand: char },

    /// A label appears in only one operand.
    #[error("index '{label}' appears in only one operand")]
    UnmatchedIndex { label: char },

    /// Type-erased operands with different element types.
    #[error("mismatched element types: {expected:?} and {actual:?}")]
    TypeMismatch { expected: DType, actual: DType },

    /// A scalar for a real element type carries a nonzero imaginary part.
    #[error("scalar with imaginary part {im} passed for real type {dtype:?}")]
    NonRealScalar { dtype: DType, im: f64 },
}
