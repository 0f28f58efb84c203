//! einmult - label-based contraction engine for dense strided tensors
//!
//! This crate computes `C = alpha * op(A) * op(B) + beta * op(C)` over
//! arbitrary-rank strided operands, with dimensions paired by character
//! labels (einsum style) and `op` an optional elementwise conjugation.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Entry points (api module)
//!     → mult (typed), mult_dyn (runtime element type)
//!
//! Level 2: Classification and dispatch (index, mult modules)
//!     → label groups {contracted, free, batch} select one of seven
//!       handlers (scalar, Hadamard, dot, scale-add, ger, gemv, gemm)
//!
//! Level 3: Execution (comm, kernels, mult::* strategies)
//!     → thread gangs over batch dims, faer's blocked GEMM inside,
//!       strided elementwise kernels at the edges
//! ```
//!
//! # Example
//!
//! ```
//! use einmult::{Config, Tensor, mult};
//!
//! // C[m,n] = A[m,k] * B[k,n]
//! let a: Tensor<f64> = Tensor::random(&[4, 6]);
//! let b: Tensor<f64> = Tensor::random(&[6, 5]);
//! let mut c: Tensor<f64> = Tensor::zeros(&[4, 5]);
//!
//! let config = Config::new();
//! mult(
//!     &config,
//!     1.0,
//!     &a.view(),
//!     "mk",
//!     &b.view(),
//!     "kn",
//!     0.0,
//!     &mut c.view_mut(),
//!     "mn",
//! )
//! .unwrap();
//! ```

pub mod api;
pub mod comm;
pub mod config;
pub mod error;
pub mod index;
mod iter;
mod kernels;
mod mult;
pub mod random;
pub mod scalar;
pub mod strides;
pub mod tensor;
pub mod view;

pub use api::{AnyScalar, AnyTensorMut, AnyTensorRef, mult, mult_dyn};
pub use config::{Backend, Config};
pub use error::MultError;
pub use index::{DimGroups, classify};
pub use scalar::{DType, Scalar, c32, c64};
pub use tensor::Tensor;
pub use view::{TensorMut, TensorRef};
