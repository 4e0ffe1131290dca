//! # vjpreg-core
//!
//! Array substrate for the vjpreg gradient-rule registry.
//!
//! This crate provides the small set of array operations that gradient rules
//! are written against:
//!
//! - **Dynamic operands** ([`Operand`]) carrying a runtime [`DType`]
//!   (boolean mask, real, or complex) and an arbitrary-rank shape
//! - **Broadcasting arithmetic** with NumPy alignment rules and dtype promotion
//! - **Transcendental kernels** (`exp`, `ln`, `tanh`, `sinh`, `cosh`, `pow`)
//! - **Reductions** (`sum_axis` with or without `keepdims`)
//! - **Selection** (`Operand::select`, the `where` kernel)
//! - **Products** (`dot` for ranks 0, 1 and 2) and `transpose`
//!
//! ## SciRS2 Integration
//!
//! All array storage goes through `scirs2-core`'s `ndarray_ext` re-export and
//! complex numbers through its `num_complex` re-export.
//!
//! ## Quick Start
//!
//! ```
//! use vjpreg_core::{DType, Operand};
//!
//! let x = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
//! let b = Operand::from_vec(vec![1.0, 1.0, 1.0], &[3]).unwrap();
//!
//! let y = x.mul(&b).unwrap().exp();
//! assert_eq!(y.shape(), &[2, 3]);
//! assert_eq!(y.dtype(), DType::Real);
//!
//! let rows = x.sum_axis(1, true).unwrap();
//! assert_eq!(rows.shape(), &[2, 1]);
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return `anyhow::Result`:
//!
//! ```
//! use vjpreg_core::Operand;
//!
//! let a = Operand::ones(&[2, 3]);
//! let b = Operand::ones(&[4]);
//! assert!(a.add(&b).is_err());
//! assert!(a.sum_axis(5, false).is_err());
//! ```
//!
//! ## Features
//!
//! - `serde`: serialization support for [`DType`]

pub mod dense;
pub mod types;

pub use dense::broadcast_shape;
pub use types::{Axis, DType, Operand, Rank};

/// Re-export of the complex scalar type used by [`Operand::Complex`].
pub use scirs2_core::num_complex::Complex64;
