//! # vjpreg-ad
//!
//! Gradient-rule registry for reverse-mode automatic differentiation.
//!
//! For each differentiable primitive the registry holds one gradient
//! generator per operand. Given the upstream gradient `g`, the forward result
//! and the forward operands, a generator returns that operand's share of the
//! gradient, already summed back to the operand's shape.
//!
//! This crate provides:
//! - The [`Registry`] keyed by [`OpId`], with [`GradSlot`] entries
//! - Built-in rules for element-wise arithmetic, `exp`/`log`/hyperbolic
//!   functions, `where` and rank-0..2 `dot` ([`rules`])
//! - Shape reconciliation ([`unbroadcast`]) and [`replace_zero`]
//! - [`RecordedCall`], the per-node [`VjpOp`] context a backward pass keeps
//! - Finite-difference checking ([`gradcheck`])
//!
//! ## Quick Start
//!
//! ```
//! use vjpreg_ad::{OpId, Registry};
//! use vjpreg_core::Operand;
//!
//! let x = Operand::ones(&[3, 1]);
//! let y = Operand::ones(&[3, 4]);
//! let ans = x.add(&y).unwrap();
//! let g = Operand::ones(&[3, 4]);
//!
//! let gx = Registry::global()
//!     .vjp(OpId::Add, 0, &g, &ans, &[x, y])
//!     .unwrap();
//! assert_eq!(gx.shape(), &[3, 1]);
//! assert_eq!(gx.to_real_vec().unwrap(), vec![4.0, 4.0, 4.0]);
//! ```
//!
//! ## Features
//!
//! - `serde`: serialize [`OpId`] as its name
//! - `tracing`: subscriber setup in [`tracing_support`]

pub mod error;
pub mod gradcheck;
pub mod op;
pub mod registry;
pub mod rules;
pub mod slot;
pub mod tracing_support;
pub mod unbroadcast;
pub mod vjp;

pub use error::{GradError, GradResult};
pub use op::{OpId, ParseOpIdError};
pub use registry::Registry;
pub use slot::{BoundVjp, GradSlot, VjpFn, VjpMaker};
pub use unbroadcast::{replace_zero, unbroadcast, unbroadcast_along, BroadcastTarget};
pub use vjp::{RecordedCall, VjpOp};
