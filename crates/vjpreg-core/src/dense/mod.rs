//! Operand implementation and operations
//!
//! The operand type lives in [`types`]; operations are split by concern.

// Core type definition
pub mod types;

// Operation modules (organized by functionality)
mod comparison;
mod elementwise;
mod linalg;
mod shape_ops;
mod statistics;

// Re-export the main type
pub use types::Operand;

pub use shape_ops::broadcast_shape;
