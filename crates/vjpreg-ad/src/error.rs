//! Error types for gradient-rule lookup and evaluation
//!
//! # Design
//!
//! - **Registry errors**: unknown operation, slot index past the arity,
//!   operand count not matching the arity
//! - **Rule errors**: non-differentiable argument requested, unsupported
//!   operand ranks for `dot`
//! - **Invariant errors**: a rule produced a gradient whose shape differs from
//!   its operand
//! - **Substrate errors**: failures inside `vjpreg-core` kernels
//!
//! # Examples
//!
//! ```
//! use vjpreg_ad::{GradError, OpId, Registry};
//!
//! let registry = Registry::new();
//! match registry.lookup(OpId::Add, 0) {
//!     Err(GradError::UnregisteredOperation { op }) => assert_eq!(op, OpId::Add),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

use crate::op::OpId;

/// Result alias used throughout the crate
pub type GradResult<T> = std::result::Result<T, GradError>;

/// Errors raised while looking up or evaluating gradient rules
#[derive(Error, Debug)]
pub enum GradError {
    /// No rule list was ever registered for this operation
    #[error("no gradient rule registered for operation '{op}'")]
    UnregisteredOperation {
        /// Requested operation
        op: OpId,
    },

    /// Argument index is not below the operation's arity
    #[error("argument index {index} out of range for '{op}' with arity {arity}")]
    IndexOutOfRange {
        /// Requested operation
        op: OpId,
        /// Requested argument position
        index: usize,
        /// Number of registered slots
        arity: usize,
    },

    /// The requested argument position is registered as non-differentiable
    #[error("argument {index} of '{op}' is not differentiable")]
    NonDifferentiableInput {
        /// Requested operation
        op: OpId,
        /// Requested argument position
        index: usize,
    },

    /// `dot` gradient requested for operand ranks outside {0, 1, 2}
    #[error("dot gradient supports ranks 0, 1 and 2, got lhs rank {lhs} and rhs rank {rhs}")]
    UnsupportedRank {
        /// Rank of the left operand
        lhs: usize,
        /// Rank of the right operand
        rhs: usize,
    },

    /// A reconciled gradient does not have its operand's shape
    #[error("gradient shape {actual:?} does not match operand shape {expected:?}")]
    ShapeMismatch {
        /// Operand shape
        expected: Vec<usize>,
        /// Gradient shape produced by the rule
        actual: Vec<usize>,
    },

    /// Operand slice length differs from the registered arity
    #[error("'{op}' expects {expected} operands, got {actual}")]
    ArityMismatch {
        /// Requested operation
        op: OpId,
        /// Registered arity
        expected: usize,
        /// Number of operands supplied
        actual: usize,
    },

    /// Failure inside an array kernel
    #[error("array kernel failed: {0}")]
    Substrate(#[from] anyhow::Error),
}

impl GradError {
    /// Construct a [`GradError::ShapeMismatch`] from two shapes.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        GradError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_operation() {
        let err = GradError::NonDifferentiableInput {
            op: OpId::Where,
            index: 0,
        };
        assert_eq!(err.to_string(), "argument 0 of 'where' is not differentiable");

        let err = GradError::IndexOutOfRange {
            op: OpId::Exp,
            index: 1,
            arity: 1,
        };
        assert!(err.to_string().contains("'exp'"));
    }

    #[test]
    fn test_substrate_conversion() {
        let err: GradError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, GradError::Substrate(_)));
    }

    #[test]
    fn test_shape_mismatch_helper() {
        let err = GradError::shape_mismatch(&[3, 1], &[3, 4]);
        assert_eq!(
            err.to_string(),
            "gradient shape [3, 4] does not match operand shape [3, 1]"
        );
    }
}
