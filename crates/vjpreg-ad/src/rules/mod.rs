//! Built-in gradient rules
//!
//! - [`elementwise`]: arithmetic and transcendental primitives
//! - [`select`]: `where(condition, x, y)`
//! - [`dot`]: rank-dispatched generalized product

pub mod dot;
pub mod elementwise;
pub mod select;

use vjpreg_core::Operand;

use crate::error::{GradError, GradResult};
use crate::op::OpId;
use crate::registry::Registry;

/// Register every built-in rule into `registry`.
pub fn register_builtin(registry: &mut Registry) {
    elementwise::register(registry);
    select::register(registry);
    dot::register(registry);
}

/// Destructure `operands` into exactly `N` references.
pub(crate) fn args<const N: usize>(op: OpId, operands: &[Operand]) -> GradResult<&[Operand; N]> {
    operands.try_into().map_err(|_| GradError::ArityMismatch {
        op,
        expected: N,
        actual: operands.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_checks_length() {
        let ops = vec![Operand::scalar(1.0), Operand::scalar(2.0)];
        let [a, b] = args::<2>(OpId::Add, &ops).unwrap();
        assert_eq!(a.get_real(&[]), Some(1.0));
        assert_eq!(b.get_real(&[]), Some(2.0));

        let err = args::<3>(OpId::Where, &ops).unwrap_err();
        assert!(matches!(
            err,
            GradError::ArityMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }
}
