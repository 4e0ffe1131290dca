//! Vector-Jacobian products for recorded calls
//!
//! For a forward call `ans = op(x1, x2, ...)`, the VJP maps the upstream
//! gradient (cotangent) `g = dL/dans` to
//! ```text
//! vjp(g) = (dL/dx1, dL/dx2, ...)
//! ```
//! [`RecordedCall`] is the per-node context a backward walker keeps: the
//! operation, its forward operands and result. Gradients are produced by
//! dispatching through a [`Registry`].

use vjpreg_core::Operand;

use crate::error::GradResult;
use crate::op::OpId;
use crate::registry::Registry;

/// Operations that support backward differentiation
pub trait VjpOp {
    /// Compute the gradient for every input given the output gradient.
    ///
    /// Returns one entry per input, `None` where the input has no gradient.
    fn vjp(&self, output_grad: &Operand) -> GradResult<Vec<Option<Operand>>>;
}

/// Forward call saved for the backward pass
///
/// # Example
///
/// ```
/// use vjpreg_ad::{OpId, RecordedCall, VjpOp};
/// use vjpreg_core::Operand;
///
/// let c = Operand::from_mask_vec(vec![true, false], &[2]).unwrap();
/// let x = Operand::from_vec(vec![1.0, 2.0], &[2]).unwrap();
/// let y = Operand::from_vec(vec![3.0, 4.0], &[2]).unwrap();
/// let ans = Operand::select(&c, &x, &y).unwrap();
///
/// let call = RecordedCall::new(OpId::Where, vec![c, x, y], ans);
/// let grads = call.vjp(&Operand::ones(&[2])).unwrap();
///
/// assert!(grads[0].is_none());
/// assert_eq!(grads[1].as_ref().unwrap().to_real_vec().unwrap(), vec![1.0, 0.0]);
/// assert_eq!(grads[2].as_ref().unwrap().to_real_vec().unwrap(), vec![0.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordedCall<'r> {
    /// Operation that was applied
    pub op: OpId,
    /// Forward operands (saved from forward pass)
    pub operands: Vec<Operand>,
    /// Forward result
    pub ans: Operand,
    registry: &'r Registry,
}

impl RecordedCall<'static> {
    /// Record a call whose gradients come from [`Registry::global`].
    pub fn new(op: OpId, operands: Vec<Operand>, ans: Operand) -> Self {
        Self::with_registry(Registry::global(), op, operands, ans)
    }
}

impl<'r> RecordedCall<'r> {
    /// Record a call whose gradients come from `registry`.
    pub fn with_registry(
        registry: &'r Registry,
        op: OpId,
        operands: Vec<Operand>,
        ans: Operand,
    ) -> Self {
        Self {
            op,
            operands,
            ans,
            registry,
        }
    }

    /// Gradient for the single input at `argnum`.
    pub fn vjp_arg(&self, argnum: usize, output_grad: &Operand) -> GradResult<Operand> {
        self.registry
            .vjp(self.op, argnum, output_grad, &self.ans, &self.operands)
    }
}

impl VjpOp for RecordedCall<'_> {
    fn vjp(&self, output_grad: &Operand) -> GradResult<Vec<Option<Operand>>> {
        let slots = self.registry.slots(self.op)?;
        slots
            .iter()
            .enumerate()
            .map(|(argnum, slot)| {
                if slot.is_differentiable() {
                    self.vjp_arg(argnum, output_grad).map(Some)
                } else {
                    Ok(None)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GradError;
    use crate::slot::GradSlot;

    #[test]
    fn test_binary_call_returns_both_gradients() {
        let x = Operand::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let y = Operand::scalar(2.0);
        let ans = x.mul(&y).unwrap();
        let call = RecordedCall::new(OpId::Multiply, vec![x, y], ans);

        let grads = call.vjp(&Operand::ones(&[3])).unwrap();
        assert_eq!(grads.len(), 2);
        assert_eq!(
            grads[0].as_ref().unwrap().to_real_vec().unwrap(),
            vec![2.0, 2.0, 2.0]
        );
        assert_eq!(grads[1].as_ref().unwrap().get_real(&[]), Some(6.0));
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = Registry::new();
        registry.register(
            OpId::Custom("double"),
            vec![GradSlot::direct(|g, _, _| Ok(g.mul(&Operand::scalar(2.0))?))],
        );
        let x = Operand::ones(&[2]);
        let call = RecordedCall::with_registry(
            &registry,
            OpId::Custom("double"),
            vec![x.clone()],
            x.add(&x).unwrap(),
        );
        let g = call.vjp_arg(0, &Operand::ones(&[2])).unwrap();
        assert_eq!(g.to_real_vec().unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_unregistered_op() {
        let registry = Registry::new();
        let call = RecordedCall::with_registry(
            &registry,
            OpId::Exp,
            vec![Operand::scalar(0.0)],
            Operand::scalar(1.0),
        );
        assert!(matches!(
            call.vjp(&Operand::scalar(1.0)),
            Err(GradError::UnregisteredOperation { op: OpId::Exp })
        ));
    }
}
