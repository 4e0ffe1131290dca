//! Gradient rule for `where(condition, x, y)`
//!
//! The condition has no gradient. Each branch is a two-stage generator: the
//! first stage captures the condition and the branch's shape, the second
//! routes `g` through the mask and zeroes the other side.

use vjpreg_core::Operand;

use super::args;
use crate::error::GradResult;
use crate::op::OpId;
use crate::registry::Registry;
use crate::slot::{bound, BoundVjp, GradSlot};
use crate::unbroadcast::BroadcastTarget;

/// Which branch of `where` a gradient flows into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// `x`, taken where the condition is truthy
    OnTrue,
    /// `y`, taken elsewhere
    OnFalse,
}

impl Branch {
    fn operand_index(self) -> usize {
        match self {
            Branch::OnTrue => 1,
            Branch::OnFalse => 2,
        }
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        OpId::Where,
        vec![
            GradSlot::NonDifferentiable,
            GradSlot::deferred(|_, operands| bind_branch(operands, Branch::OnTrue)),
            GradSlot::deferred(|_, operands| bind_branch(operands, Branch::OnFalse)),
        ],
    );
}

/// Stage one for a `where` branch: capture the condition and branch target.
///
/// ```
/// use vjpreg_ad::rules::select::{bind_branch, Branch};
/// use vjpreg_core::Operand;
///
/// let c = Operand::from_mask_vec(vec![true, false], &[2]).unwrap();
/// let x = Operand::ones(&[2]);
/// let y = Operand::zeros_like(&x);
/// let vjp = bind_branch(&[c, x, y], Branch::OnTrue).unwrap();
///
/// let g = Operand::from_vec(vec![5.0, 7.0], &[2]).unwrap();
/// assert_eq!(vjp(&g).unwrap().to_real_vec().unwrap(), vec![5.0, 0.0]);
/// ```
pub fn bind_branch(operands: &[Operand], branch: Branch) -> GradResult<BoundVjp> {
    let [condition, ..] = args::<3>(OpId::Where, operands)?;
    let condition = condition.clone();
    let target = BroadcastTarget::of(&operands[branch.operand_index()]);
    Ok(bound(move |g| {
        let zeros = g.zeros_like();
        let routed = match branch {
            Branch::OnTrue => Operand::select(&condition, g, &zeros)?,
            Branch::OnFalse => Operand::select(&condition, &zeros, g)?,
        };
        target.reconcile(routed)
    }))
}
