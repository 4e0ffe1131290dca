//! Gradient rule for `dot(lhs, rhs)`, dispatched on operand ranks
//!
//! | ranks | d/d(lhs) | d/d(rhs) |
//! |---|---|---|
//! | (0, any) | `unbroadcast(lhs, rhs * g)` | `dot(lhs^T, g)` |
//! | (any, 0) | `dot(g, rhs^T)` | `unbroadcast(rhs, lhs * g)` |
//! | (1, 1) | `g * rhs` | `g * lhs` |
//! | (2, 1) | `g[:, None] * rhs` | `dot(g, lhs)` |
//! | (1, 2) | `dot(rhs, g)` | `lhs[:, None] * g` |
//! | (2, 2) | `dot(g, rhs^T)` | `dot(lhs^T, g)` |
//!
//! Rows are tried top to bottom, so a rank-0 operand on the left wins over
//! one on the right. Ranks above 2 are rejected.

use vjpreg_core::Operand;

use super::args;
use crate::error::{GradError, GradResult};
use crate::op::OpId;
use crate::registry::Registry;
use crate::slot::GradSlot;
use crate::unbroadcast::unbroadcast;

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        OpId::Dot,
        vec![
            GradSlot::direct(|g, _, operands| {
                let [lhs, rhs] = args::<2>(OpId::Dot, operands)?;
                dot_vjp_lhs(g, lhs, rhs)
            }),
            GradSlot::direct(|g, _, operands| {
                let [lhs, rhs] = args::<2>(OpId::Dot, operands)?;
                dot_vjp_rhs(g, lhs, rhs)
            }),
        ],
    );
}

fn check_ranks(lhs: &Operand, rhs: &Operand) -> GradResult<(usize, usize)> {
    let ranks = (lhs.rank(), rhs.rank());
    if ranks.0 > 2 || ranks.1 > 2 {
        return Err(GradError::UnsupportedRank {
            lhs: ranks.0,
            rhs: ranks.1,
        });
    }
    Ok(ranks)
}

/// Gradient of `dot(lhs, rhs)` with respect to `lhs`.
///
/// # Examples
///
/// ```
/// use vjpreg_ad::rules::dot::dot_vjp_lhs;
/// use vjpreg_core::Operand;
///
/// let lhs = Operand::ones(&[2, 3]);
/// let rhs = Operand::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let g = Operand::from_vec(vec![1.0, 10.0], &[2]).unwrap();
///
/// let grad = dot_vjp_lhs(&g, &lhs, &rhs).unwrap();
/// assert_eq!(grad.shape(), &[2, 3]);
/// assert_eq!(
///     grad.to_real_vec().unwrap(),
///     vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]
/// );
/// ```
pub fn dot_vjp_lhs(g: &Operand, lhs: &Operand, rhs: &Operand) -> GradResult<Operand> {
    let grad = match check_ranks(lhs, rhs)? {
        (0, _) => return unbroadcast(lhs, rhs.mul(g)?),
        (_, 0) | (2, 2) => g.dot(&rhs.transpose())?,
        (1, 1) => g.mul(rhs)?,
        (2, 1) => g.expand_dims(1)?.mul(rhs)?,
        (1, 2) => rhs.dot(g)?,
        (lr, rr) => return Err(GradError::UnsupportedRank { lhs: lr, rhs: rr }),
    };
    unbroadcast(lhs, grad)
}

/// Gradient of `dot(lhs, rhs)` with respect to `rhs`.
pub fn dot_vjp_rhs(g: &Operand, lhs: &Operand, rhs: &Operand) -> GradResult<Operand> {
    let grad = match check_ranks(lhs, rhs)? {
        (_, 0) => return unbroadcast(rhs, lhs.mul(g)?),
        (0, _) | (2, 2) => lhs.transpose().dot(g)?,
        (1, 1) => g.mul(lhs)?,
        (2, 1) => g.dot(lhs)?,
        (1, 2) => lhs.expand_dims(1)?.mul(g)?,
        (lr, rr) => return Err(GradError::UnsupportedRank { lhs: lr, rhs: rr }),
    };
    unbroadcast(rhs, grad)
}
