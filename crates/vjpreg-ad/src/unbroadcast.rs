//! Gradient shape reconciliation
//!
//! When an operand was broadcast in the forward pass, the upstream gradient
//! has the broadcast (output) shape. [`unbroadcast`] sums it back down to
//! the operand's shape:
//!
//! 1. leading axes the operand never had are summed away;
//! 2. axes where the operand had extent 1 are summed with `keepdims`;
//! 3. a complex gradient flowing into a non-complex operand keeps only its
//!    real part.
//!
//! [`replace_zero`] is the companion helper rules use to keep singular
//! points out of transcendental kernels.

use vjpreg_core::{DType, Operand};

use crate::error::{GradError, GradResult};

/// Shape and dtype of the operand a gradient is reconciled against
///
/// Deferred generators capture this instead of a whole operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastTarget {
    /// Operand shape
    pub shape: Vec<usize>,
    /// Operand dtype
    pub dtype: DType,
}

impl BroadcastTarget {
    /// Capture the metadata of `operand`.
    pub fn of(operand: &Operand) -> Self {
        Self {
            shape: operand.shape().to_vec(),
            dtype: operand.dtype(),
        }
    }

    /// Rank of the target
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Reconcile `g` to this target, collapsing extra leading axes.
    pub fn reconcile(&self, g: Operand) -> GradResult<Operand> {
        self.reconcile_along(g, 0)
    }

    /// Reconcile `g` to this target, collapsing extra axes at
    /// `broadcast_axis`.
    ///
    /// # Errors
    ///
    /// [`GradError::ShapeMismatch`] if the summed gradient cannot take the
    /// target's shape.
    pub fn reconcile_along(&self, mut g: Operand, broadcast_axis: usize) -> GradResult<Operand> {
        while g.rank() > self.rank() {
            g = g.sum_axis(broadcast_axis, false)?;
        }
        if g.rank() < self.rank() {
            return Err(GradError::shape_mismatch(&self.shape, g.shape()));
        }
        for (axis, &size) in self.shape.iter().enumerate() {
            if size == 1 && g.shape()[axis] != 1 {
                g = g.sum_axis(axis, true)?;
            }
        }
        if g.is_complex() && !self.dtype.is_complex() {
            g = g.real_part();
        }
        if g.shape() != self.shape.as_slice() {
            return Err(GradError::shape_mismatch(&self.shape, g.shape()));
        }
        Ok(g)
    }
}

/// Sum `g` down to the shape of `target`.
///
/// # Examples
///
/// ```
/// use vjpreg_ad::unbroadcast;
/// use vjpreg_core::Operand;
///
/// let x = Operand::ones(&[3, 1]);
/// let g = Operand::ones(&[3, 4]);
/// let gx = unbroadcast(&x, g).unwrap();
/// assert_eq!(gx.shape(), &[3, 1]);
/// assert_eq!(gx.to_real_vec().unwrap(), vec![4.0, 4.0, 4.0]);
/// ```
pub fn unbroadcast(target: &Operand, g: Operand) -> GradResult<Operand> {
    BroadcastTarget::of(target).reconcile(g)
}

/// Like [`unbroadcast`], but surplus axes are summed at `broadcast_axis`
/// instead of at the front.
pub fn unbroadcast_along(
    target: &Operand,
    g: Operand,
    broadcast_axis: usize,
) -> GradResult<Operand> {
    BroadcastTarget::of(target).reconcile_along(g, broadcast_axis)
}

/// Copy of `x` with every zero element replaced by `val`.
///
/// Shape and dtype are preserved. For masks, `false` becomes `val != 0.0`.
///
/// ```
/// use vjpreg_ad::replace_zero;
/// use vjpreg_core::Operand;
///
/// let x = Operand::from_vec(vec![0.0, 2.0, 0.0], &[3]).unwrap();
/// let out = replace_zero(&x, 1.0).unwrap();
/// assert_eq!(out.to_real_vec().unwrap(), vec![1.0, 2.0, 1.0]);
/// ```
pub fn replace_zero(x: &Operand, val: f64) -> GradResult<Operand> {
    match x {
        Operand::Bool(mask) => Ok(Operand::Bool(mask.mapv(|b| b || val != 0.0))),
        _ => Ok(Operand::select(x, x, &Operand::scalar(val))?),
    }
}
