//! Gradient-generator slots
//!
//! A registry entry holds one [`GradSlot`] per operand position. A slot is
//! either a single-stage generator, a two-stage generator that first binds
//! forward-time context, or a marker that the position is not differentiable.

use std::fmt;
use std::sync::Arc;

use vjpreg_core::Operand;

use crate::error::GradResult;

/// Single-stage generator: `(g, ans, operands) -> gradient`
pub type VjpFn = Arc<dyn Fn(&Operand, &Operand, &[Operand]) -> GradResult<Operand> + Send + Sync>;

/// Stage two of a deferred generator: `g -> gradient`
pub type BoundVjp = Arc<dyn Fn(&Operand) -> GradResult<Operand> + Send + Sync>;

/// Stage one of a deferred generator: `(ans, operands) -> BoundVjp`
pub type VjpMaker = Arc<dyn Fn(&Operand, &[Operand]) -> GradResult<BoundVjp> + Send + Sync>;

/// Gradient generator for one operand position
#[derive(Clone)]
pub enum GradSlot {
    /// Computes the gradient directly from `(g, ans, operands)`
    Direct(VjpFn),
    /// Binds `(ans, operands)` first, then maps `g` to the gradient
    Deferred(VjpMaker),
    /// The position has no gradient
    NonDifferentiable,
}

impl GradSlot {
    /// Wrap a closure as a [`GradSlot::Direct`] slot.
    ///
    /// ```
    /// use vjpreg_ad::GradSlot;
    ///
    /// let identity = GradSlot::direct(|g, _ans, _operands| Ok(g.clone()));
    /// assert!(identity.is_differentiable());
    /// ```
    pub fn direct<F>(f: F) -> Self
    where
        F: Fn(&Operand, &Operand, &[Operand]) -> GradResult<Operand> + Send + Sync + 'static,
    {
        GradSlot::Direct(Arc::new(f))
    }

    /// Wrap a stage-one closure as a [`GradSlot::Deferred`] slot.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&Operand, &[Operand]) -> GradResult<BoundVjp> + Send + Sync + 'static,
    {
        GradSlot::Deferred(Arc::new(f))
    }

    /// Whether invoking the slot can produce a gradient
    pub fn is_differentiable(&self) -> bool {
        !matches!(self, GradSlot::NonDifferentiable)
    }

    /// Short tag for logs and `Debug`
    pub fn kind(&self) -> &'static str {
        match self {
            GradSlot::Direct(_) => "direct",
            GradSlot::Deferred(_) => "deferred",
            GradSlot::NonDifferentiable => "non-differentiable",
        }
    }
}

impl fmt::Debug for GradSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GradSlot::{}", self.kind())
    }
}

/// Box a stage-two closure as a [`BoundVjp`].
pub fn bound<F>(f: F) -> BoundVjp
where
    F: Fn(&Operand) -> GradResult<Operand> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let d = GradSlot::direct(|g, _, _| Ok(g.neg()));
        let m = GradSlot::deferred(|_, _| Ok(bound(|g| Ok(g.clone()))));
        assert_eq!(d.kind(), "direct");
        assert_eq!(m.kind(), "deferred");
        assert!(!GradSlot::NonDifferentiable.is_differentiable());
        assert_eq!(format!("{:?}", m), "GradSlot::deferred");
    }

    #[test]
    fn test_deferred_two_stages() {
        let slot = GradSlot::deferred(|ans, _| {
            let scale = ans.clone();
            Ok(bound(move |g| Ok(g.mul(&scale)?)))
        });
        let GradSlot::Deferred(maker) = slot else {
            panic!("expected deferred slot");
        };
        let vjp = maker(&Operand::scalar(3.0), &[]).unwrap();
        let out = vjp(&Operand::scalar(2.0)).unwrap();
        assert_eq!(out.get_real(&[]), Some(6.0));
    }

    #[test]
    fn test_slots_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GradSlot>();
        assert_send_sync::<BoundVjp>();
    }
}
