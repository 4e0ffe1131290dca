//! Selection and approximate comparison
//!
//! [`Operand::select`] is the `where(condition, a, b)` kernel: the condition
//! is read by truthiness (nonzero is true) and all three inputs broadcast
//! against each other.

use anyhow::Context;

use super::shape_ops::zip_map3;
use super::types::Operand;
use crate::types::DType;

impl Operand {
    /// Pick `on_true` where `condition` is truthy, `on_false` elsewhere.
    ///
    /// The branches are promoted to a common dtype; the result has the
    /// broadcast shape of all three inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let c = Operand::from_mask_vec(vec![true, false, true], &[3]).unwrap();
    /// let a = Operand::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
    /// let out = Operand::select(&c, &a, &Operand::scalar(0.0)).unwrap();
    /// assert_eq!(out.to_real_vec().unwrap(), vec![1.0, 0.0, 3.0]);
    /// ```
    pub fn select(
        condition: &Operand,
        on_true: &Operand,
        on_false: &Operand,
    ) -> anyhow::Result<Self> {
        let mask = condition.truth_mask();
        let out = match on_true.dtype().promote(on_false.dtype()) {
            DType::Bool => {
                let (t, f) = (on_true.truth_mask(), on_false.truth_mask());
                zip_map3(&*mask, &*t, &*f, |&c, &t, &f| if c { t } else { f }).map(Operand::Bool)
            }
            DType::Real => {
                let (t, f) = (on_true.real_cow(), on_false.real_cow());
                zip_map3(&*mask, &*t, &*f, |&c, &t, &f| if c { t } else { f }).map(Operand::Real)
            }
            DType::Complex => {
                let (t, f) = (on_true.complex_cow(), on_false.complex_cow());
                zip_map3(&*mask, &*t, &*f, |&c, &t, &f| if c { t } else { f })
                    .map(Operand::Complex)
            }
        };
        out.with_context(|| {
            format!(
                "select with condition {:?} and branches {:?}, {:?}",
                condition.shape(),
                on_true.shape(),
                on_false.shape()
            )
        })
    }

    /// Element-wise closeness test: `|a - b| <= atol + rtol * |b|`.
    ///
    /// Shapes must match exactly. `nan` never compares close; infinities
    /// compare close only to an identical infinity.
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let a = Operand::from_vec(vec![1.0, 2.0], &[2]).unwrap();
    /// let b = Operand::from_vec(vec![1.0 + 1e-9, 2.0], &[2]).unwrap();
    /// assert!(a.allclose(&b, 1e-6, 1e-8));
    /// ```
    pub fn allclose(&self, other: &Operand, rtol: f64, atol: f64) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        let (a, b) = (self.complex_cow(), other.complex_cow());
        a.iter().zip(b.iter()).all(|(x, y)| {
            if x == y {
                return true;
            }
            let diff = (x - y).norm();
            diff.is_finite() && diff <= atol + rtol * y.norm()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_broadcasts_condition() {
        let c = Operand::from_mask_vec(vec![true, false], &[2, 1]).unwrap();
        let t = Operand::ones(&[2, 3]);
        let f = Operand::zeros(&[2, 3], DType::Real);
        let out = Operand::select(&c, &t, &f).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(
            out.to_real_vec().unwrap(),
            vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_select_real_condition_truthiness() {
        let c = Operand::from_vec(vec![0.0, 2.0, -0.5], &[3]).unwrap();
        let y = Operand::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();
        let out = Operand::select(&c, &y, &Operand::scalar(1.0)).unwrap();
        assert_eq!(out.to_real_vec().unwrap(), vec![1.0, 20.0, 30.0]);
    }

    #[test]
    fn test_select_incompatible_shapes() {
        let c = Operand::from_mask_vec(vec![true, false, true], &[3]).unwrap();
        let t = Operand::ones(&[2]);
        assert!(Operand::select(&c, &t, &Operand::scalar(0.0)).is_err());
    }

    #[test]
    fn test_allclose_rejects_shape_and_nan() {
        let a = Operand::ones(&[2]);
        assert!(!a.allclose(&Operand::ones(&[1, 2]), 1e-6, 1e-6));
        let n = Operand::from_vec(vec![f64::NAN, 1.0], &[2]).unwrap();
        assert!(!n.allclose(&n, 1e-6, 1e-6));
    }
}
