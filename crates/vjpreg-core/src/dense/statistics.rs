//! Reductions over operands

use scirs2_core::ndarray_ext::{Array, Axis as NdAxis, IxDyn};

use super::types::Operand;

impl Operand {
    /// Sum elements along `axis`.
    ///
    /// With `keepdims`, the reduced axis stays in the result with extent 1;
    /// otherwise the rank drops by one. Masks are summed as 0/1 reals.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let x = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    ///
    /// let rows = x.sum_axis(1, true).unwrap();
    /// assert_eq!(rows.shape(), &[2, 1]);
    /// assert_eq!(rows.to_real_vec().unwrap(), vec![6.0, 15.0]);
    ///
    /// let cols = x.sum_axis(0, false).unwrap();
    /// assert_eq!(cols.shape(), &[3]);
    /// assert_eq!(cols.to_real_vec().unwrap(), vec![5.0, 7.0, 9.0]);
    /// ```
    pub fn sum_axis(&self, axis: usize, keepdims: bool) -> anyhow::Result<Self> {
        if axis >= self.rank() {
            anyhow::bail!("Axis {} out of bounds for rank {}", axis, self.rank());
        }
        let summed = match self {
            Operand::Complex(a) => Operand::Complex(a.sum_axis(NdAxis(axis))),
            _ => Operand::Real(self.real_cow().sum_axis(NdAxis(axis))),
        };
        if keepdims {
            summed.expand_dims(axis)
        } else {
            Ok(summed)
        }
    }

    /// Sum of all elements as a rank-0 operand.
    pub fn sum_all(&self) -> Self {
        match self {
            Operand::Complex(a) => Operand::Complex(Array::from_elem(IxDyn(&[]), a.sum())),
            _ => Operand::scalar(self.real_cow().sum()),
        }
    }
}
